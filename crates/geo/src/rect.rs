//! Rectangle geometry utilities for spatial operations.

use std::fmt::Debug;

use approx::{AbsDiffEq, RelativeEq};
use geo_types::CoordNum;

use crate::Point;

/// Axis aligned rectangle stored as its north west and south east corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T>
where
    T: Copy + CoordNum,
{
    top_left: Point<T>,
    bottom_right: Point<T>,
}

impl<T> Rect<T>
where
    T: Copy + CoordNum,
{
    pub fn from_points(p1: Point<T>, p2: Point<T>) -> Self {
        let top_left = Point::new(min(p1.x(), p2.x()), max(p1.y(), p2.y()));
        let bottom_right = Point::new(max(p1.x(), p2.x()), min(p1.y(), p2.y()));

        Rect { top_left, bottom_right }
    }

    /// Rectangle from a `[minx, miny, maxx, maxy]` bounding box
    pub fn from_bbox(bbox: [T; 4]) -> Self {
        Rect::from_points(Point::new(bbox[0], bbox[1]), Point::new(bbox[2], bbox[3]))
    }

    pub fn top_left(&self) -> Point<T> {
        self.top_left
    }

    pub fn bottom_right(&self) -> Point<T> {
        self.bottom_right
    }

    /// The `[minx, miny, maxx, maxy]` representation
    pub fn to_bbox(&self) -> [T; 4] {
        [
            self.top_left.x(),
            self.bottom_right.y(),
            self.bottom_right.x(),
            self.top_left.y(),
        ]
    }

    /// True when `other` lies completely inside this rectangle (shared edges included)
    pub fn contains(&self, other: &Rect<T>) -> bool {
        other.top_left.x() >= self.top_left.x()
            && other.bottom_right.x() <= self.bottom_right.x()
            && other.top_left.y() <= self.top_left.y()
            && other.bottom_right.y() >= self.bottom_right.y()
    }
}

fn min<T: PartialOrd>(a: T, b: T) -> T {
    if a < b { a } else { b }
}

fn max<T: PartialOrd>(a: T, b: T) -> T {
    if b > a { b } else { a }
}

impl<T> AbsDiffEq for Rect<T>
where
    T: PartialEq + std::fmt::Debug + Copy + CoordNum + AbsDiffEq<Epsilon = T>,
{
    type Epsilon = T;

    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.top_left.abs_diff_eq(&other.top_left, epsilon) && self.bottom_right.abs_diff_eq(&other.bottom_right, epsilon)
    }
}

impl<T: PartialEq + std::fmt::Debug + Copy + CoordNum + RelativeEq<Epsilon = T>> RelativeEq for Rect<T> {
    fn default_max_relative() -> Self::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        Point::<T>::relative_eq(&self.top_left, &other.top_left, epsilon, max_relative)
            && Point::<T>::relative_eq(&self.bottom_right, &other.bottom_right, epsilon, max_relative)
    }
}
