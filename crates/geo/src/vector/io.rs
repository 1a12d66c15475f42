use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use geo_types::{Geometry, GeometryCollection, Polygon};
use geojson::GeoJson;

use crate::{Point, Rect, Result};

/// Polygon geometry read from a GeoJSON document together with the document itself
#[derive(Debug, Clone)]
pub struct BoundaryGeometry {
    pub geojson: GeoJson,
    pub polygons: Vec<Polygon<f64>>,
    /// Extent over all polygons, `None` when the document contains no polygons
    pub bbox: Option<Rect<f64>>,
}

impl BoundaryGeometry {
    pub fn from_geojson(geojson: GeoJson) -> Result<Self> {
        let polygons = polygons_from_geojson(&geojson)?;
        let bbox = polygons_bbox(&polygons);
        Ok(BoundaryGeometry { geojson, polygons, bbox })
    }

    /// The `[minx, miny, maxx, maxy]` extent of the polygons
    pub fn bbox_array(&self) -> Option<[f64; 4]> {
        self.bbox.map(|bbox| bbox.to_bbox())
    }
}

pub fn read_geojson(path: &Path) -> Result<GeoJson> {
    let mut contents = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut contents)?;
    Ok(contents.parse::<GeoJson>()?)
}

/// Reads the boundary polygons of a GeoJSON file (feature collection, feature or bare geometry)
pub fn read_boundary(path: &Path) -> Result<BoundaryGeometry> {
    let geojson = read_geojson(path)?;
    log::debug!("Read boundary {}", path.display());
    BoundaryGeometry::from_geojson(geojson)
}

/// Collects the polygons of the document in order, multi polygons are flattened
pub fn polygons_from_geojson(geojson: &GeoJson) -> Result<Vec<Polygon<f64>>> {
    let collection = GeometryCollection::<f64>::try_from(geojson)?;

    let mut polygons = Vec::new();
    for geometry in collection {
        collect_polygons(geometry, &mut polygons);
    }

    Ok(polygons)
}

fn collect_polygons(geometry: Geometry<f64>, polygons: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(polygon) => polygons.push(polygon),
        Geometry::MultiPolygon(multi) => polygons.extend(multi),
        Geometry::Rect(rect) => polygons.push(rect.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            for geometry in collection {
                collect_polygons(geometry, polygons);
            }
        }
        _ => log::warn!("Ignoring non polygon boundary geometry"),
    }
}

/// Bounding rectangle of the exterior rings of all polygons
pub fn polygons_bbox(polygons: &[Polygon<f64>]) -> Option<Rect<f64>> {
    let mut coords = polygons.iter().flat_map(|polygon| polygon.exterior().coords());
    let first = coords.next()?;

    let (min_x, min_y, max_x, max_y) = coords.fold((first.x, first.y, first.x, first.y), |(min_x, min_y, max_x, max_y), c| {
        (min_x.min(c.x), min_y.min(c.y), max_x.max(c.x), max_y.max(c.y))
    });

    Some(Rect::from_points(Point::new(min_x, min_y), Point::new(max_x, max_y)))
}
