use num::ToPrimitive;

/// Trait for raster sample types that can be imported as floating point data.
/// Floating point types may contain NaN values which are treated as nodata,
/// integer types rely on the nodata value declared in the raster metadata.
pub trait Nodata: ToPrimitive + PartialEq + Sized + Copy {
    fn has_nan() -> bool;
    fn is_nan(self) -> bool;

    /// Converts the sample to `f64`, samples matching the declared nodata value become NaN
    #[inline]
    fn to_f64_with_nodata(self, nodata: Option<f64>) -> f64 {
        match self.to_f64() {
            Some(value) if Some(value) != nodata => value,
            _ => f64::NAN,
        }
    }
}

macro_rules! impl_nodata_fixed_point {
    ( $t:ident ) => {
        impl Nodata for $t {
            fn has_nan() -> bool {
                false
            }

            fn is_nan(self) -> bool {
                false
            }
        }
    };
}

macro_rules! impl_nodata_floating_point {
    ( $t:ident ) => {
        impl Nodata for $t {
            fn has_nan() -> bool {
                true
            }

            fn is_nan(self) -> bool {
                self.is_nan()
            }
        }
    };
}

impl_nodata_fixed_point!(u8);
impl_nodata_fixed_point!(u16);
impl_nodata_fixed_point!(u32);
impl_nodata_fixed_point!(u64);
impl_nodata_fixed_point!(i8);
impl_nodata_fixed_point!(i16);
impl_nodata_fixed_point!(i32);
impl_nodata_fixed_point!(i64);

impl_nodata_floating_point!(f32);
impl_nodata_floating_point!(f64);

/// Converts a buffer of samples to `f64` with nodata samples set to NaN
pub fn samples_to_f64<T: Nodata>(samples: &[T], nodata: Option<f64>) -> Vec<f64> {
    // A NaN nodata value never compares equal, NaN samples stay NaN anyway
    let nodata = nodata.filter(|nod| !nod.is_nan());
    samples.iter().map(|&sample| sample.to_f64_with_nodata(nodata)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_nodata_becomes_nan() {
        let converted = samples_to_f64(&[1u8, 255, 3], Some(255.0));
        assert_eq!(converted[0], 1.0);
        assert!(converted[1].is_nan());
        assert_eq!(converted[2], 3.0);
    }

    #[test]
    fn float_samples_without_nodata() {
        let converted = samples_to_f64(&[1.5f32, f32::NAN, -2.0], None);
        assert_eq!(converted[0], 1.5);
        assert!(converted[1].is_nan());
        assert_eq!(converted[2], -2.0);
        assert!(f32::has_nan());
        assert!(!i16::has_nan());
    }

    #[test]
    fn signed_nodata() {
        let converted = samples_to_f64(&[-9999i16, 0, 7], Some(-9999.0));
        assert!(converted[0].is_nan());
        assert_eq!(&converted[1..], &[0.0, 7.0]);
    }
}
