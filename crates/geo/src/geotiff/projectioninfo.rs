use crate::{Error, Result};

// GeoKey ids
const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

const RASTER_PIXEL_IS_AREA: u16 = 1;
const RASTER_PIXEL_IS_POINT: u16 = 2;

/// Whether the model coordinates of a cell refer to its top left corner or its center (GTRasterTypeGeoKey)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterType {
    #[default]
    PixelIsArea,
    PixelIsPoint,
}

impl RasterType {
    fn geo_key_value(self) -> u16 {
        match self {
            RasterType::PixelIsArea => RASTER_PIXEL_IS_AREA,
            RasterType::PixelIsPoint => RASTER_PIXEL_IS_POINT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    #[default]
    Projected,
    Geographic,
    Geocentric,
}

impl ModelType {
    fn geo_key_value(self) -> u16 {
        match self {
            ModelType::Projected => 1,
            ModelType::Geographic => 2,
            ModelType::Geocentric => 3,
        }
    }
}

/// The raw GeoKey directory with its parameter tags as stored in the tiff
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoKeyDirectory {
    pub directory: Vec<u16>,
    pub double_params: Vec<f64>,
    pub ascii_params: Option<String>,
}

impl GeoKeyDirectory {
    pub fn is_empty(&self) -> bool {
        self.directory.len() < 4
    }

    /// Iterates the (key id, location, count, value) entries
    pub fn keys(&self) -> impl Iterator<Item = &[u16; 4]> {
        let entries = if self.is_empty() { &[][..] } else { &self.directory[4..] };
        entries.as_chunks::<4>().0.iter()
    }

    /// The raster type key, files without the key are pixel is area
    pub fn raster_type(&self) -> RasterType {
        match self.keys().find(|key| key[0] == GT_RASTER_TYPE && key[1] == 0) {
            Some(key) if key[3] == RASTER_PIXEL_IS_POINT => RasterType::PixelIsPoint,
            _ => RasterType::PixelIsArea,
        }
    }

    /// Overwrites the value of an existing raster type key
    pub fn set_raster_type(&mut self, raster_type: RasterType) {
        if self.is_empty() {
            return;
        }

        for key in self.directory[4..].as_chunks_mut::<4>().0 {
            if key[0] == GT_RASTER_TYPE && key[1] == 0 {
                key[3] = raster_type.geo_key_value();
            }
        }
    }
}

/// Coordinate reference system information of a geotiff.
/// The GeoKeys are kept verbatim so they can be written to derived rasters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectionInfo {
    pub model_type: ModelType,
    pub projected_epsg: Option<u32>,
    pub geographic_epsg: Option<u32>,
    pub geo_keys: GeoKeyDirectory,
}

impl ProjectionInfo {
    pub fn from_geo_keys(geo_keys: GeoKeyDirectory) -> Result<Self> {
        if geo_keys.is_empty() {
            return Err(Error::InvalidArgument("GeoKey directory is too small".into()));
        }

        if geo_keys.directory[0] != 1 {
            return Err(Error::Runtime(format!(
                "Unexpected key directory version: {}",
                geo_keys.directory[0]
            )));
        }

        let mut proj_info = ProjectionInfo::default();

        for key in geo_keys.keys() {
            let inline = key[1] == 0;
            match key[0] {
                GT_MODEL_TYPE if inline => {
                    proj_info.model_type = match key[3] {
                        1 => ModelType::Projected,
                        2 => ModelType::Geographic,
                        3 => ModelType::Geocentric,
                        _ => {
                            return Err(Error::Runtime(format!("Unsupported model type: {}", key[3])));
                        }
                    }
                }
                GEOGRAPHIC_TYPE if inline => proj_info.geographic_epsg = Some(u32::from(key[3])),
                PROJECTED_CS_TYPE if inline => proj_info.projected_epsg = Some(u32::from(key[3])),
                GEOGRAPHIC_TYPE | PROJECTED_CS_TYPE => log::debug!("Ignoring non inline crs key {}", key[0]),
                _ => {}
            }
        }

        proj_info.geo_keys = geo_keys;
        Ok(proj_info)
    }

    /// Projection info of a geographic coordinate system identified by an EPSG code
    pub fn geographic(epsg: u16) -> Self {
        ProjectionInfo {
            model_type: ModelType::Geographic,
            projected_epsg: None,
            geographic_epsg: Some(u32::from(epsg)),
            geo_keys: epsg_key_directory(ModelType::Geographic, GEOGRAPHIC_TYPE, epsg),
        }
    }

    /// Projection info of a projected coordinate system identified by an EPSG code
    pub fn projected(epsg: u16) -> Self {
        ProjectionInfo {
            model_type: ModelType::Projected,
            projected_epsg: Some(u32::from(epsg)),
            geographic_epsg: None,
            geo_keys: epsg_key_directory(ModelType::Projected, PROJECTED_CS_TYPE, epsg),
        }
    }

    pub fn epsg(&self) -> Option<u32> {
        match self.model_type {
            ModelType::Projected => self.projected_epsg,
            ModelType::Geographic => self.geographic_epsg,
            ModelType::Geocentric => None,
        }
    }
}

fn epsg_key_directory(model_type: ModelType, crs_key: u16, epsg: u16) -> GeoKeyDirectory {
    #[rustfmt::skip]
    let directory = vec![
        1, 1, 0, 3,
        GT_MODEL_TYPE, 0, 1, model_type.geo_key_value(),
        GT_RASTER_TYPE, 0, 1, RasterType::PixelIsArea.geo_key_value(),
        crs_key, 0, 1, epsg,
    ];

    GeoKeyDirectory {
        directory,
        double_params: Vec::new(),
        ascii_params: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geographic_keys_round_trip() -> Result<()> {
        let info = ProjectionInfo::geographic(4326);
        let parsed = ProjectionInfo::from_geo_keys(info.geo_keys.clone())?;

        assert_eq!(parsed.model_type, ModelType::Geographic);
        assert_eq!(parsed.epsg(), Some(4326));
        assert_eq!(parsed, info);
        Ok(())
    }

    #[test]
    fn projected_keys() -> Result<()> {
        let parsed = ProjectionInfo::from_geo_keys(ProjectionInfo::projected(32643).geo_keys)?;
        assert_eq!(parsed.model_type, ModelType::Projected);
        assert_eq!(parsed.epsg(), Some(32643));
        Ok(())
    }

    #[test]
    fn invalid_directory() {
        assert!(ProjectionInfo::from_geo_keys(GeoKeyDirectory::default()).is_err());

        let keys = GeoKeyDirectory {
            directory: vec![2, 1, 0, 0],
            ..Default::default()
        };
        assert!(ProjectionInfo::from_geo_keys(keys).is_err());
    }

    #[test]
    fn raster_type_key() {
        let mut keys = ProjectionInfo::geographic(4326).geo_keys;
        assert_eq!(keys.raster_type(), RasterType::PixelIsArea);

        keys.set_raster_type(RasterType::PixelIsPoint);
        assert_eq!(keys.raster_type(), RasterType::PixelIsPoint);
        assert_eq!(keys.keys().count(), 3);

        assert_eq!(GeoKeyDirectory::default().raster_type(), RasterType::PixelIsArea);
    }
}
