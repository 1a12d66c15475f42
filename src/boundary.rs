use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use geo::vector::{BoundaryGeometry, io::read_boundary};
use geojson::GeoJson;
use serde::Serialize;

use crate::{BoundarySelector, Error, RegionCatalog, RegionLabel, Result};

const OUTLINE_FILE: &str = "sa_outline.geojson";

/// A boundary geometry together with the name of its region
#[derive(Debug, Clone)]
pub struct ResolvedBoundary {
    pub selector: BoundarySelector,
    pub label: RegionLabel,
    pub geometry: BoundaryGeometry,
}

impl ResolvedBoundary {
    pub fn polygons(&self) -> &[geo_types::Polygon<f64>] {
        &self.geometry.polygons
    }

    pub fn bbox(&self) -> Option<[f64; 4]> {
        self.geometry.bbox_array()
    }
}

/// Boundary layer payload: `{region, bbox, geojson}`
#[derive(Debug, Clone, Serialize)]
pub struct BoundaryLayer {
    pub region: Vec<String>,
    pub bbox: Option<[f64; 4]>,
    pub geojson: GeoJson,
}

/// District outlines of a country: `{country, bbox, geojson}`
#[derive(Debug, Clone, Serialize)]
pub struct DistrictsLayer {
    pub country: String,
    pub bbox: Option<[f64; 4]>,
    pub geojson: GeoJson,
}

/// Locates the boundary files by naming convention and reads them
#[derive(Clone)]
pub struct BoundaryResolver {
    boundary_dir: PathBuf,
    catalog: Arc<dyn RegionCatalog>,
}

impl BoundaryResolver {
    pub fn new(boundary_dir: impl Into<PathBuf>, catalog: Arc<dyn RegionCatalog>) -> Self {
        BoundaryResolver {
            boundary_dir: boundary_dir.into(),
            catalog,
        }
    }

    pub fn boundary_path(&self, selector: BoundarySelector) -> PathBuf {
        match selector {
            BoundarySelector::Total => self.boundary_dir.join(OUTLINE_FILE),
            BoundarySelector::Country(id) => self.boundary_dir.join("sa_countries").join(format!("country_{id}.geojson")),
            BoundarySelector::State(id) => self.boundary_dir.join("sa_states").join(format!("state_{id}.geojson")),
        }
    }

    pub fn districts_path(&self, country_id: u32) -> PathBuf {
        self.boundary_dir
            .join("sa_districts_c")
            .join("simplified")
            .join(format!("districts_c{country_id}.json"))
    }

    pub fn label(&self, selector: BoundarySelector) -> Result<RegionLabel> {
        RegionLabel::for_selector(selector, self.catalog.as_ref())
    }

    pub fn resolve(&self, selector: BoundarySelector) -> Result<ResolvedBoundary> {
        let geometry = read_boundary_file(&self.boundary_path(selector), &selector.to_string())?;
        let label = self.label(selector)?;

        log::debug!(
            "Resolved boundary {selector} ({label}): {} polygon(s), bbox {:?}",
            geometry.polygons.len(),
            geometry.bbox_array()
        );

        Ok(ResolvedBoundary {
            selector,
            label,
            geometry,
        })
    }

    pub fn boundary_layer(&self, selector: BoundarySelector) -> Result<BoundaryLayer> {
        let boundary = self.resolve(selector)?;
        Ok(BoundaryLayer {
            bbox: boundary.bbox(),
            region: boundary.label.parts().to_vec(),
            geojson: boundary.geometry.geojson,
        })
    }

    pub fn country_districts(&self, country_id: u32) -> Result<DistrictsLayer> {
        let geometry = read_boundary_file(&self.districts_path(country_id), &format!("districts of country {country_id}"))?;
        let label = self.label(BoundarySelector::Country(country_id))?;

        Ok(DistrictsLayer {
            country: label.parts().first().cloned().unwrap_or_default(),
            bbox: geometry.bbox_array(),
            geojson: geometry.geojson,
        })
    }
}

fn read_boundary_file(path: &Path, description: &str) -> Result<BoundaryGeometry> {
    if !path.is_file() {
        log::debug!("Boundary file not found: {}", path.display());
        return Err(Error::BoundaryNotFound(format!("No boundary available for {description}")));
    }

    Ok(read_boundary(path)?)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::StaticRegionCatalog;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "Polygon", "coordinates": [[[80.0, 6.0], [82.0, 6.0], [82.0, 9.0], [80.0, 9.0], [80.0, 6.0]]] }
        }]
    }"#;

    fn resolver(dir: &Path) -> Result<BoundaryResolver> {
        let catalog = StaticRegionCatalog::new()
            .with_country(2, "Sri Lanka")
            .with_state(12, "north western", 2)?;
        Ok(BoundaryResolver::new(dir, Arc::new(catalog)))
    }

    fn write_boundary(path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, SQUARE)?;
        Ok(())
    }

    #[test]
    fn boundary_file_names() -> Result<()> {
        let resolver = resolver(Path::new("/assets"))?;
        assert_eq!(resolver.boundary_path(BoundarySelector::Total), PathBuf::from("/assets/sa_outline.geojson"));
        assert_eq!(
            resolver.boundary_path(BoundarySelector::Country(2)),
            PathBuf::from("/assets/sa_countries/country_2.geojson")
        );
        assert_eq!(
            resolver.boundary_path(BoundarySelector::State(12)),
            PathBuf::from("/assets/sa_states/state_12.geojson")
        );
        assert_eq!(
            resolver.districts_path(2),
            PathBuf::from("/assets/sa_districts_c/simplified/districts_c2.json")
        );
        Ok(())
    }

    #[test_log::test]
    fn resolve_state() -> Result<()> {
        let tmp = TempDir::new()?;
        let resolver = resolver(tmp.path())?;
        write_boundary(resolver.boundary_path(BoundarySelector::State(12)))?;

        let boundary = resolver.resolve(BoundarySelector::State(12))?;
        assert_eq!(boundary.label.to_string(), "North Western, Sri Lanka");
        assert_eq!(boundary.polygons().len(), 1);
        assert_eq!(boundary.bbox(), Some([80.0, 6.0, 82.0, 9.0]));

        let layer = resolver.boundary_layer(BoundarySelector::State(12))?;
        let json = serde_json::to_value(&layer)?;
        assert_eq!(json["region"], serde_json::json!(["North Western", "Sri Lanka"]));
        assert_eq!(json["bbox"], serde_json::json!([80.0, 6.0, 82.0, 9.0]));
        assert_eq!(json["geojson"]["type"], "FeatureCollection");
        Ok(())
    }

    #[test_log::test]
    fn missing_boundary() -> Result<()> {
        let tmp = TempDir::new()?;
        let resolver = resolver(tmp.path())?;

        assert!(matches!(
            resolver.resolve(BoundarySelector::State(9999)),
            Err(Error::BoundaryNotFound(_))
        ));

        // file present but no catalog entry
        write_boundary(resolver.boundary_path(BoundarySelector::Country(3)))?;
        assert!(matches!(
            resolver.resolve(BoundarySelector::Country(3)),
            Err(Error::BoundaryNotFound(_))
        ));
        Ok(())
    }

    #[test_log::test]
    fn country_districts() -> Result<()> {
        let tmp = TempDir::new()?;
        let resolver = resolver(tmp.path())?;
        write_boundary(resolver.districts_path(2))?;

        let districts = resolver.country_districts(2)?;
        assert_eq!(districts.country, "Sri Lanka");
        assert_eq!(districts.bbox, Some([80.0, 6.0, 82.0, 9.0]));
        assert!(matches!(resolver.country_districts(1), Err(Error::BoundaryNotFound(_))));
        Ok(())
    }
}
