use std::{collections::HashMap, fmt, path::Path, str::FromStr};

use serde::Deserialize;

use crate::{Error, Result};

pub const STUDY_AREA_NAME: &str = "South Asia";

/// Administrative level of a boundary request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    Total,
    Country,
    State,
}

impl FromStr for AdminLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "total" => Ok(AdminLevel::Total),
            "country" => Ok(AdminLevel::Country),
            "state" => Ok(AdminLevel::State),
            _ => Err(Error::InvalidArgument(format!("Invalid admin level: '{s}'"))),
        }
    }
}

/// Identifies the boundary a layer is clipped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundarySelector {
    /// The complete study area
    Total,
    Country(u32),
    State(u32),
}

impl BoundarySelector {
    pub fn from_admin_level(level: AdminLevel, id: Option<u32>) -> Result<Self> {
        match (level, id) {
            (AdminLevel::Total, _) => Ok(BoundarySelector::Total),
            (AdminLevel::Country, Some(id)) => Ok(BoundarySelector::Country(id)),
            (AdminLevel::State, Some(id)) => Ok(BoundarySelector::State(id)),
            (level, None) => Err(Error::InvalidArgument(format!("An admin level id is required for {level:?}"))),
        }
    }
}

impl fmt::Display for BoundarySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundarySelector::Total => write!(f, "total"),
            BoundarySelector::Country(id) => write!(f, "country {id}"),
            BoundarySelector::State(id) => write!(f, "state {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    pub name: String,
    pub country_name: String,
}

/// Lookup of the display names of the administrative regions
pub trait RegionCatalog: Send + Sync {
    fn country_name(&self, id: u32) -> Option<String>;
    fn state(&self, id: u32) -> Option<StateRecord>;
}

/// In-memory region catalog
#[derive(Debug, Clone, Default)]
pub struct StaticRegionCatalog {
    countries: HashMap<u32, String>,
    states: HashMap<u32, StateRecord>,
}

#[derive(Deserialize)]
struct CountryEntry {
    id: u32,
    name: String,
}

#[derive(Deserialize)]
struct StateEntry {
    id: u32,
    name: String,
    country_id: u32,
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    countries: Vec<CountryEntry>,
    #[serde(default)]
    states: Vec<StateEntry>,
}

impl StaticRegionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country(mut self, id: u32, name: impl Into<String>) -> Self {
        self.countries.insert(id, name.into());
        self
    }

    /// Adds a state of a country that is already present in the catalog
    pub fn with_state(mut self, id: u32, name: impl Into<String>, country_id: u32) -> Result<Self> {
        let country_name = self
            .countries
            .get(&country_id)
            .cloned()
            .ok_or_else(|| Error::InvalidArgument(format!("State {id} refers to unknown country {country_id}")))?;

        self.states.insert(
            id,
            StateRecord {
                name: name.into(),
                country_name,
            },
        );
        Ok(self)
    }

    /// Parses a catalog document: `{"countries": [{"id", "name"}], "states": [{"id", "name", "country_id"}]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)?;

        let mut catalog = doc
            .countries
            .into_iter()
            .fold(StaticRegionCatalog::new(), |catalog, country| catalog.with_country(country.id, country.name));

        for state in doc.states {
            catalog = catalog.with_state(state.id, state.name, state.country_id)?;
        }

        log::debug!(
            "Region catalog with {} countries and {} states",
            catalog.countries.len(),
            catalog.states.len()
        );
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| {
            Error::IOError(std::io::Error::new(
                err.kind(),
                format!("Failed to read region catalog '{}': {err}", path.display()),
            ))
        })?;

        Self::from_json(&json)
    }
}

impl RegionCatalog for StaticRegionCatalog {
    fn country_name(&self, id: u32) -> Option<String> {
        self.countries.get(&id).cloned()
    }

    fn state(&self, id: u32) -> Option<StateRecord> {
        self.states.get(&id).cloned()
    }
}

/// Human readable name of a region, from the most to the least specific part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionLabel(Vec<String>);

impl RegionLabel {
    pub fn new(parts: Vec<String>) -> Self {
        RegionLabel(parts)
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Label parts joined with `_`, used as prefix of download file names
    pub fn file_prefix(&self) -> String {
        self.0.join("_")
    }

    pub fn for_selector(selector: BoundarySelector, catalog: &dyn RegionCatalog) -> Result<Self> {
        match selector {
            BoundarySelector::Total => Ok(RegionLabel(vec![STUDY_AREA_NAME.to_string()])),
            BoundarySelector::Country(id) => catalog
                .country_name(id)
                .map(|name| RegionLabel(vec![name]))
                .ok_or_else(|| Error::BoundaryNotFound(format!("No country with id {id}"))),
            BoundarySelector::State(id) => catalog
                .state(id)
                .map(|state| RegionLabel(vec![title_case(&state.name), state.country_name]))
                .ok_or_else(|| Error::BoundaryNotFound(format!("No state with id {id}"))),
        }
    }
}

impl fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// Capitalizes every whitespace separated word, the remainder of each word is lowercased
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "countries": [{ "id": 1, "name": "India" }, { "id": 2, "name": "Sri Lanka" }],
        "states": [{ "id": 12, "name": "north western", "country_id": 2 }, { "id": 7, "name": "UTTAR PRADESH", "country_id": 1 }]
    }"#;

    #[test]
    fn title_casing() {
        assert_eq!(title_case("north western"), "North Western");
        assert_eq!(title_case("UTTAR  PRADESH"), "Uttar Pradesh");
        assert_eq!(title_case("jammu & kashmir"), "Jammu & Kashmir");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn admin_levels() -> Result<()> {
        assert_eq!("country".parse::<AdminLevel>()?, AdminLevel::Country);
        assert_eq!("State".parse::<AdminLevel>()?, AdminLevel::State);
        assert!("district".parse::<AdminLevel>().is_err());

        assert_eq!(BoundarySelector::from_admin_level(AdminLevel::Total, None)?, BoundarySelector::Total);
        assert_eq!(
            BoundarySelector::from_admin_level(AdminLevel::State, Some(4))?,
            BoundarySelector::State(4)
        );
        assert!(matches!(
            BoundarySelector::from_admin_level(AdminLevel::Country, None),
            Err(Error::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn labels_from_catalog() -> Result<()> {
        let catalog = StaticRegionCatalog::from_json(CATALOG)?;

        let total = RegionLabel::for_selector(BoundarySelector::Total, &catalog)?;
        assert_eq!(total.to_string(), "South Asia");

        let country = RegionLabel::for_selector(BoundarySelector::Country(2), &catalog)?;
        assert_eq!(country.parts(), ["Sri Lanka"]);

        let state = RegionLabel::for_selector(BoundarySelector::State(12), &catalog)?;
        assert_eq!(state.to_string(), "North Western, Sri Lanka");
        assert_eq!(state.file_prefix(), "North Western_Sri Lanka");

        let state = RegionLabel::for_selector(BoundarySelector::State(7), &catalog)?;
        assert_eq!(state.to_string(), "Uttar Pradesh, India");
        Ok(())
    }

    #[test]
    fn unknown_regions() -> Result<()> {
        let catalog = StaticRegionCatalog::from_json(CATALOG)?;
        assert!(matches!(
            RegionLabel::for_selector(BoundarySelector::Country(99), &catalog),
            Err(Error::BoundaryNotFound(_))
        ));
        assert!(matches!(
            RegionLabel::for_selector(BoundarySelector::State(9999), &catalog),
            Err(Error::BoundaryNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn state_of_unknown_country() {
        let json = r#"{ "states": [{ "id": 1, "name": "nowhere", "country_id": 5 }] }"#;
        assert!(StaticRegionCatalog::from_json(json).is_err());
        assert!(StaticRegionCatalog::from_json("not json").is_err());
    }
}
