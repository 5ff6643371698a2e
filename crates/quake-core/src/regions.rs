use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, ViewError};

const BUILTIN_REGIONS: &str = include_str!("regions.toml");

#[derive(Debug, Deserialize)]
struct RegionsFile {
    #[serde(default)]
    continent: Vec<ContinentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContinentEntry {
    name: String,
    #[serde(default)]
    regions: Vec<String>,
}

/// Hand-curated lookup from continent names to the place names that belong to them.
///
/// Built once at startup and shared read-only afterwards. Continents keep their curated
/// order so selectors can list them the same way every time.
#[derive(Debug, Clone)]
pub struct ContinentMap {
    continents: Vec<ContinentEntry>,
}

impl ContinentMap {
    /// The map shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_REGIONS)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: RegionsFile = toml::from_str(content)?;
        Self::from_entries(parsed.continent)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ViewError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Names are stored trimmed so they match what selectors send.
    fn from_entries(mut continents: Vec<ContinentEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &mut continents {
            entry.name = entry.name.trim().to_string();
            if entry.name.is_empty() {
                return Err(ViewError::Regions("continent with an empty name".to_string()));
            }
            if !seen.insert(entry.name.clone()) {
                return Err(ViewError::Regions(format!(
                    "continent '{}' is listed more than once",
                    entry.name
                )));
            }
        }
        Ok(Self { continents })
    }

    /// Continent names in curated order.
    pub fn continents(&self) -> Vec<&str> {
        self.continents.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn contains(&self, continent: &str) -> bool {
        self.entry(continent).is_some()
    }

    /// Member regions of one continent, or `None` for an unknown name.
    pub fn regions_of(&self, continent: &str) -> Option<&[String]> {
        self.entry(continent).map(|entry| entry.regions.as_slice())
    }

    /// Every continent listing `place`; a region can belong to several.
    pub fn continents_of(&self, place: &str) -> Vec<&str> {
        self.continents
            .iter()
            .filter(|entry| entry.regions.iter().any(|region| region == place))
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// Union of the member regions of the selected continents.
    ///
    /// An empty selection yields an empty set; an unknown continent is an error.
    pub fn resolve_regions<S: AsRef<str>>(&self, selected: &[S]) -> Result<BTreeSet<String>> {
        let mut regions = BTreeSet::new();
        for continent in selected {
            let continent = continent.as_ref();
            let members = self
                .regions_of(continent)
                .ok_or_else(|| ViewError::InvalidSelection(continent.to_string()))?;
            regions.extend(members.iter().cloned());
        }
        Ok(regions)
    }

    fn entry(&self, continent: &str) -> Option<&ContinentEntry> {
        self.continents.iter().find(|entry| entry.name == continent)
    }
}
