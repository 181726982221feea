use serde::{Deserialize, Serialize};

/// Level of a geography in the census hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoType {
    State,      // Highest-level entity
    County,     // County -> State
    Tract,      // Tract -> County
}

impl GeoType {
    pub fn to_str(&self) -> &'static str {
        match self {
            GeoType::State => "state",
            GeoType::County => "county",
            GeoType::Tract => "tract",
        }
    }

    /// Number of digits in a full GEOID at this level.
    pub fn id_len(&self) -> usize {
        match self {
            GeoType::State => 2,
            GeoType::County => 5,
            GeoType::Tract => 11,
        }
    }
}

impl std::fmt::Display for GeoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}
