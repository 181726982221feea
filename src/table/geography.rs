use std::sync::Arc;

use polars::prelude::{Column, NamedFrom, Series};

use super::geo_id::GeoId;

pub(crate) const GEO_ID: &str = "geo_id";
pub(crate) const STATE: &str = "State";
pub(crate) const NAME: &str = "Name";

/// A county or census tract: stable id plus its human-readable (state, name) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Geography {
    pub geo_id: GeoId,
    pub state: Arc<str>,
    pub name: Arc<str>,  // County name or census tract label
}

impl Geography {
    pub fn new(geo_id: GeoId, state: &str, name: &str) -> Self {
        Self { geo_id, state: Arc::from(state.trim()), name: Arc::from(name.trim()) }
    }
}

impl std::fmt::Display for Geography {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {} ({})", self.name, self.state, self.geo_id.id())
    }
}

/// Leading key columns shared by every exported table.
pub(crate) fn key_columns<'a>(geographies: impl IntoIterator<Item = &'a Geography>) -> Vec<Column> {
    let (ids, (states, names)): (Vec<&str>, (Vec<&str>, Vec<&str>)) = geographies.into_iter()
        .map(|geo| (geo.geo_id.id(), (&*geo.state, &*geo.name)))
        .unzip();

    vec![
        Series::new(GEO_ID.into(), ids).into(),
        Series::new(STATE.into(), states).into(),
        Series::new(NAME.into(), names).into(),
    ]
}
