mod geo_id;
mod geo_type;
mod geography;
mod table;

pub use geo_id::GeoId;
pub use geo_type::GeoType;
pub use geography::Geography;
pub use table::FeatureTable;

pub(crate) use geography::key_columns;
