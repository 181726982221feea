use std::{collections::HashMap, sync::LazyLock};

use log::{debug, warn};
use polars::prelude::{Column, DataFrame, DataType, IdxCa, IdxSize};
use regex::Regex;

use crate::{config::TableSchema, error::{Result, ScoreError}};
use super::{geo_id::GeoId, geo_type::GeoType, geography::{Geography, key_columns}};

/// Columns renamed by the CSV reader when a header repeats.
static DUPLICATE_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_duplicated_\d+$").expect("valid regex")
});

/// A set of geographies and their indicator columns, one row per geography.
///
/// Tables are never mutated in place: every selection or join returns a new
/// table, so a caller can keep reusing the original across analysis runs.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    ty: GeoType,
    geographies: Vec<Geography>,
    index: HashMap<GeoId, usize>, // Map between geo_ids and row indices.
    data: DataFrame,              // Indicator columns only
}

impl FeatureTable {
    /// Assemble a table from its row keys and indicator columns.
    pub fn new(ty: GeoType, geographies: Vec<Geography>, data: DataFrame) -> Result<Self> {
        if data.width() > 0 && data.height() != geographies.len() {
            return Err(ScoreError::invalid("table", format!(
                "{} geographies but {} rows of indicator data", geographies.len(), data.height(),
            )));
        }

        let mut index = HashMap::with_capacity(geographies.len());
        for (row, geography) in geographies.iter().enumerate() {
            if geography.geo_id.ty() != ty {
                return Err(ScoreError::invalid("table", format!(
                    "{geography} is a {}, expected a {ty}", geography.geo_id.ty(),
                )));
            }
            if index.insert(geography.geo_id.clone(), row).is_some() {
                return Err(ScoreError::DuplicateGeography { geo_id: geography.geo_id.id().to_string() });
            }
        }

        Ok(Self { ty, geographies, index, data })
    }

    /// Build a table from a raw frame served by the data layer.
    ///
    /// Key columns become the row index; repeated and `Unnamed` columns are
    /// dropped, keeping the first occurrence.
    pub fn from_frame(df: DataFrame, schema: &TableSchema) -> Result<Self> {
        let ids = string_column(&df, &schema.id_column)?;
        let states = string_column(&df, &schema.state_column)?;
        let names = string_column(&df, &schema.name_column)?;

        let geographies = ids.iter().zip(&states).zip(&names)
            .map(|((id, state), name)| Geography::new(GeoId::new(schema.geo_type, id), state, name))
            .collect();

        let keys = [&schema.id_column, &schema.state_column, &schema.name_column];
        let mut keep = Vec::with_capacity(df.width());
        for name in df.get_column_names() {
            let name = name.as_str();
            if keys.iter().any(|key| key.as_str() == name) { continue }
            if DUPLICATE_COLUMN.is_match(name) || name.starts_with("Unnamed") || name.is_empty() {
                warn!("[table] dropping repeated or unnamed column '{name}'");
                continue;
            }
            keep.push(name.to_string());
        }

        let data = df.select(keep)?;
        debug!("[table] loaded {} {}s with {} indicator columns", data.height(), schema.geo_type, data.width());
        Self::new(schema.geo_type, geographies, data)
    }

    #[inline] pub fn geo_type(&self) -> GeoType { self.ty }

    #[inline] pub fn len(&self) -> usize { self.geographies.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geographies.is_empty() }

    #[inline] pub fn geographies(&self) -> &[Geography] { &self.geographies }

    /// Row index of a geography.
    #[inline] pub fn row(&self, geo_id: &GeoId) -> Option<usize> { self.index.get(geo_id).copied() }

    /// Raw indicator frame (no key columns).
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    pub fn column_names(&self) -> Vec<String> {
        self.data.get_column_names().into_iter().map(|name| name.to_string()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.get_column_names().into_iter().any(|column| column.as_str() == name)
    }

    /// Values of a numeric indicator as `f64`, one per geography.
    /// A null or NaN cell is reported with the geography it belongs to.
    pub fn indicator(&self, name: &str) -> Result<Vec<f64>> {
        self.optional_indicator(name)?.into_iter()
            .zip(&self.geographies)
            .map(|(value, geography)| {
                value.ok_or_else(|| ScoreError::MissingValue {
                    column: name.to_string(),
                    geography: geography.to_string(),
                })
            })
            .collect()
    }

    /// Like [`indicator`](Self::indicator), but null and NaN cells become `None`.
    pub fn optional_indicator(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.data.column(name).map_err(|_| ScoreError::missing_column(name))?;
        if !column.dtype().is_primitive_numeric() {
            return Err(ScoreError::NonNumericColumn { column: name.to_string(), dtype: column.dtype().to_string() });
        }

        let values = column.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().map(|value| value.filter(|v| !v.is_nan())).collect())
    }

    /// Keep geographies whose state matches `state` (case-insensitive).
    pub fn in_state(&self, state: &str) -> Result<Self> {
        let state = state.trim();
        self.filter(|geo| geo.state.eq_ignore_ascii_case(state))
    }

    /// Keep geographies whose name is in `names` (case-insensitive).
    pub fn with_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        self.filter(|geo| names.iter().any(|name| geo.name.eq_ignore_ascii_case(name.as_ref().trim())))
    }

    /// Keep geographies inside `parent` (e.g., the tracts of one county).
    pub fn within(&self, parent: &GeoId) -> Result<Self> {
        self.filter(|geo| geo.geo_id.is_within(parent))
    }

    /// Keep geographies matching `predicate`, preserving row order.
    pub fn filter(&self, predicate: impl Fn(&Geography) -> bool) -> Result<Self> {
        let rows: Vec<usize> = self.geographies.iter().enumerate()
            .filter_map(|(row, geo)| predicate(geo).then_some(row))
            .collect();
        self.take_rows(&rows)
    }

    /// Left join the columns of `other` by geography id.
    ///
    /// Every geography in `self` must be present in `other`; columns already
    /// in `self` keep their original values.
    pub fn merge(&self, other: &FeatureTable) -> Result<Self> {
        let rows = self.geographies.iter()
            .map(|geo| {
                other.row(&geo.geo_id)
                    .ok_or_else(|| ScoreError::UnmatchedGeography { geography: geo.to_string() })
            })
            .collect::<Result<Vec<usize>>>()?;

        let joined = other.data.take(&row_indices(&rows))?;
        let columns: Vec<Column> = joined.get_columns().iter()
            .filter(|column| {
                let duplicate = self.has_column(column.name().as_str());
                if duplicate { debug!("[table] merge keeps existing column '{}'", column.name()) }
                !duplicate
            })
            .cloned()
            .collect();

        let data = if self.data.width() == 0 {
            DataFrame::new(columns)?
        } else {
            self.data.hstack(&columns)?
        };
        Self::new(self.ty, self.geographies.clone(), data)
    }

    /// Key columns followed by every indicator column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = key_columns(&self.geographies);
        columns.extend(self.data.get_columns().iter().cloned());
        Ok(DataFrame::new(columns)?)
    }

    fn take_rows(&self, rows: &[usize]) -> Result<Self> {
        let data = if self.data.width() == 0 {
            DataFrame::empty()
        } else {
            self.data.take(&row_indices(rows))?
        };
        let geographies = rows.iter().map(|&row| self.geographies[row].clone()).collect();
        Self::new(self.ty, geographies, data)
    }
}

fn row_indices(rows: &[usize]) -> IdxCa {
    IdxCa::from_vec("rows".into(), rows.iter().map(|&row| row as IdxSize).collect())
}

/// Read a key column as text, one entry per row.
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name).map_err(|_| ScoreError::missing_column(name))?;
    let column = column.cast(&DataType::String)?;
    column.str()?.into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.map(str::to_string).ok_or_else(|| ScoreError::MissingValue {
                column: name.to_string(),
                geography: format!("row {row}"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use polars::prelude::{NamedFrom, Series};

    use super::*;

    fn counties() -> FeatureTable {
        let df = DataFrame::new(vec![
            Series::new("county_id".into(), &[6075i64, 6001, 8059]).into(),
            Series::new("State".into(), &["California", "California", "Colorado"]).into(),
            Series::new("County Name".into(), &["San Francisco County", "Alameda County", "Jefferson County"]).into(),
            Series::new("Unemployment Rate (%)".into(), &[3.0, 4.5, 5.0]).into(),
            Series::new("Unemployment Rate (%)_duplicated_0".into(), &[9.0, 9.0, 9.0]).into(),
            Series::new("Unnamed: 0".into(), &[0i64, 1, 2]).into(),
        ]).unwrap();
        FeatureTable::from_frame(df, &TableSchema::counties()).unwrap()
    }

    #[test]
    fn from_frame_extracts_keys_and_drops_repeats() {
        let table = counties();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names(), vec!["Unemployment Rate (%)".to_string()]);
        assert_eq!(table.geographies()[0].geo_id.id(), "06075");
        assert_eq!(&*table.geographies()[2].name, "Jefferson County");
        assert_eq!(table.indicator("Unemployment Rate (%)").unwrap(), vec![3.0, 4.5, 5.0]);
    }

    #[test]
    fn duplicate_geographies_are_rejected() {
        let df = DataFrame::new(vec![
            Series::new("county_id".into(), &["06075", "06075"]).into(),
            Series::new("State".into(), &["California", "California"]).into(),
            Series::new("County Name".into(), &["San Francisco County", "San Francisco County"]).into(),
        ]).unwrap();
        let result = FeatureTable::from_frame(df, &TableSchema::counties());
        assert!(matches!(result, Err(ScoreError::DuplicateGeography { .. })));
    }

    #[test]
    fn missing_indicator_names_the_column() {
        let err = counties().indicator("Median Age").unwrap_err();
        assert!(err.to_string().contains("Median Age"));
    }

    #[test]
    fn null_value_names_the_geography() {
        let df = DataFrame::new(vec![
            Series::new("county_id".into(), &["06075", "06001"]).into(),
            Series::new("State".into(), &["California", "California"]).into(),
            Series::new("County Name".into(), &["San Francisco County", "Alameda County"]).into(),
            Series::new("Median Age".into(), &[Some(38.0), None]).into(),
        ]).unwrap();
        let table = FeatureTable::from_frame(df, &TableSchema::counties()).unwrap();
        let err = table.indicator("Median Age").unwrap_err();
        assert!(err.to_string().contains("Alameda County"), "{err}");
        assert_eq!(table.optional_indicator("Median Age").unwrap(), vec![Some(38.0), None]);
    }

    #[test]
    fn text_indicator_is_not_numeric() {
        let df = DataFrame::new(vec![
            Series::new("county_id".into(), &["06075"]).into(),
            Series::new("State".into(), &["California"]).into(),
            Series::new("County Name".into(), &["San Francisco County"]).into(),
            Series::new("Unemployment Rate Date".into(), &["2021-01-01"]).into(),
        ]).unwrap();
        let table = FeatureTable::from_frame(df, &TableSchema::counties()).unwrap();
        assert!(matches!(table.indicator("Unemployment Rate Date"), Err(ScoreError::NonNumericColumn { .. })));
    }

    #[test]
    fn selections_return_new_tables() {
        let table = counties();
        let california = table.in_state("california").unwrap();
        assert_eq!(california.len(), 2);
        assert_eq!(california.indicator("Unemployment Rate (%)").unwrap(), vec![3.0, 4.5]);
        assert_eq!(table.len(), 3);

        let alameda = table.with_names(&["alameda county"]).unwrap();
        assert_eq!(alameda.len(), 1);

        let colorado = table.within(&GeoId::new(GeoType::State, "08")).unwrap();
        assert_eq!(&*colorado.geographies()[0].state, "Colorado");
    }

    #[test]
    fn merge_joins_by_geo_id() {
        let table = counties();
        let rents = DataFrame::new(vec![
            Series::new("county_id".into(), &["08059", "06001", "06075"]).into(),
            Series::new("State".into(), &["Colorado", "California", "California"]).into(),
            Series::new("County Name".into(), &["Jefferson County", "Alameda County", "San Francisco County"]).into(),
            Series::new("fmr_0".into(), &[1100.0, 1500.0, 2000.0]).into(),
        ]).unwrap();
        let rents = FeatureTable::from_frame(rents, &TableSchema::counties()).unwrap();

        let merged = table.merge(&rents).unwrap();
        assert_eq!(merged.indicator("fmr_0").unwrap(), vec![2000.0, 1500.0, 1100.0]);

        let partial = rents.filter(|geo| geo.geo_id.id() != "06001").unwrap();
        assert!(matches!(table.merge(&partial), Err(ScoreError::UnmatchedGeography { .. })));
    }

    #[test]
    fn to_frame_leads_with_keys() {
        let frame = counties().to_frame().unwrap();
        let names: Vec<String> = frame.get_column_names().into_iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["geo_id", "State", "Name", "Unemployment Rate (%)"]);
    }
}
