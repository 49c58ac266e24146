//! Long → wide pivot producing the master feature table.
//!
//! ```text
//!  long rows (geo, year, indicator, unit, value)
//!        │  allow-list filter
//!        ▼
//!  (geo, year) → { "<indicator>_<unit>" → raw value }
//!        │  derived columns
//!        ▼
//!  MasterTable: geo, year, <columns lexicographic>
//! ```

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use serde::Deserialize;

use crate::error::{AtlasError, AtlasResult};
use crate::formula::DerivedColumn;
use crate::table::{cell_at, parse_numeric, Table};

pub const GEO: &str = "geo";
pub const YEAR: &str = "year";

/// Number of decimals kept when a derived value is stored as text.
pub const DERIVED_PRECISION: usize = 3;

/// Column names of the long-format input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LongColumns {
    pub geo: String,
    pub year: String,
    pub indicator: String,
    pub unit: String,
    pub value: String,
}

impl Default for LongColumns {
    fn default() -> Self {
        Self {
            geo: GEO.to_string(),
            year: YEAR.to_string(),
            indicator: "indic_nrgm".to_string(),
            unit: "unit".to_string(),
            value: "value".to_string(),
        }
    }
}

/// One long-format observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub geo: String,
    pub year: String,
    pub indicator: String,
    pub unit: String,
    pub value: Option<f64>,
    /// Value text as read, carried into the master table unchanged.
    pub raw: String,
}

impl Observation {
    pub fn new(geo: &str, year: &str, indicator: &str, unit: &str, raw: &str) -> Self {
        Self {
            geo: geo.to_string(),
            year: year.to_string(),
            indicator: indicator.to_string(),
            unit: unit.to_string(),
            value: parse_numeric(raw),
            raw: raw.to_string(),
        }
    }

    pub fn column_name(&self) -> String {
        format!("{}_{}", self.indicator, self.unit)
    }

    pub fn from_long_table(table: &Table, cols: &LongColumns) -> AtlasResult<Vec<Observation>> {
        let ctx = "long table";
        let geo = table.require_column(&cols.geo, ctx)?;
        let year = table.require_column(&cols.year, ctx)?;
        let indicator = table.require_column(&cols.indicator, ctx)?;
        let unit = table.require_column(&cols.unit, ctx)?;
        let value = table.require_column(&cols.value, ctx)?;

        Ok(table
            .rows
            .iter()
            .map(|r| {
                Observation::new(
                    cell_at(r, geo),
                    cell_at(r, year),
                    cell_at(r, indicator),
                    cell_at(r, unit),
                    cell_at(r, value),
                )
            })
            .collect())
    }
}

/// One wide row keyed by (geo, year). Empty cells are missing.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterRow {
    pub geo: String,
    pub year: String,
    pub cells: BTreeMap<String, String>,
}

impl MasterRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            GEO => Some(&self.geo),
            YEAR => Some(&self.year),
            _ => self.cells.get(column).map(|s| s.as_str()),
        }
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(parse_numeric)
    }
}

/// The master feature table. Rows sorted by (geo, year); columns are
/// `geo`, `year`, then every feature column in lexicographic order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MasterTable {
    pub columns: Vec<String>,
    pub rows: Vec<MasterRow>,
}

impl MasterTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature columns, i.e. everything after `geo` and `year`.
    pub fn feature_columns(&self) -> &[String] {
        &self.columns[2.min(self.columns.len())..]
    }

    pub fn column(&self, name: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.get_f64(name)).collect()
    }

    /// Present values of `name` grouped by geography, in row order within each group.
    pub fn group_by_geo(&self, name: &str) -> BTreeMap<String, Vec<f64>> {
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in &self.rows {
            if row.geo.is_empty() {
                continue;
            }
            if let Some(v) = row.get_f64(name) {
                groups.entry(row.geo.clone()).or_default().push(v);
            }
        }
        groups
    }

    /// Present values of `name` grouped by year.
    pub fn group_by_year(&self, name: &str) -> BTreeMap<String, Vec<f64>> {
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in &self.rows {
            if row.year.is_empty() {
                continue;
            }
            if let Some(v) = row.get_f64(name) {
                groups.entry(row.year.clone()).or_default().push(v);
            }
        }
        groups
    }

    pub fn to_table(&self) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|r| {
                self.columns
                    .iter()
                    .map(|c| r.get(c).unwrap_or("").to_string())
                    .collect()
            })
            .collect();
        Table::new(self.columns.clone(), rows)
    }

    /// Rebuild a master table from a previously written one.
    pub fn from_table(table: &Table) -> AtlasResult<Self> {
        let ctx = "master table";
        let geo = table.require_column(GEO, ctx)?;
        let year = table.require_column(YEAR, ctx)?;

        let feature_idx: Vec<(usize, &String)> = table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != geo && *i != year)
            .collect();

        let mut names: Vec<String> = feature_idx.iter().map(|(_, h)| (*h).clone()).collect();
        names.sort();
        names.dedup();
        let mut columns = vec![GEO.to_string(), YEAR.to_string()];
        columns.extend(names);

        let rows = table
            .rows
            .iter()
            .map(|r| MasterRow {
                geo: cell_at(r, geo).to_string(),
                year: cell_at(r, year).to_string(),
                cells: feature_idx
                    .iter()
                    .map(|(i, h)| ((*h).clone(), cell_at(r, *i).to_string()))
                    .collect(),
            })
            .collect();

        Ok(Self { columns, rows })
    }
}

/// Pivots allowed observations into a [`MasterTable`] and computes derived columns.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    allowed: BTreeSet<String>,
    derived: Vec<DerivedColumn>,
}

impl FeatureBuilder {
    pub fn new<I, S>(allowed: I, derived: Vec<DerivedColumn>) -> AtlasResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: BTreeSet<String> = allowed.into_iter().map(Into::into).collect();
        let mut seen = BTreeSet::new();
        for d in &derived {
            if d.name == GEO || d.name == YEAR {
                return Err(AtlasError::Formula {
                    name: d.name.clone(),
                    message: "derived column cannot shadow a key column".to_string(),
                });
            }
            if !seen.insert(d.name.clone()) {
                return Err(AtlasError::Formula {
                    name: d.name.clone(),
                    message: "derived column declared twice".to_string(),
                });
            }
        }
        Ok(Self { allowed, derived })
    }

    pub fn build<'a, I>(&self, observations: I) -> MasterTable
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let mut pivot: BTreeMap<(String, String), BTreeMap<String, String>> = BTreeMap::new();
        let mut columns: BTreeSet<String> = BTreeSet::new();
        let mut dropped = 0usize;

        for obs in observations {
            if !self.allowed.contains(&obs.indicator) {
                dropped += 1;
                continue;
            }
            let col = obs.column_name();
            columns.insert(col.clone());
            let cells = pivot.entry((obs.geo.clone(), obs.year.clone())).or_default();
            if let Some(prev) = cells.insert(col, obs.raw.clone()) {
                debug!(
                    "duplicate observation for {}/{} {}: replacing '{}'",
                    obs.geo,
                    obs.year,
                    obs.column_name(),
                    prev
                );
            }
        }
        debug!("{} observations outside the indicator allow-list", dropped);

        for d in &self.derived {
            columns.insert(d.name.clone());
        }

        let rows: Vec<MasterRow> = pivot
            .into_iter()
            .map(|((geo, year), mut cells)| {
                for col in &columns {
                    cells.entry(col.clone()).or_default();
                }
                let mut row = MasterRow { geo, year, cells };
                for d in &self.derived {
                    let value = d
                        .expr
                        .eval(&|name: &str| row.get_f64(name))
                        .map(|v| format!("{:.*}", DERIVED_PRECISION, v))
                        .unwrap_or_default();
                    row.cells.insert(d.name.clone(), value);
                }
                row
            })
            .collect();

        let mut ordered = vec![GEO.to_string(), YEAR.to_string()];
        ordered.extend(columns.into_iter().filter(|c| c != GEO && c != YEAR));

        info!("built master table: {} rows, {} columns", rows.len(), ordered.len());
        MasterTable {
            columns: ordered,
            rows,
        }
    }
}
