//! Data-quality profiles of the long input and the master table.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::features::{MasterTable, Observation};
use crate::scale::min_max;
use crate::stats::mean;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongProfile {
    pub rows: usize,
    pub skipped_rows: usize,
    pub missing_values: usize,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub geos: usize,
    pub units: usize,
    pub indicators: usize,
    /// Observation count per indicator code.
    pub rows_per_indicator: BTreeMap<String, usize>,
    /// Observation count per geography code.
    pub rows_per_geo: BTreeMap<String, usize>,
}

impl LongProfile {
    pub fn new(observations: &[Observation], skipped_rows: usize) -> Self {
        let mut units = BTreeSet::new();
        let mut rows_per_indicator: BTreeMap<String, usize> = BTreeMap::new();
        let mut rows_per_geo: BTreeMap<String, usize> = BTreeMap::new();
        for obs in observations {
            units.insert(obs.unit.as_str());
            *rows_per_indicator.entry(obs.indicator.clone()).or_default() += 1;
            *rows_per_geo.entry(obs.geo.clone()).or_default() += 1;
        }
        let range = min_max(observations.iter().filter_map(|o| o.value));
        Self {
            rows: observations.len(),
            skipped_rows,
            missing_values: observations.iter().filter(|o| o.value.is_none()).count(),
            min_value: range.map(|r| r.0),
            max_value: range.map(|r| r.1),
            geos: rows_per_geo.len(),
            units: units.len(),
            indicators: rows_per_indicator.len(),
            rows_per_indicator,
            rows_per_geo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCoverage {
    pub column: String,
    pub missing: usize,
    pub missing_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterProfile {
    pub rows: usize,
    pub geos: usize,
    pub first_year: Option<String>,
    pub last_year: Option<String>,
    pub coverage: Vec<ColumnCoverage>,
    /// Per variable, the mean of its present values in each year.
    pub yearly_means: BTreeMap<String, BTreeMap<String, f64>>,
}

impl MasterProfile {
    pub fn new(master: &MasterTable, variables: &[String]) -> Self {
        let geos: BTreeSet<&str> = master.rows.iter().map(|r| r.geo.as_str()).collect();
        let years: BTreeSet<&str> = master
            .rows
            .iter()
            .map(|r| r.year.as_str())
            .filter(|y| !y.is_empty())
            .collect();

        let coverage = master
            .feature_columns()
            .iter()
            .map(|column| {
                let missing = master.column(column).iter().filter(|v| v.is_none()).count();
                let missing_pct = if master.is_empty() {
                    0.0
                } else {
                    100.0 * missing as f64 / master.len() as f64
                };
                ColumnCoverage {
                    column: column.clone(),
                    missing,
                    missing_pct,
                }
            })
            .collect();

        let yearly_means = variables
            .iter()
            .map(|v| {
                let by_year: BTreeMap<String, f64> = master
                    .group_by_year(v)
                    .into_iter()
                    .map(|(year, values)| (year, mean(&values)))
                    .collect();
                (v.clone(), by_year)
            })
            .collect();

        Self {
            rows: master.len(),
            geos: geos.len(),
            first_year: years.first().map(|y| y.to_string()),
            last_year: years.last().map(|y| y.to_string()),
            coverage,
            yearly_means,
        }
    }
}

/// Combined profile printed by the `profile` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityProfile {
    pub long: LongProfile,
    pub master: MasterProfile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureBuilder;

    fn observations() -> Vec<Observation> {
        vec![
            Observation::new("DE", "2020", "GRTL", "NR", "4"),
            Observation::new("DE", "2021", "GRTL", "NR", "6"),
            Observation::new("FR", "2021", "GRTL", "NR", ""),
            Observation::new("FR", "2021", "CMPY_EG5", "PC", "2.5"),
        ]
    }

    #[test]
    fn test_long_profile() {
        let p = LongProfile::new(&observations(), 2);
        assert_eq!(p.rows, 4);
        assert_eq!(p.skipped_rows, 2);
        assert_eq!(p.missing_values, 1);
        assert_eq!((p.min_value, p.max_value), (Some(2.5), Some(6.0)));
        assert_eq!((p.geos, p.units, p.indicators), (2, 2, 2));
        assert_eq!(p.rows_per_indicator.get("GRTL"), Some(&3));
        assert_eq!(p.rows_per_geo.get("DE"), Some(&2));
        assert_eq!(p.rows_per_geo.get("FR"), Some(&2));
        assert_eq!(p.rows_per_geo.get("IT"), None);
    }

    #[test]
    fn test_master_profile() {
        let master = FeatureBuilder::new(["GRTL", "CMPY_EG5"], Vec::new())
            .unwrap()
            .build(&observations());
        let p = MasterProfile::new(&master, &["GRTL_NR".to_string()]);
        assert_eq!(p.rows, 3);
        assert_eq!(p.geos, 2);
        assert_eq!(p.first_year.as_deref(), Some("2020"));
        assert_eq!(p.last_year.as_deref(), Some("2021"));

        let grtl = p.coverage.iter().find(|c| c.column == "GRTL_NR").unwrap();
        assert_eq!(grtl.missing, 1);
        assert!((grtl.missing_pct - 100.0 / 3.0).abs() < 1e-9);

        let means = &p.yearly_means["GRTL_NR"];
        assert_eq!(means.get("2020"), Some(&4.0));
        assert_eq!(means.get("2021"), Some(&6.0));
    }

    #[test]
    fn test_serializes_to_json() {
        let p = LongProfile::new(&[], 0);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["rows"], 0);
        assert!(json["min_value"].is_null());
    }
}
