//! Pipeline configuration, loaded from JSON. Every field is optional and
//! falls back to the defaults for the Eurostat energy-market extract.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::charts::ChartSize;
use crate::error::{AtlasError, AtlasResult};
use crate::features::{FeatureBuilder, LongColumns};
use crate::formula::DerivedColumn;
use crate::scene::SceneStyle;

pub const GAP_COLUMN: &str = "DERIV_energy_price_gap_PC";
pub const RESPONSE: &str = "GRTL_NR";

/// `name = formula` declaration of a derived column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DerivedSpec {
    pub name: String,
    pub formula: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesConfig {
    #[serde(default = "TimeSeriesConfig::default_geo")]
    pub geo: String,
    #[serde(default = "default_variable")]
    pub variable: String,
    #[serde(default = "TimeSeriesConfig::default_size")]
    pub size: ChartSize,
}

impl TimeSeriesConfig {
    fn default_geo() -> String {
        "DE".to_string()
    }
    fn default_size() -> ChartSize {
        ChartSize::new(720, 360)
    }
}

impl Default for TimeSeriesConfig {
    fn default() -> Self {
        Self {
            geo: Self::default_geo(),
            variable: default_variable(),
            size: Self::default_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankedBarConfig {
    #[serde(default = "default_variable")]
    pub variable: String,
    #[serde(default = "RankedBarConfig::default_min_observations")]
    pub min_observations: usize,
    #[serde(default = "RankedBarConfig::default_top_k")]
    pub top_k: usize,
    #[serde(default = "RankedBarConfig::default_size")]
    pub size: ChartSize,
}

impl RankedBarConfig {
    fn default_min_observations() -> usize {
        5
    }
    fn default_top_k() -> usize {
        10
    }
    fn default_size() -> ChartSize {
        ChartSize::new(720, 420)
    }
}

impl Default for RankedBarConfig {
    fn default() -> Self {
        Self {
            variable: default_variable(),
            min_observations: Self::default_min_observations(),
            top_k: Self::default_top_k(),
            size: Self::default_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeatmapConfig {
    #[serde(default = "HeatmapConfig::default_size")]
    pub size: ChartSize,
}

impl HeatmapConfig {
    fn default_size() -> ChartSize {
        ChartSize::new(480, 480)
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            size: Self::default_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileMapConfig {
    #[serde(default = "default_variable")]
    pub variable: String,
    #[serde(default = "TileMapConfig::default_size")]
    pub size: ChartSize,
}

impl TileMapConfig {
    fn default_size() -> ChartSize {
        ChartSize::new(800, 480)
    }
}

impl Default for TileMapConfig {
    fn default() -> Self {
        Self {
            variable: default_variable(),
            size: Self::default_size(),
        }
    }
}

/// Colors as `#rrggbb`, `#rgb` or a color name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub bar_color: Option<String>,
    #[serde(default)]
    pub line_color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub long_columns: LongColumns,
    /// Indicator codes kept when pivoting.
    #[serde(default = "PipelineConfig::default_indicators")]
    pub indicators: Vec<String>,
    #[serde(default = "PipelineConfig::default_derived")]
    pub derived: Vec<DerivedSpec>,
    /// Variables summarized in the descriptive and correlation tables.
    #[serde(default = "PipelineConfig::default_variables")]
    pub variables: Vec<String>,
    #[serde(default = "default_variable")]
    pub response: String,
    #[serde(default = "PipelineConfig::default_predictors")]
    pub predictors: Vec<String>,
    #[serde(default)]
    pub timeseries: TimeSeriesConfig,
    #[serde(default)]
    pub ranked_bar: RankedBarConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    #[serde(default)]
    pub tile_map: TileMapConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

fn default_variable() -> String {
    RESPONSE.to_string()
}

impl PipelineConfig {
    fn default_indicators() -> Vec<String> {
        ["CMPY_ECAP5", "CMPY_EG5", "LCMPY_IECAP", "GRTL"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
    fn default_derived() -> Vec<DerivedSpec> {
        vec![DerivedSpec {
            name: GAP_COLUMN.to_string(),
            formula: "CMPY_ECAP5_PC - CMPY_EG5_PC".to_string(),
        }]
    }
    fn default_variables() -> Vec<String> {
        let mut vars = Self::default_predictors();
        vars.push(RESPONSE.to_string());
        vars
    }
    fn default_predictors() -> Vec<String> {
        ["CMPY_ECAP5_PC", "CMPY_EG5_PC", GAP_COLUMN]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn load(path: &Path) -> AtlasResult<Self> {
        if !path.is_file() {
            return Err(AtlasError::InputNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> AtlasResult<Self> {
        serde_json::from_str(text).map_err(|e| AtlasError::Config(e.to_string()))
    }

    pub fn derived_columns(&self) -> AtlasResult<Vec<DerivedColumn>> {
        self.derived
            .iter()
            .map(|d| DerivedColumn::parse(&d.name, &d.formula))
            .collect()
    }

    pub fn derived_names(&self) -> Vec<&str> {
        self.derived.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn feature_builder(&self) -> AtlasResult<FeatureBuilder> {
        FeatureBuilder::new(self.indicators.iter().cloned(), self.derived_columns()?)
    }

    pub fn scene_style(&self) -> SceneStyle {
        SceneStyle::from_strings(self.style.bar_color.as_deref(), self.style.line_color.as_deref())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            long_columns: LongColumns::default(),
            indicators: Self::default_indicators(),
            derived: Self::default_derived(),
            variables: Self::default_variables(),
            response: default_variable(),
            predictors: Self::default_predictors(),
            timeseries: TimeSeriesConfig::default(),
            ranked_bar: RankedBarConfig::default(),
            heatmap: HeatmapConfig::default(),
            tile_map: TileMapConfig::default(),
            style: StyleConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let cfg = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(cfg.indicators, vec!["CMPY_ECAP5", "CMPY_EG5", "LCMPY_IECAP", "GRTL"]);
        assert_eq!(
            cfg.variables,
            vec!["CMPY_ECAP5_PC", "CMPY_EG5_PC", GAP_COLUMN, "GRTL_NR"]
        );
        assert_eq!(cfg.response, "GRTL_NR");
        assert_eq!(cfg.timeseries.geo, "DE");
        assert_eq!(cfg.timeseries.size, ChartSize::new(720, 360));
        assert_eq!(cfg.ranked_bar.min_observations, 5);
        assert_eq!(cfg.ranked_bar.top_k, 10);
        assert_eq!(cfg.tile_map.size, ChartSize::new(800, 480));
        assert_eq!(cfg.long_columns, LongColumns::default());
        assert_eq!(cfg.derived_columns().unwrap().len(), 1);
    }

    #[test]
    fn test_partial_override() {
        let json = r##"{
            "timeseries": { "geo": "FR" },
            "ranked_bar": { "top_k": 3 },
            "long_columns": { "indicator": "indic" },
            "style": { "bar_color": "#000" }
        }"##;
        let cfg = PipelineConfig::from_json(json).unwrap();
        assert_eq!(cfg.timeseries.geo, "FR");
        assert_eq!(cfg.timeseries.variable, "GRTL_NR");
        assert_eq!(cfg.ranked_bar.top_k, 3);
        assert_eq!(cfg.ranked_bar.min_observations, 5);
        assert_eq!(cfg.long_columns.indicator, "indic");
        assert_eq!(cfg.long_columns.geo, "geo");
        assert_eq!(cfg.scene_style().bar, plotters::style::RGBColor(0, 0, 0));
    }

    #[test]
    fn test_bad_formula_is_config_error() {
        let json = r#"{ "derived": [ { "name": "x", "formula": "a +" } ] }"#;
        let cfg = PipelineConfig::from_json(json).unwrap();
        assert!(matches!(cfg.feature_builder(), Err(AtlasError::Formula { .. })));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(PipelineConfig::from_json("{"), Err(AtlasError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "response": "CMPY_EG5_PC" }}"#).unwrap();
        let cfg = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(cfg.response, "CMPY_EG5_PC");

        let missing = PipelineConfig::load(Path::new("/nonexistent/nrgatlas.json"));
        assert!(matches!(missing, Err(AtlasError::InputNotFound(_))));
    }
}
