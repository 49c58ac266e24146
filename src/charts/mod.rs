//! Chart recipes.
//!
//! Each recipe is split into a preparation step (`from_master`, returning
//! `None` when there is nothing to draw) and a `render` step that turns the
//! prepared data into a [`Scene`](crate::scene::Scene).

pub mod heatmap;
pub mod ranked_bar;
pub mod tile_map;
pub mod timeseries;

use serde::Deserialize;

use crate::scale::{format_tick, Scale};
use crate::scene::{PlotArea, SceneBuilder};

pub use heatmap::Heatmap;
pub use ranked_bar::RankedBars;
pub use tile_map::{tile_position, TileMap, TILE_LAYOUT};
pub use timeseries::TimeSeries;

/// Pixel dimensions of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl ChartSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Number of labelled ticks on a value axis.
pub const VALUE_TICKS: usize = 5;

/// Horizontal gridline plus label for each of the value ticks of `y`.
pub(crate) fn value_axis(builder: &mut SceneBuilder, area: &PlotArea, y: &Scale) {
    for value in y.ticks(VALUE_TICKS) {
        let py = y.map(value);
        builder
            .horizontal_gridline(area, py)
            .y_tick(area, py, &format_tick(value, y.span()));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::features::{FeatureBuilder, MasterTable, Observation};

    /// Master table from `(geo, year, indicator, unit, value)` tuples, no derived columns.
    pub fn master(rows: &[(&str, &str, &str, &str, &str)]) -> MasterTable {
        let obs: Vec<Observation> = rows
            .iter()
            .map(|(g, y, i, u, v)| Observation::new(g, y, i, u, v))
            .collect();
        let indicators: Vec<&str> = rows.iter().map(|r| r.2).collect();
        FeatureBuilder::new(indicators, Vec::new()).unwrap().build(&obs)
    }

    /// The three German rows used throughout the chart tests.
    pub fn germany() -> MasterTable {
        master(&[
            ("DE", "2020", "CMPY_ECAP5", "PC", "10.0"),
            ("DE", "2020", "GRTL", "NR", "5.0"),
            ("DE", "2021", "CMPY_ECAP5", "PC", "12.0"),
            ("DE", "2021", "GRTL", "NR", "5.5"),
            ("DE", "2022", "CMPY_ECAP5", "PC", "11.0"),
            ("DE", "2022", "GRTL", "NR", "5.2"),
        ])
    }
}
