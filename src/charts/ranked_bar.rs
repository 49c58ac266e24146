use std::cmp::Ordering;

use log::info;

use crate::charts::{value_axis, ChartSize};
use crate::features::MasterTable;
use crate::scale::Scale;
use crate::scene::{Anchor, Class, PlotArea, Scene, SceneBuilder, SceneStyle};
use crate::stats::group_means;

const MARGIN: f64 = 80.0;
const BAR_FILL: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedBar {
    pub geo: String,
    pub mean: f64,
    pub n: usize,
}

/// Geographies ranked by their mean value of one variable, highest first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedBars {
    pub variable: String,
    pub min_observations: usize,
    pub bars: Vec<RankedBar>,
}

impl RankedBars {
    /// Geographies with fewer than `min_observations` present values are left out.
    pub fn from_master(
        master: &MasterTable,
        variable: &str,
        min_observations: usize,
        top_k: usize,
    ) -> Option<Self> {
        let mut bars: Vec<RankedBar> = group_means(&master.group_by_geo(variable), min_observations)
            .into_iter()
            .map(|(geo, mean, n)| RankedBar { geo, mean, n })
            .collect();
        bars.sort_by(|a, b| {
            b.mean
                .partial_cmp(&a.mean)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.geo.cmp(&b.geo))
        });
        bars.truncate(top_k);

        if bars.is_empty() {
            info!(
                "no geography has {} values of {}; skipping ranked bars",
                min_observations, variable
            );
            return None;
        }
        Some(Self {
            variable: variable.to_string(),
            min_observations,
            bars,
        })
    }

    pub fn max_mean(&self) -> f64 {
        self.bars.iter().map(|b| b.mean).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn render(&self, size: ChartSize, style: &SceneStyle) -> Scene {
        let area = PlotArea::inset(size.width, size.height, MARGIN);
        let y = Scale::new((0.0, self.max_mean()), area.y_range());
        let slot = area.width() / self.bars.len() as f64;
        let bar_width = slot * BAR_FILL;

        let mut b = SceneBuilder::new(size.width, size.height, style.clone());
        b.axes(&area);
        value_axis(&mut b, &area, &y);

        for (i, bar) in self.bars.iter().enumerate() {
            let cx = area.left + (i as f64 + 0.5) * slot;
            let top = y.map(bar.mean);
            b.bar(cx, bar_width, top, area.bottom)
                .x_tick(&area, cx, &bar.geo)
                .text(cx, top.min(area.bottom) - 6.0, &format!("{:.1}", bar.mean), Class::Tick, Anchor::Middle);
        }

        b.text(
            area.left,
            size.height as f64 - 20.0,
            &format!("Geographies with at least {} observations", self.min_observations),
            Class::Note,
            Anchor::Start,
        )
        .title(&format!("Top countries by mean {}", self.variable));
        b.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::test_support::master;
    use crate::scene::Primitive;

    fn rows(geo: &'static str, values: &[&'static str]) -> Vec<(&'static str, &'static str, &'static str, &'static str, &'static str)> {
        const YEARS: [&str; 8] = ["2015", "2016", "2017", "2018", "2019", "2020", "2021", "2022"];
        values
            .iter()
            .zip(YEARS)
            .map(|(v, y)| (geo, y, "GRTL", "NR", *v))
            .collect()
    }

    fn sample() -> MasterTable {
        let mut all = rows("DE", &["1", "2", "3", "4", "5"]);
        all.extend(rows("FR", &["9", "9", "9"]));
        all.extend(rows("IT", &["6", "6", "6", "6", "6"]));
        all.extend(rows("AT", &["3", "3", "3", "3", "3"]));
        master(&all)
    }

    #[test]
    fn test_threshold_excludes_sparse_geo() {
        let ranked = RankedBars::from_master(&sample(), "GRTL_NR", 5, 10).unwrap();
        let geos: Vec<&str> = ranked.bars.iter().map(|b| b.geo.as_str()).collect();
        // FR has the highest mean but only 3 observations.
        assert_eq!(geos, vec!["IT", "AT", "DE"]);
        assert_eq!(ranked.bars[0].n, 5);
    }

    #[test]
    fn test_ties_broken_by_geo() {
        let ranked = RankedBars::from_master(&sample(), "GRTL_NR", 5, 10).unwrap();
        // AT and DE both average 3.0.
        assert_eq!(ranked.bars[1].mean, ranked.bars[2].mean);
        assert!(ranked.bars[1].geo < ranked.bars[2].geo);
    }

    #[test]
    fn test_top_k_truncates() {
        let ranked = RankedBars::from_master(&sample(), "GRTL_NR", 3, 2).unwrap();
        let geos: Vec<&str> = ranked.bars.iter().map(|b| b.geo.as_str()).collect();
        assert_eq!(geos, vec!["FR", "IT"]);
    }

    #[test]
    fn test_nothing_above_threshold() {
        assert!(RankedBars::from_master(&sample(), "GRTL_NR", 6, 10).is_none());
    }

    #[test]
    fn test_bar_geometry() {
        let ranked = RankedBars::from_master(&sample(), "GRTL_NR", 5, 10).unwrap();
        let scene = ranked.render(ChartSize::new(720, 420), &SceneStyle::default());
        let bars: Vec<(f64, f64, f64, f64)> = scene
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Rect { x, y, width, height, class: Some(Class::Bar), .. } => {
                    Some((*x, *y, *width, *height))
                }
                _ => None,
            })
            .collect();
        assert_eq!(bars.len(), 3);
        // Plot area 80..640 split into three slots of ~186.7px.
        let slot = 560.0 / 3.0;
        assert!((bars[0].0 - (80.0 + slot * 0.2)).abs() < 1e-9);
        assert!((bars[0].2 - slot * 0.6).abs() < 1e-9);
        // The tallest bar reaches the top of the plot area.
        assert_eq!(bars[0].1, 80.0);
        assert_eq!(bars[0].3, 260.0);
        assert!(bars[1].3 < bars[0].3);
        assert_eq!(scene.count_class(Class::Note), 1);
    }
}
