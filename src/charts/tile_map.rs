//! Tile-grid map of Europe: one square per geography at a fixed grid slot.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::charts::ChartSize;
use crate::features::MasterTable;
use crate::palette::sequential_color;
use crate::scale::{format_tick, min_max};
use crate::scene::{Anchor, Class, Scene, SceneBuilder, SceneStyle};
use crate::stats::group_means;

/// Rows of geography codes, laid out roughly north to south.
pub const TILE_LAYOUT: &[&[&str]] = &[
    &["IS", "NO", "SE", "FI"],
    &["IE", "UK", "DK", "EE", "LV", "LT"],
    &["PT", "ES", "FR", "BE", "NL", "DE", "PL", "CZ"],
    &["IT", "AT", "CH", "SI", "HR", "HU", "SK"],
    &["BA", "RS", "RO", "BG", "GR", "TR"],
    &["AL", "MK", "XK", "ME", "MD", "UA"],
    &["MT", "CY"],
];

const MARGIN: f64 = 40.0;
const TILE: f64 = 52.0;
const GAP: f64 = 6.0;
const LEGEND_STEPS: usize = 10;
const LEGEND_OFFSET: f64 = 220.0;

/// `(row, column)` of `geo` in [`TILE_LAYOUT`].
pub fn tile_position(geo: &str) -> Option<(usize, usize)> {
    TILE_LAYOUT.iter().enumerate().find_map(|(row, codes)| {
        codes.iter().position(|c| *c == geo).map(|col| (row, col))
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    pub variable: String,
    /// Mean per layout geography that has data.
    pub means: BTreeMap<String, f64>,
    /// Color domain: min/max over `means`.
    pub range: (f64, f64),
}

impl TileMap {
    /// Geographies outside the layout are dropped. `None` when no layout geography has data.
    pub fn from_master(master: &MasterTable, variable: &str) -> Option<Self> {
        let mut means = BTreeMap::new();
        for (geo, mean, _) in group_means(&master.group_by_geo(variable), 1) {
            if tile_position(&geo).is_some() {
                means.insert(geo, mean);
            } else {
                debug!("{} has no tile; omitted from the map", geo);
            }
        }
        let Some(range) = min_max(means.values().copied()) else {
            info!("no mapped geography has {} data; skipping tile map", variable);
            return None;
        };
        Some(Self {
            variable: variable.to_string(),
            means,
            range,
        })
    }

    pub fn color_of(&self, geo: &str) -> plotters::style::RGBColor {
        sequential_color(self.means.get(geo).copied(), self.range.0, self.range.1)
    }

    pub fn render(&self, size: ChartSize, style: &SceneStyle) -> Scene {
        let mut b = SceneBuilder::new(size.width, size.height, style.clone());

        for (row, codes) in TILE_LAYOUT.iter().enumerate() {
            for (col, code) in codes.iter().enumerate() {
                let x = MARGIN + col as f64 * (TILE + GAP);
                let y = MARGIN + row as f64 * (TILE + GAP);
                b.tile(x, y, TILE, self.color_of(code)).text(
                    x + TILE / 2.0,
                    y + TILE / 2.0 + 3.0,
                    code,
                    Class::Country,
                    Anchor::Middle,
                );
            }
        }

        let (vmin, vmax) = self.range;
        let (lx, ly) = (size.width as f64 - LEGEND_OFFSET, MARGIN);
        b.text(lx, ly - 8.0, &format!("Mean {}", self.variable), Class::Legend, Anchor::Start);
        for i in 0..LEGEND_STEPS {
            let t = i as f64 / (LEGEND_STEPS - 1) as f64;
            let value = vmin + t * (vmax - vmin);
            b.legend_entry(
                lx,
                ly + i as f64 * 16.0,
                sequential_color(Some(value), vmin, vmax),
                &format_tick(value, vmax - vmin),
            );
        }

        b.title(&format!("Tile Grid Map: Mean {} by Country", self.variable));
        b.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::test_support::master;
    use crate::palette::NEUTRAL_GRAY;
    use crate::scene::Primitive;

    fn sample() -> MasterTable {
        master(&[
            ("DE", "2020", "GRTL", "NR", "4"),
            ("DE", "2021", "GRTL", "NR", "6"),
            ("FR", "2020", "GRTL", "NR", "10"),
            ("EU27_2020", "2020", "GRTL", "NR", "1000"),
        ])
    }

    #[test]
    fn test_tile_position() {
        assert_eq!(tile_position("IS"), Some((0, 0)));
        assert_eq!(tile_position("DE"), Some((2, 5)));
        assert_eq!(tile_position("CY"), Some((6, 1)));
        assert_eq!(tile_position("EU27_2020"), None);
    }

    #[test]
    fn test_unmapped_geo_excluded_from_range() {
        let map = TileMap::from_master(&sample(), "GRTL_NR").unwrap();
        assert_eq!(map.means.len(), 2);
        assert_eq!(map.range, (5.0, 10.0));
        assert_eq!(map.color_of("DE"), sequential_color(Some(0.0), 0.0, 1.0));
        assert_eq!(map.color_of("PL"), NEUTRAL_GRAY);
    }

    #[test]
    fn test_render_every_layout_tile() {
        let map = TileMap::from_master(&sample(), "GRTL_NR").unwrap();
        let scene = map.render(ChartSize::new(800, 480), &SceneStyle::default());
        let layout_size: usize = TILE_LAYOUT.iter().map(|r| r.len()).sum();
        assert_eq!(scene.count_class(Class::Country), layout_size);

        let texts: Vec<&str> = scene.texts().collect();
        assert!(!texts.contains(&"EU27_2020"));
        assert!(texts.contains(&"Mean GRTL_NR"));

        // Ten swatches at the legend column.
        let swatches = scene
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { x, width, .. } if *x == 580.0 && *width == 18.0))
            .count();
        assert_eq!(swatches, 10);
    }

    #[test]
    fn test_no_mapped_data_is_none() {
        let only_aggregate = master(&[("EU27_2020", "2020", "GRTL", "NR", "1")]);
        assert!(TileMap::from_master(&only_aggregate, "GRTL_NR").is_none());
    }
}
