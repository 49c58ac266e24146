use log::info;

use crate::charts::{value_axis, ChartSize};
use crate::features::MasterTable;
use crate::scale::Scale;
use crate::scene::{Anchor, Class, PlotArea, Scene, SceneBuilder, SceneStyle};

const MARGIN: f64 = 60.0;

/// One geography's values of one variable, ordered by year.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub geo: String,
    pub variable: String,
    pub points: Vec<(i32, f64)>,
}

impl TimeSeries {
    /// `None` when the geography has no present value for `variable`.
    pub fn from_master(master: &MasterTable, geo: &str, variable: &str) -> Option<Self> {
        let mut points: Vec<(i32, f64)> = master
            .rows
            .iter()
            .filter(|r| r.geo == geo)
            .filter_map(|r| Some((r.year.trim().parse::<i32>().ok()?, r.get_f64(variable)?)))
            .collect();
        if points.is_empty() {
            info!("no {} data for {}; skipping time series", variable, geo);
            return None;
        }
        points.sort_by_key(|(year, _)| *year);
        Some(Self {
            geo: geo.to_string(),
            variable: variable.to_string(),
            points,
        })
    }

    pub fn x_domain(&self) -> (f64, f64) {
        let first = self.points.first().map_or(0, |p| p.0) as f64;
        let last = self.points.last().map_or(0, |p| p.0) as f64;
        (first, last)
    }

    pub fn y_domain(&self) -> (f64, f64) {
        let lo = self.points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let hi = self.points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        (lo, hi)
    }

    pub fn render(&self, size: ChartSize, style: &SceneStyle) -> Scene {
        let area = PlotArea::inset(size.width, size.height, MARGIN);
        let x = Scale::new(self.x_domain(), area.x_range());
        let y = Scale::new(self.y_domain(), area.y_range());

        let mut b = SceneBuilder::new(size.width, size.height, style.clone());
        b.axes(&area);

        // Label every other observed year.
        for (year, _) in self.points.iter().step_by(2) {
            let px = x.map(*year as f64);
            b.vertical_gridline(&area, px).x_tick(&area, px, &year.to_string());
        }
        value_axis(&mut b, &area, &y);

        let path = self
            .points
            .iter()
            .map(|(year, v)| (x.map(*year as f64), y.map(*v)))
            .collect();
        b.polyline(path);

        b.text(
            (area.left + area.right) / 2.0,
            size.height as f64 - 20.0,
            "Year",
            Class::Label,
            Anchor::Middle,
        )
        .text(area.left, area.top - 10.0, &self.variable, Class::Label, Anchor::Start)
        .title(&format!("{} {} over time", self.geo, self.variable));
        b.finish()
    }
}
