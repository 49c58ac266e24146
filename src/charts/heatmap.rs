use log::info;
use plotters::style::RGBColor;

use crate::charts::ChartSize;
use crate::features::MasterTable;
use crate::palette::{diverging_color, CORRELATION_DOMAIN};
use crate::scene::{Anchor, Class, Scene, SceneBuilder, SceneStyle};
use crate::stats::{correlation_matrix, CorrelationMatrix};

const MARGIN: f64 = 100.0;
const LEGEND_STEPS: [f64; 5] = [1.0, 0.5, 0.0, -0.5, -1.0];

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub matrix: CorrelationMatrix,
}

impl Heatmap {
    /// `None` when none of `variables` has a single present value.
    pub fn from_master(master: &MasterTable, variables: &[String]) -> Option<Self> {
        let columns: Vec<(String, Vec<Option<f64>>)> = variables
            .iter()
            .map(|v| (v.clone(), master.column(v)))
            .collect();
        if !columns.iter().any(|(_, c)| c.iter().any(Option::is_some)) {
            info!("no data for the correlation heatmap; skipping");
            return None;
        }
        Some(Self {
            matrix: correlation_matrix(&columns),
        })
    }

    pub fn render(&self, size: ChartSize, style: &SceneStyle) -> Scene {
        let n = self.matrix.len();
        let (left, top) = (MARGIN, MARGIN);
        let extent = (size.width as f64 - 2.0 * MARGIN).min(size.height as f64 - 2.0 * MARGIN);
        let cell = extent / n.max(1) as f64;

        let mut b = SceneBuilder::new(size.width, size.height, style.clone());
        for i in 0..n {
            for j in 0..n {
                let r = self.matrix.get(i, j);
                let x = left + j as f64 * cell;
                let y = top + i as f64 * cell;
                b.cell(x, y, cell, cell, diverging_color(r, CORRELATION_DOMAIN))
                    .colored_text(
                        x + cell / 2.0,
                        y + cell / 2.0 + 4.0,
                        &format!("{:.2}", r),
                        Class::Label,
                        RGBColor(255, 255, 255),
                    );
            }
        }
        for (i, name) in self.matrix.variables.iter().enumerate() {
            let offset = i as f64 * cell + cell / 2.0;
            b.text(left - 10.0, top + offset + 4.0, name, Class::Label, Anchor::End)
                .text(left + offset, top - 10.0, name, Class::Label, Anchor::Middle);
        }

        let lx = left + extent + 16.0;
        b.text(lx, top - 8.0, "r", Class::Legend, Anchor::Start);
        for (k, value) in LEGEND_STEPS.iter().enumerate() {
            b.legend_entry(
                lx,
                top + k as f64 * 16.0,
                diverging_color(*value, CORRELATION_DOMAIN),
                &format!("{:.1}", value),
            );
        }

        b.title("Correlation Heatmap");
        b.finish()
    }
}
