//! LaTeX table fragments, one `table` environment per artifact.

use std::collections::BTreeSet;

use crate::stats::{CorrelationMatrix, DescriptiveStat, RegressionFit};

/// Escape characters that are special in LaTeX text mode.
pub fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '_' | '&' | '%' | '#' | '$' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Renders statistics as LaTeX tables. Values of derived columns get one
/// extra decimal.
#[derive(Debug, Clone, Default)]
pub struct TableEmitter {
    derived: BTreeSet<String>,
}

impl TableEmitter {
    pub fn new<I, S>(derived: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            derived: derived.into_iter().map(Into::into).collect(),
        }
    }

    fn decimals(&self, variable: &str) -> usize {
        if self.derived.contains(variable) {
            3
        } else {
            2
        }
    }

    pub fn descriptives(&self, stats: &[DescriptiveStat]) -> String {
        let body = stats
            .iter()
            .map(|s| {
                let p = self.decimals(&s.variable);
                format!(
                    "{} & {} & {:.p$} & {:.p$} & {:.p$} & {:.p$} \\\\",
                    escape_latex(&s.variable),
                    s.n,
                    s.mean,
                    s.stddev,
                    s.min,
                    s.max,
                    p = p
                )
            })
            .collect();
        environment(
            "Descriptive statistics",
            "tab:descriptives",
            "lrrrrr",
            "Variable & N & Mean & SD & Min & Max \\\\",
            body,
        )
    }

    pub fn correlations(&self, matrix: &CorrelationMatrix) -> String {
        let names: Vec<String> = matrix.variables.iter().map(|v| escape_latex(v)).collect();
        let header = format!(" & {} \\\\", names.join(" & "));
        let body = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cells: Vec<String> = (0..matrix.len())
                    .map(|j| format!("{:.2}", matrix.get(i, j)))
                    .collect();
                format!("{} & {} \\\\", name, cells.join(" & "))
            })
            .collect();
        let spec = format!("l{}", "r".repeat(matrix.len()));
        environment("Correlation matrix", "tab:corr", &spec, &header, body)
    }

    /// Regressions of `response` on each predictor, in the order given.
    pub fn regressions(&self, response: &str, fits: &[RegressionFit]) -> String {
        let body = fits
            .iter()
            .map(|f| {
                let p = self.decimals(&f.predictor);
                format!(
                    "{} $\\sim$ {} & {:.p$} & {:.p$} & {:.3} & {} \\\\",
                    escape_latex(&f.response),
                    escape_latex(&f.predictor),
                    f.intercept,
                    f.slope,
                    f.r_squared,
                    f.n,
                    p = p
                )
            })
            .collect();
        let caption = format!(
            "Bivariate regressions: {} on price indicators",
            escape_latex(response)
        );
        environment(
            &caption,
            "tab:reg_bivar",
            "lrrrr",
            "Model & Intercept & Slope & $R^2$ & N \\\\",
            body,
        )
    }
}

fn environment(caption: &str, label: &str, columns: &str, header: &str, body: Vec<String>) -> String {
    let mut lines = vec![
        "\\begin{table}[ht]".to_string(),
        "\\centering".to_string(),
        format!("\\caption{{{}}}", caption),
        format!("\\label{{{}}}", label),
        format!("\\begin{{tabular}}{{{}}}", columns),
        "\\hline".to_string(),
        header.to_string(),
        "\\hline".to_string(),
    ];
    lines.extend(body);
    lines.push("\\hline".to_string());
    lines.push("\\end{tabular}".to_string());
    lines.push("\\end{table}".to_string());
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
