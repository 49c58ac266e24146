//! Descriptive statistics, Pearson correlation and bivariate OLS.
//!
//! Every function takes columns of optional values and ignores missing
//! entries. Degenerate inputs (fewer than two values, zero variance) yield
//! 0.0 rather than an error.

use std::collections::BTreeMap;

use serde::Serialize;

pub fn present(column: &[Option<f64>]) -> Vec<f64> {
    column.iter().flatten().copied().collect()
}

/// Rows where both columns are present.
pub fn pairwise_complete(a: &[Option<f64>], b: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); 0.0 below two values.
pub fn stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStat {
    pub variable: String,
    pub n: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

/// `None` when the column has no values at all.
pub fn describe(variable: &str, column: &[Option<f64>]) -> Option<DescriptiveStat> {
    let values = present(column);
    Some(DescriptiveStat {
        variable: variable.to_string(),
        n: values.len(),
        mean: mean(&values),
        stddev: stddev(&values),
        min: min(&values)?,
        max: max(&values)?,
    })
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < 2 {
        return 0.0;
    }
    let mx = mean(x);
    let my = mean(y);
    // Deviations are scaled into [-1, 1] so the sums of squares stay finite.
    let sx = max_abs_deviation(x, mx);
    let sy = max_abs_deviation(y, my);
    if sx == 0.0 || sy == 0.0 || !sx.is_finite() || !sy.is_finite() {
        return 0.0;
    }
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = (a - mx) / sx;
        let dy = (b - my) / sy;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let den = (sxx * syy).sqrt();
    if den == 0.0 {
        0.0
    } else {
        (sxy / den).clamp(-1.0, 1.0)
    }
}

fn max_abs_deviation(values: &[f64], center: f64) -> f64 {
    values.iter().map(|v| (v - center).abs()).fold(0.0, f64::max)
}

/// Pearson correlation over pairwise-complete cases.
pub fn correlation(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let (x, y) = pairwise_complete(a, b);
    pearson(&x, &y)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub variables: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// Correlation of every pair in `columns`, each unordered pair computed once.
pub fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let n = columns.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = correlation(&columns[i].1, &columns[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        variables: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionFit {
    pub predictor: String,
    pub response: String,
    pub intercept: f64,
    pub slope: f64,
    pub r_squared: f64,
    pub n: usize,
    /// Residual standard error, sqrt(SS_res / (n - 2)); 0.0 when n <= 2.
    pub residual_se: f64,
    defined: bool,
}

impl RegressionFit {
    /// False when the predictor had no variance or fewer than two pairs were usable.
    pub fn is_defined(&self) -> bool {
        self.defined
    }
}

/// Least-squares fit of `response` on `predictor` over pairwise-complete cases.
pub fn simple_regression(
    predictor: &str,
    response: &str,
    x: &[Option<f64>],
    y: &[Option<f64>],
) -> RegressionFit {
    let (xs, ys) = pairwise_complete(x, y);
    let n = xs.len();
    let undefined = RegressionFit {
        predictor: predictor.to_string(),
        response: response.to_string(),
        intercept: 0.0,
        slope: 0.0,
        r_squared: 0.0,
        n,
        residual_se: 0.0,
        defined: false,
    };
    if n < 2 {
        return undefined;
    }

    let mx = mean(&xs);
    let my = mean(&ys);
    let num: f64 = xs.iter().zip(&ys).map(|(a, b)| (a - mx) * (b - my)).sum();
    let den: f64 = xs.iter().map(|a| (a - mx).powi(2)).sum();
    if den == 0.0 {
        return undefined;
    }

    let slope = num / den;
    let intercept = my - slope * mx;
    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(a, b)| (b - (intercept + slope * a)).powi(2))
        .sum();
    let ss_tot: f64 = ys.iter().map(|b| (b - my).powi(2)).sum();
    let r_squared = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };
    let residual_se = if n > 2 {
        (ss_res / (n - 2) as f64).sqrt()
    } else {
        0.0
    };

    RegressionFit {
        intercept,
        slope,
        r_squared,
        residual_se,
        defined: true,
        ..undefined
    }
}

/// Mean and observation count per group, keeping groups with at least `min_count` values.
pub fn group_means(groups: &BTreeMap<String, Vec<f64>>, min_count: usize) -> Vec<(String, f64, usize)> {
    groups
        .iter()
        .filter(|(_, vs)| !vs.is_empty() && vs.len() >= min_count)
        .map(|(k, vs)| (k.clone(), mean(vs), vs.len()))
        .collect()
}
