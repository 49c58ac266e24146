/// Affine map of `value` from `[d0, d1]` onto `[r0, r1]`.
/// A degenerate domain maps everything to the middle of the range.
pub fn linear_map(value: f64, d0: f64, d1: f64, r0: f64, r1: f64) -> f64 {
    if d0 == d1 {
        return (r0 + r1) / 2.0;
    }
    let ratio = (value - d0) / (d1 - d0);
    r0 + ratio * (r1 - r0)
}

/// A continuous data → pixel scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub domain: (f64, f64), // Data min/max
    pub range: (f64, f64),  // Pixel min/max (may be inverted for y)
}

impl Scale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Scale whose domain is the observed min/max of `values`. `None` when empty.
    pub fn fit<I>(values: I, range: (f64, f64)) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let (min, max) = min_max(values)?;
        Some(Self::new((min, max), range))
    }

    pub fn map(&self, value: f64) -> f64 {
        linear_map(value, self.domain.0, self.domain.1, self.range.0, self.range.1)
    }

    /// `count` evenly spaced values across the domain, endpoints included.
    /// A degenerate domain yields its single value.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        if d0 == d1 || count < 2 {
            return vec![d0];
        }
        let step = (d1 - d0) / (count - 1) as f64;
        (0..count).map(|i| d0 + step * i as f64).collect()
    }

    pub fn span(&self) -> f64 {
        (self.domain.1 - self.domain.0).abs()
    }
}

pub fn min_max<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Tick label with precision adapted to the span of the axis.
pub fn format_tick(value: f64, span: f64) -> String {
    let decimals = if span >= 10.0 {
        0
    } else if span >= 1.0 {
        1
    } else {
        2
    };
    format!("{:.*}", decimals, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_map() {
        assert_eq!(linear_map(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
        assert_eq!(linear_map(0.0, 0.0, 10.0, 300.0, 60.0), 300.0);
        assert_eq!(linear_map(10.0, 0.0, 10.0, 300.0, 60.0), 60.0);
    }

    #[test]
    fn test_linear_map_degenerate_domain() {
        assert_eq!(linear_map(7.0, 3.0, 3.0, 0.0, 100.0), 50.0);
        assert_eq!(linear_map(7.0, 3.0, 3.0, 300.0, 60.0), 180.0);
    }

    #[test]
    fn test_scale_fit() {
        let s = Scale::fit(vec![5.0, 5.5, 5.2], (300.0, 60.0)).unwrap();
        assert_eq!(s.domain, (5.0, 5.5));
        assert_eq!(s.map(5.0), 300.0);
        assert_eq!(s.map(5.5), 60.0);
        assert!(Scale::fit(Vec::<f64>::new(), (0.0, 1.0)).is_none());
    }

    #[test]
    fn test_ticks() {
        let s = Scale::new((0.0, 8.0), (0.0, 1.0));
        assert_eq!(s.ticks(5), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        let flat = Scale::new((3.0, 3.0), (0.0, 1.0));
        assert_eq!(flat.ticks(5), vec![3.0]);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(12.345, 40.0), "12");
        assert_eq!(format_tick(5.26, 2.0), "5.3");
        assert_eq!(format_tick(5.127, 0.5), "5.13");
    }
}
