/// Integer percentile in `[1, 100]`, used with the nearest-rank method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentile(u32);

impl Percentile {
    pub const P5: Percentile = Percentile(5);
    pub const P95: Percentile = Percentile(95);

    /// Zero-based index of the nearest-rank element, `ceil(p * n / 100) - 1`.
    pub fn rank_index(&self, n: usize) -> usize {
        assert!(n > 0, "percentile of an empty sample");
        let rank = (self.0 as usize * n).div_ceil(100);
        rank.max(1) - 1
    }
}

/// Nearest-rank percentile of an ascending sample.
pub fn nearest_rank(sorted: &[f64], percentile: Percentile) -> f64 {
    sorted[percentile.rank_index(sorted.len())]
}

/// Arithmetic mean, summed in slice order.
pub fn mean(values: &[f64]) -> f64 {
    assert!(!values.is_empty(), "mean of an empty sample");
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rank_index() {
        assert_eq!(Percentile::P5.rank_index(1000), 49);
        assert_eq!(Percentile::P95.rank_index(1000), 949);
        assert_eq!(Percentile::P5.rank_index(1), 0);
        assert_eq!(Percentile::P95.rank_index(1), 0);
        assert_eq!(Percentile::P5.rank_index(21), 1);
        assert_eq!(Percentile::P95.rank_index(20), 18);
    }

    #[test]
    fn test_nearest_rank() {
        let sorted: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        assert_eq!(nearest_rank(&sorted, Percentile::P5), 5.0);
        assert_eq!(nearest_rank(&sorted, Percentile::P95), 95.0);
        assert_eq!(nearest_rank(&sorted, Percentile(100)), 100.0);
    }

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    #[should_panic]
    fn test_mean_of_empty_sample_panics() {
        mean(&[]);
    }
}
