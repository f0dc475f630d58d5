/// One simulated price trajectory. Index 0 is the initial price.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    prices: Vec<f64>,
}

impl Path {
    pub fn new(prices: Vec<f64>) -> Path {
        Path { prices }
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn initial(&self) -> Option<f64> {
        self.prices.first().copied()
    }

    pub fn into_prices(self) -> Vec<f64> {
        self.prices
    }
}

/// All paths produced by one run, every one of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEnsemble {
    paths: Vec<Path>,
    path_len: usize,
}

impl PathEnsemble {
    /// Panics on an empty or ragged set of paths: the simulator never
    /// produces one, so reaching this is a bug.
    pub fn new(paths: Vec<Path>) -> PathEnsemble {
        let path_len = paths.first().map(Path::len).unwrap_or(0);
        assert!(path_len > 0, "ensemble needs at least one non-empty path");
        assert!(
            paths.iter().all(|p| p.len() == path_len),
            "ensemble paths must all have {} prices",
            path_len
        );
        PathEnsemble { paths, path_len }
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Prices per path, `num_days + 1`.
    pub fn path_len(&self) -> usize {
        self.path_len
    }

    pub fn num_days(&self) -> usize {
        self.path_len - 1
    }

    /// Cross-section of every path at day `t`, in simulation order.
    pub fn prices_at(&self, t: usize) -> impl Iterator<Item = f64> + '_ {
        self.paths.iter().map(move |p| p.prices[t])
    }

    /// Evenly strided subset of at most `cap` paths, starting at the first
    /// path, for transmission. Statistics are never computed from it.
    pub fn sample(&self, cap: usize) -> Vec<Path> {
        if cap == 0 {
            return Vec::new();
        }
        let stride = (self.paths.len() / cap).max(1);
        self.paths
            .iter()
            .step_by(stride)
            .take(cap)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensemble(n: usize, len: usize) -> PathEnsemble {
        PathEnsemble::new(
            (0..n)
                .map(|i| Path::new((0..len).map(|t| (i * 1000 + t) as f64).collect()))
                .collect(),
        )
    }

    #[test]
    fn test_shape() {
        let e = ensemble(4, 6);
        assert_eq!(e.len(), 4);
        assert_eq!(e.path_len(), 6);
        assert_eq!(e.num_days(), 5);
        assert_eq!(e.prices_at(e.num_days()).collect::<Vec<_>>(), vec![5.0, 1005.0, 2005.0, 3005.0]);
        assert_eq!(e.prices_at(0).collect::<Vec<_>>(), vec![0.0, 1000.0, 2000.0, 3000.0]);
    }

    #[test]
    fn test_sample_stride() {
        let e = ensemble(1000, 2);
        let sample = e.sample(100);
        assert_eq!(sample.len(), 100);
        assert_eq!(sample[0].initial(), Some(0.0));
        assert_eq!(sample[1].initial(), Some(10_000.0));

        let e = ensemble(250, 2);
        let sample = e.sample(100);
        assert_eq!(sample.len(), 100);
        assert_eq!(sample[1].initial(), Some(2000.0));
    }

    #[test]
    fn test_sample_smaller_than_cap() {
        let e = ensemble(7, 3);
        assert_eq!(e.sample(100).len(), 7);
        assert!(e.sample(0).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_ragged_ensemble_panics() {
        PathEnsemble::new(vec![Path::new(vec![1.0, 2.0]), Path::new(vec![1.0])]);
    }

    #[test]
    #[should_panic]
    fn test_empty_ensemble_panics() {
        PathEnsemble::new(Vec::new());
    }
}
