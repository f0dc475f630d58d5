use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Source of independent standard normal draws.
///
/// Implementations are seeded explicitly and hold all of their state, so two
/// sources built from the same seed produce the same sequence.
pub trait RandomNormalSource {
    fn next(&mut self) -> f64;

    fn fill(&mut self, out: &mut [f64]) {
        for z in out.iter_mut() {
            *z = self.next();
        }
    }
}

/// Variate transform used on top of the seeded uniform generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalMethod {
    /// `rand_distr::StandardNormal` (ziggurat).
    #[default]
    Ziggurat,
    /// Box-Muller, caching the second variate of each pair.
    BoxMuller,
}

/// Standard normal stream backed by `rand_distr::StandardNormal`.
#[derive(Clone)]
pub struct ZigguratStream {
    rng: StdRng,
}

impl ZigguratStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomNormalSource for ZigguratStream {
    fn next(&mut self) -> f64 {
        self.rng.sample::<f64, _>(StandardNormal)
    }
}

/// Box-Muller transform over a seeded `StdRng`.
#[derive(Clone)]
pub struct BoxMullerStream {
    rng: StdRng,
    spare: Option<f64>,
}

impl BoxMullerStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            spare: None,
        }
    }
}

impl RandomNormalSource for BoxMullerStream {
    fn next(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        // u1 in (0, 1] keeps ln finite
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;
        self.spare = Some(r * theta.sin());
        r * theta.cos()
    }
}

/// Per-simulation normal stream, dispatching on the configured method.
#[derive(Clone)]
pub enum NormalStream {
    Ziggurat(ZigguratStream),
    BoxMuller(BoxMullerStream),
}

impl NormalStream {
    pub fn new(method: NormalMethod, seed: u64) -> Self {
        match method {
            NormalMethod::Ziggurat => NormalStream::Ziggurat(ZigguratStream::new(seed)),
            NormalMethod::BoxMuller => NormalStream::BoxMuller(BoxMullerStream::new(seed)),
        }
    }

    /// Stream dedicated to simulation `index` of a run seeded with `run_seed`.
    pub fn for_simulation(method: NormalMethod, run_seed: u64, index: usize) -> Self {
        Self::new(method, stream_seed(run_seed, index))
    }
}

impl RandomNormalSource for NormalStream {
    #[inline]
    fn next(&mut self) -> f64 {
        match self {
            NormalStream::Ziggurat(s) => s.next(),
            NormalStream::BoxMuller(s) => s.next(),
        }
    }
}

/// Derives the seed of one simulation stream from the run seed and the
/// simulation index (SplitMix64 finalizer over both words).
pub fn stream_seed(run_seed: u64, index: usize) -> u64 {
    let mut z = run_seed
        .wrapping_add((index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
