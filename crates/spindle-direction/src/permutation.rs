//! Binomial permutation null of asymmetry scores
//!
//! Each iteration keeps the number of pairs between two regions and
//! redistributes them between the two directions with a binomial draw. The
//! asymmetry scores of the shuffled matrix form one sample of the null.
//!
//! Iteration `i` seeds its own [`ChaCha8Rng`] from `seed + i`, so the null
//! distribution is identical whichever engine runs it and in whatever order
//! the iterations complete.

use nalgebra::DMatrix;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Binomial;
use tracing::{debug, instrument};

use spindle_core::{Error, ExecutionEngine, Result};

use crate::asymmetry::scores_quiet;
use crate::counts::DirectionCounts;

/// Null distribution of asymmetry scores, one row per iteration
#[derive(Debug, Clone, PartialEq)]
pub struct NullDistribution {
    scores: Vec<Vec<f64>>,
}

impl NullDistribution {
    pub fn n_iterations(&self) -> usize {
        self.scores.len()
    }

    /// Scores of one iteration
    pub fn iteration(&self, i: usize) -> &[f64] {
        &self.scores[i]
    }

    /// Null samples of one region across iterations
    pub fn region(&self, r: usize) -> impl Iterator<Item = f64> + '_ {
        self.scores.iter().map(move |row| row[r])
    }
}

/// Permutation test settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PermutationTest {
    n_rnd: usize,
    null_probability: f64,
    seed: u64,
}

impl PermutationTest {
    pub fn new(n_rnd: usize, null_probability: f64, seed: u64) -> Result<Self> {
        if n_rnd == 0 {
            return Err(Error::InvalidParameter(
                "number of permutations must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&null_probability) {
            return Err(Error::invalid_probability("null probability", null_probability));
        }
        Ok(Self {
            n_rnd,
            null_probability,
            seed,
        })
    }

    pub fn n_rnd(&self) -> usize {
        self.n_rnd
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// One shuffled count matrix
    ///
    /// For `a < b`, `s = x[a, b] + x[b, a]` pairs are split as
    /// `x2[a, b] ~ Binomial(s, p)` and `x2[b, a] = s - x2[a, b]`. The
    /// diagonal carries no direction and stays zero.
    pub fn shuffle(&self, x: &DirectionCounts, iteration: usize) -> Result<DMatrix<f64>> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(iteration as u64));
        let counts = x.counts();
        let r = x.n_regions();
        let mut x2 = DMatrix::<f64>::zeros(r, r);
        for a in 0..r {
            for b in (a + 1)..r {
                let s = counts[(a, b)] + counts[(b, a)];
                let binomial = Binomial::new(s, self.null_probability).map_err(|e| {
                    Error::Computation(format!(
                        "Failed to create binomial distribution (n = {s}, p = {}): {e}",
                        self.null_probability
                    ))
                })?;
                let forward = binomial.sample(&mut rng);
                x2[(a, b)] = forward as f64;
                x2[(b, a)] = (s - forward) as f64;
            }
        }
        Ok(x2)
    }

    /// Run every iteration on `engine`
    ///
    /// The first failing iteration aborts the batch.
    #[instrument(skip(self, x, engine), fields(n_rnd = self.n_rnd, n_regions = x.n_regions(), parallel = engine.is_parallel()))]
    pub fn null_distribution<E: ExecutionEngine>(
        &self,
        x: &DirectionCounts,
        engine: &E,
    ) -> Result<NullDistribution> {
        let scores = engine.try_execute_batch(self.n_rnd, |i| {
            let x2 = self.shuffle(x, i)?;
            Ok::<_, Error>(scores_quiet(&x2))
        })?;
        debug!(n_iterations = scores.len(), "permutation null complete");
        Ok(NullDistribution { scores })
    }
}
