//! Drawing domain values from a grid.
//!
//! Sampling is inverse-CDF on one uniform draw per sample, proportional to
//! mass, so the grid does not need to be normalised first. Pass a seeded
//! `StdRng` for reproducible draws.

use rand::Rng;

use crate::{Grid, GridError};

impl Grid {
    /// Draw one domain value with probability proportional to its mass.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<f64, GridError> {
        let total = self.positive_total()?;
        Ok(self.draw(rng, total))
    }

    /// Draw `n` domain values.
    pub fn sample_n<R: Rng>(&self, rng: &mut R, n: usize) -> Result<Vec<f64>, GridError> {
        let total = self.positive_total()?;
        Ok((0..n).map(|_| self.draw(rng, total)).collect())
    }

    fn draw<R: Rng>(&self, rng: &mut R, total: f64) -> f64 {
        let r: f64 = rng.random::<f64>() * total;
        let mut cdf = 0.0;
        let mut last = self.min();
        for (d, p) in self.bins() {
            if p <= 0.0 {
                continue;
            }
            cdf += p;
            last = d;
            if r < cdf {
                return d;
            }
        }
        // Numerical fallback.
        last
    }
}
