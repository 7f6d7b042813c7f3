//! Summary statistics over a grid: expectations, quantiles, mode.
//!
//! None of these require the grid to be normalised; every statistic is taken
//! relative to the current total mass.

use crate::{Grid, GridError};

/// First, second, and third quartile of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Grid {
    /// `Σ f(d) · p(d) / Σ p(d)`.
    pub fn expectation<F>(&self, mut f: F) -> Result<f64, GridError>
    where
        F: FnMut(f64) -> f64,
    {
        let total = self.positive_total()?;
        let acc: f64 = self.bins().map(|(d, p)| f(d) * p).sum();
        Ok(acc / total)
    }

    pub fn mean(&self) -> Result<f64, GridError> {
        self.expectation(|d| d)
    }

    pub fn variance(&self) -> Result<f64, GridError> {
        let mu = self.mean()?;
        self.expectation(|d| (d - mu) * (d - mu))
    }

    /// Smallest domain value carrying mass whose cumulative mass reaches
    /// `q · total`.
    ///
    /// `quantile(0.0)` is the lowest bin with positive mass and
    /// `quantile(1.0)` the highest.
    pub fn quantile(&self, q: f64) -> Result<f64, GridError> {
        if !(0.0..=1.0).contains(&q) {
            return Err(GridError::invalid(format!(
                "quantile level must be in [0, 1], got {q}"
            )));
        }
        let total = self.positive_total()?;
        let target = q * total;
        let mut cum = 0.0;
        let mut last = self.min();
        for (d, p) in self.bins() {
            if p <= 0.0 {
                continue;
            }
            cum += p;
            last = d;
            if cum >= target {
                return Ok(d);
            }
        }
        // Rounding in `q * total`; the last populated bin is the answer.
        Ok(last)
    }

    pub fn quartiles(&self) -> Result<Quartiles, GridError> {
        Ok(Quartiles {
            q1: self.quantile(0.25)?,
            median: self.quantile(0.5)?,
            q3: self.quantile(0.75)?,
        })
    }

    /// Domain value of the heaviest bin; ties go to the lowest value.
    pub fn mode(&self) -> Result<f64, GridError> {
        self.positive_total()?;
        let mut best = (self.min(), f64::NEG_INFINITY);
        for (d, p) in self.bins() {
            if p > best.1 {
                best = (d, p);
            }
        }
        Ok(best.0)
    }
}
