//! The probability grid: an ordered domain with one non-negative mass per bin.
//!
//! Storage is two aligned vectors (domain values and masses) indexed
//! positionally. Binary search over the domain is the only way a value is
//! mapped to a bin; masses are never keyed by float equality.

use tracing::debug;

use crate::GridError;

/// A discrete probability distribution over a sorted, finite domain.
///
/// Invariants:
/// - `domain` is non-empty, finite, and strictly increasing; it never changes
///   after construction.
/// - `masses.len() == domain.len()`, every mass finite and `>= 0`.
///
/// Masses are not kept normalised automatically: writes through
/// [`Grid::set_value_at`] leave the total wherever they put it until
/// [`Grid::normalise`] is called.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridParts"))]
pub struct Grid {
    domain: Vec<f64>,
    masses: Vec<f64>,
}

/// Unvalidated wire form; deserialisation goes through [`Grid::from_masses`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct GridParts {
    domain: Vec<f64>,
    masses: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<GridParts> for Grid {
    type Error = GridError;

    fn try_from(parts: GridParts) -> Result<Self, Self::Error> {
        Grid::from_masses(parts.domain, parts.masses)
    }
}

fn validate_domain(domain: &[f64]) -> Result<(), GridError> {
    if domain.is_empty() {
        return Err(GridError::invalid("domain must contain at least one value"));
    }
    if let Some(v) = domain.iter().find(|v| !v.is_finite()) {
        return Err(GridError::invalid(format!(
            "domain values must be finite, got {v}"
        )));
    }
    if let Some(w) = domain.windows(2).find(|w| w[0] >= w[1]) {
        return Err(GridError::invalid(format!(
            "domain must be strictly increasing, found {} then {}",
            w[0], w[1]
        )));
    }
    Ok(())
}

fn validate_mass(p: f64) -> Result<(), GridError> {
    if p.is_finite() && p >= 0.0 {
        Ok(())
    } else {
        Err(GridError::invalid(format!(
            "mass must be finite and non-negative, got {p}"
        )))
    }
}

impl Grid {
    /// Uniform mass `1/N` over an arbitrary domain.
    pub fn new(domain: Vec<f64>) -> Result<Self, GridError> {
        validate_domain(&domain)?;
        let n = domain.len();
        Ok(Self {
            domain,
            masses: vec![1.0 / n as f64; n],
        })
    }

    /// `n` evenly spaced bins from `start` to `stop` inclusive, each with mass `1/n`.
    ///
    /// `n == 1` yields the single bin `[start]`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use probgrid::Grid;
    ///
    /// let g = Grid::uniform(0.0, 1.0, 10).unwrap();
    /// assert_eq!(g.n_bins(), 10);
    /// assert!((g.integrate(None, None).unwrap() - 1.0).abs() < 1e-9);
    /// ```
    pub fn uniform(start: f64, stop: f64, n: usize) -> Result<Self, GridError> {
        if n < 1 {
            return Err(GridError::invalid("bin count must be >= 1"));
        }
        if !start.is_finite() || !stop.is_finite() {
            return Err(GridError::invalid(format!(
                "bounds must be finite, got [{start}, {stop}]"
            )));
        }
        if n > 1 && start == stop {
            return Err(GridError::invalid(format!(
                "{n} bins cannot be spaced over the single point {start}"
            )));
        }
        if start > stop {
            return Err(GridError::invalid(format!(
                "start {start} must not exceed stop {stop}"
            )));
        }

        let domain: Vec<f64> = if n == 1 {
            vec![start]
        } else {
            // Blend the endpoints so a span wider than f64::MAX stays finite.
            let last = (n - 1) as f64;
            (0..n)
                .map(|i| match i {
                    0 => start,
                    i if i == n - 1 => stop,
                    i => {
                        let t = i as f64 / last;
                        start * (1.0 - t) + stop * t
                    }
                })
                .collect()
        };
        // Very fine spacing can collapse adjacent values.
        validate_domain(&domain)?;

        debug!(bins = n, start, stop, "uniform grid");
        Ok(Self {
            domain,
            masses: vec![1.0 / n as f64; n],
        })
    }

    /// All mass on the bin selected by [`Grid::index_of`]`(at)`.
    pub fn point_mass(domain: Vec<f64>, at: f64) -> Result<Self, GridError> {
        validate_domain(&domain)?;
        let mut g = Self {
            masses: vec![0.0; domain.len()],
            domain,
        };
        let idx = g.index_of(at)?;
        g.masses[idx] = 1.0;
        debug!(bins = g.n_bins(), at, idx, "point-mass grid");
        Ok(g)
    }

    /// Each bin weighted by the Normal(`mean`, `std`) density at its value,
    /// then normalised.
    ///
    /// Only the kernel `exp(-z²/2)` is evaluated; the `1/(std·√2π)` factor
    /// cancels on normalisation and would overflow for tiny `std`.
    ///
    /// Fails with [`GridError::DegenerateDistribution`] when the density
    /// underflows to zero on every bin (mean far outside the domain).
    pub fn gaussian(domain: Vec<f64>, mean: f64, std: f64) -> Result<Self, GridError> {
        validate_domain(&domain)?;
        if !(std.is_finite() && std > 0.0) {
            return Err(GridError::invalid(format!(
                "standard deviation must be finite and > 0, got {std}"
            )));
        }
        if !mean.is_finite() {
            return Err(GridError::invalid(format!("mean must be finite, got {mean}")));
        }

        let masses = domain
            .iter()
            .map(|&d| {
                let z = (d - mean) / std;
                (-0.5 * z * z).exp()
            })
            .collect();
        let mut g = Self { domain, masses };
        g.normalise()?;
        debug!(bins = g.n_bins(), mean, std, "gaussian grid");
        Ok(g)
    }

    /// Explicit masses, one per domain value. Not normalised.
    pub fn from_masses(domain: Vec<f64>, masses: Vec<f64>) -> Result<Self, GridError> {
        validate_domain(&domain)?;
        if masses.len() != domain.len() {
            return Err(GridError::invalid(format!(
                "expected {} masses, got {}",
                domain.len(),
                masses.len()
            )));
        }
        for &p in &masses {
            validate_mass(p)?;
        }
        Ok(Self { domain, masses })
    }

    /// Bin locations, strictly increasing.
    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    /// Masses aligned with [`Grid::domain`].
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Number of bins; always at least 1.
    pub fn n_bins(&self) -> usize {
        self.domain.len()
    }

    /// Smallest domain value.
    pub fn min(&self) -> f64 {
        self.domain[0]
    }

    /// Largest domain value.
    pub fn max(&self) -> f64 {
        self.domain[self.domain.len() - 1]
    }

    /// `(value, mass)` pairs in domain order.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.domain.iter().copied().zip(self.masses.iter().copied())
    }

    /// Sum of all masses.
    pub fn total(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// Total mass, or `DegenerateDistribution` if it is zero or non-finite.
    pub(crate) fn positive_total(&self) -> Result<f64, GridError> {
        let total = self.total();
        if total.is_finite() && total > 0.0 {
            Ok(total)
        } else {
            Err(GridError::DegenerateDistribution { total })
        }
    }

    fn check_in_domain(&self, v: f64) -> Result<(), GridError> {
        if v.is_nan() || v < self.min() || v > self.max() {
            return Err(GridError::OutOfDomain {
                value: v,
                min: self.min(),
                max: self.max(),
            });
        }
        Ok(())
    }

    /// Index of the bin nearest `v`.
    ///
    /// An exact domain match resolves to that value's own bin. A value
    /// exactly halfway between two neighbours resolves to the lower one.
    pub fn index_of(&self, v: f64) -> Result<usize, GridError> {
        self.check_in_domain(v)?;
        let hi = self.domain.partition_point(|&d| d < v);
        if hi == 0 {
            return Ok(0);
        }
        // `v <= max`, so `hi` is a valid index here.
        let lo = hi - 1;
        if v - self.domain[lo] <= self.domain[hi] - v {
            Ok(lo)
        } else {
            Ok(hi)
        }
    }

    /// Mass of the bin nearest `v`.
    pub fn value_at(&self, v: f64) -> Result<f64, GridError> {
        let idx = self.index_of(v)?;
        Ok(self.masses[idx])
    }

    /// Overwrite the mass of the bin nearest `v`. Does not renormalise.
    pub fn set_value_at(&mut self, v: f64, p: f64) -> Result<(), GridError> {
        validate_mass(p)?;
        let idx = self.index_of(v)?;
        self.masses[idx] = p;
        Ok(())
    }

    /// Bin index a range bound maps to. The domain maximum maps one past the
    /// last bin so that a range ending at `max` includes it.
    fn cut(&self, bound: Option<f64>, open: usize) -> Result<usize, GridError> {
        match bound {
            None => Ok(open),
            Some(v) => {
                let idx = self.index_of(v)?;
                Ok(if v == self.max() { self.n_bins() } else { idx })
            }
        }
    }

    /// Sum of masses over bins `[cut(start), cut(stop))`.
    ///
    /// `None` bounds are open: `integrate(None, None)` is the total mass. An
    /// explicit `stop` equal to the domain maximum includes the last bin, so
    /// `integrate(Some(min), Some(max))` is also the total whenever the grid
    /// has more than one bin. Reversed bounds give `0.0`.
    ///
    /// The same rule applies to `start`: a bound at the maximum maps past the
    /// last bin. On a single-bin grid `min == max`, so
    /// `integrate(Some(min), Some(max))` is `0.0`; use `integrate(None, None)`
    /// for the total.
    pub fn integrate(&self, start: Option<f64>, stop: Option<f64>) -> Result<f64, GridError> {
        let lo = self.cut(start, 0)?;
        let hi = self.cut(stop, self.n_bins())?;
        if lo >= hi {
            return Ok(0.0);
        }
        Ok(self.masses[lo..hi].iter().sum())
    }

    /// Mass strictly below the bin of `v`.
    pub fn cdf(&self, v: f64) -> Result<f64, GridError> {
        self.integrate(None, Some(v))
    }

    /// Mass from the bin of `v` upward; `cdf(v) + sf(v)` is the total.
    pub fn sf(&self, v: f64) -> Result<f64, GridError> {
        self.integrate(Some(v), None)
    }

    /// Rescale so the masses sum to 1.
    pub fn normalise(&mut self) -> Result<(), GridError> {
        let total = self.positive_total().inspect_err(|e| {
            debug!(error = %e, "refusing to normalise");
        })?;
        for m in &mut self.masses {
            *m /= total;
        }
        Ok(())
    }

    /// Bayes update: multiply each mass by `likelihood(value)` and renormalise.
    ///
    /// Returns the evidence, `Σ mass · likelihood`, measured against the
    /// masses as they stood before the update (the marginal likelihood when
    /// the grid was normalised). On error the grid is unchanged.
    pub fn update<F>(&mut self, mut likelihood: F) -> Result<f64, GridError>
    where
        F: FnMut(f64) -> f64,
    {
        let mut posterior = Vec::with_capacity(self.n_bins());
        for (d, p) in self.bins() {
            let l = likelihood(d);
            if !(l.is_finite() && l >= 0.0) {
                return Err(GridError::invalid(format!(
                    "likelihood at {d} must be finite and non-negative, got {l}"
                )));
            }
            posterior.push(p * l);
        }
        let evidence: f64 = posterior.iter().sum();
        if !(evidence.is_finite() && evidence > 0.0) {
            debug!(evidence, "observation ruled out every bin");
            return Err(GridError::DegenerateDistribution { total: evidence });
        }
        for p in &mut posterior {
            *p /= evidence;
        }
        self.masses = posterior;
        debug!(evidence, bins = self.n_bins(), "applied likelihood");
        Ok(evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn uniform_ten_bins() {
        let g = Grid::uniform(0.0, 1.0, 10).unwrap();
        assert_eq!(g.n_bins(), 10);
        assert!(g.masses().iter().all(|&p| close(p, 0.1)));
        assert!(close(g.integrate(None, None).unwrap(), 1.0));
        assert_eq!(g.min(), 0.0);
        assert_eq!(g.max(), 1.0);
        assert!(close(g.domain()[1], 1.0 / 9.0));
    }

    #[test]
    fn uniform_single_bin() {
        let g = Grid::uniform(3.0, 3.0, 1).unwrap();
        assert_eq!(g.domain(), &[3.0]);
        assert_eq!(g.masses(), &[1.0]);
        assert!(close(g.integrate(None, None).unwrap(), 1.0));
    }

    #[test]
    fn uniform_rejects_bad_arguments() {
        assert!(matches!(
            Grid::uniform(0.0, 1.0, 0),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(matches!(
            Grid::uniform(1.0, 1.0, 5),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(matches!(
            Grid::uniform(2.0, 1.0, 5),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(matches!(
            Grid::uniform(0.0, f64::INFINITY, 5),
            Err(GridError::InvalidArgument(_))
        ));
    }

    #[test]
    fn domain_validation() {
        assert!(Grid::new(vec![]).is_err());
        assert!(Grid::new(vec![0.0, 0.0]).is_err());
        assert!(Grid::new(vec![1.0, 0.0]).is_err());
        assert!(Grid::new(vec![0.0, f64::NAN]).is_err());
        let g = Grid::new(vec![-1.0, 0.5, 2.0]).unwrap();
        assert!(g.masses().iter().all(|&p| close(p, 1.0 / 3.0)));
    }

    #[test]
    fn from_masses_checks_shape_and_sign() {
        assert!(Grid::from_masses(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(Grid::from_masses(vec![0.0, 1.0], vec![1.0, -0.5]).is_err());
        assert!(Grid::from_masses(vec![0.0, 1.0], vec![1.0, f64::NAN]).is_err());
        let g = Grid::from_masses(vec![0.0, 1.0], vec![2.0, 6.0]).unwrap();
        assert!(close(g.total(), 8.0));
    }

    #[test]
    fn index_of_exact_matches_resolve_to_own_bin() {
        let g = Grid::new(vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        for (i, &d) in g.domain().iter().enumerate() {
            assert_eq!(g.index_of(d).unwrap(), i);
        }
    }

    #[test]
    fn index_of_picks_nearest_and_ties_go_low() {
        let g = Grid::new(vec![0.0, 1.0, 2.0, 4.0]).unwrap();
        assert_eq!(g.index_of(0.4).unwrap(), 0);
        assert_eq!(g.index_of(0.6).unwrap(), 1);
        assert_eq!(g.index_of(0.5).unwrap(), 0);
        assert_eq!(g.index_of(3.0).unwrap(), 2);
        assert_eq!(g.index_of(3.1).unwrap(), 3);
    }

    #[test]
    fn index_of_rejects_out_of_domain() {
        let g = Grid::uniform(0.0, 1.0, 5).unwrap();
        assert_eq!(
            g.index_of(1.5),
            Err(GridError::OutOfDomain {
                value: 1.5,
                min: 0.0,
                max: 1.0
            })
        );
        assert!(g.index_of(-1e-12).is_err());
        assert!(g.index_of(f64::NAN).is_err());
    }

    #[test]
    fn point_mass_puts_everything_on_one_bin() {
        let domain = Grid::uniform(0.0, 1.0, 11).unwrap().domain().to_vec();
        let g = Grid::point_mass(domain, 0.5).unwrap();
        assert_eq!(g.masses().iter().filter(|&&p| p == 1.0).count(), 1);
        assert_eq!(g.masses().iter().filter(|&&p| p == 0.0).count(), 10);
        assert_eq!(g.value_at(0.5).unwrap(), 1.0);
        assert!(close(g.integrate(Some(0.0), Some(1.0)).unwrap(), 1.0));
    }

    #[test]
    fn point_mass_at_the_edges() {
        let g = Grid::point_mass(vec![0.0, 1.0, 2.0], 2.0).unwrap();
        assert_eq!(g.masses(), &[0.0, 0.0, 1.0]);
        assert!(close(g.integrate(Some(0.0), Some(2.0)).unwrap(), 1.0));
        assert!(Grid::point_mass(vec![0.0, 1.0], 1.1).is_err());
    }

    #[test]
    fn gaussian_rejects_bad_std() {
        let d = vec![0.0, 1.0];
        assert!(matches!(
            Grid::gaussian(d.clone(), 0.5, 0.0),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(matches!(
            Grid::gaussian(d.clone(), 0.5, -1.0),
            Err(GridError::InvalidArgument(_))
        ));
        assert!(matches!(
            Grid::gaussian(d, f64::NAN, 1.0),
            Err(GridError::InvalidArgument(_))
        ));
    }

    #[test]
    fn gaussian_far_from_domain_is_degenerate() {
        let d = vec![0.0, 1.0];
        assert!(matches!(
            Grid::gaussian(d, 1e6, 0.01),
            Err(GridError::DegenerateDistribution { .. })
        ));
    }

    #[test]
    fn uniform_span_wider_than_f64_max() {
        let g = Grid::uniform(-f64::MAX, f64::MAX, 3).unwrap();
        assert_eq!(g.domain(), &[-f64::MAX, 0.0, f64::MAX]);
        assert!(g.masses().iter().all(|&p| close(p, 1.0 / 3.0)));
        assert_eq!(g.index_of(1.0).unwrap(), 1);
    }

    #[test]
    fn gaussian_with_tiny_std_is_a_point_mass() {
        let g = Grid::gaussian(vec![0.0, 0.5, 1.0], 0.5, 1e-310).unwrap();
        assert_eq!(g.masses(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn gaussian_is_symmetric_and_peaked() {
        let g = Grid::gaussian(vec![-2.0, -1.0, 0.0, 1.0, 2.0], 0.0, 1.0).unwrap();
        let m = g.masses();
        assert!(close(g.total(), 1.0));
        assert!(close(m[0], m[4]));
        assert!(close(m[1], m[3]));
        assert!(m[2] > m[1] && m[1] > m[0]);
    }

    #[test]
    fn set_value_at_validates_before_writing() {
        let mut g = Grid::uniform(0.0, 1.0, 4).unwrap();
        let before = g.clone();
        assert!(g.set_value_at(0.5, -0.1).is_err());
        assert!(g.set_value_at(2.0, 0.1).is_err());
        assert_eq!(g, before);

        g.set_value_at(1.0, 3.0).unwrap();
        assert_eq!(g.value_at(1.0).unwrap(), 3.0);
        // No auto-normalise.
        assert!(close(g.total(), 0.75 + 3.0));
    }

    #[test]
    fn integrate_is_half_open_in_bin_space() {
        let g = Grid::from_masses(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(close(g.integrate(Some(0.0), Some(2.0)).unwrap(), 3.0));
        assert!(close(g.integrate(Some(1.0), Some(3.0)).unwrap(), 9.0));
        assert!(close(g.integrate(Some(1.0), Some(1.0)).unwrap(), 0.0));
        assert!(close(g.integrate(Some(3.0), Some(0.0)).unwrap(), 0.0));
        assert!(close(g.integrate(None, None).unwrap(), 10.0));
        assert!(close(g.cdf(2.0).unwrap() + g.sf(2.0).unwrap(), 10.0));
        assert!(g.integrate(Some(-1.0), None).is_err());
        assert!(g.integrate(None, Some(3.5)).is_err());
    }

    #[test]
    fn integrate_single_bin_grid() {
        let g = Grid::new(vec![5.0]).unwrap();
        assert!(close(g.integrate(None, None).unwrap(), 1.0));
        // Zero-width range.
        assert_eq!(g.integrate(Some(5.0), Some(5.0)).unwrap(), 0.0);
        assert_eq!(g.integrate(Some(g.min()), Some(g.max())).unwrap(), 0.0);
    }

    #[test]
    fn normalise_rescales() {
        let mut g = Grid::from_masses(vec![0.0, 1.0, 2.0], vec![1.0, 1.0, 2.0]).unwrap();
        g.normalise().unwrap();
        assert_eq!(g.masses(), &[0.25, 0.25, 0.5]);
    }

    #[test]
    fn normalise_all_zero_is_degenerate() {
        let mut g = Grid::uniform(0.0, 1.0, 3).unwrap();
        for v in [0.0, 0.5, 1.0] {
            g.set_value_at(v, 0.0).unwrap();
        }
        let before = g.clone();
        assert_eq!(
            g.normalise(),
            Err(GridError::DegenerateDistribution { total: 0.0 })
        );
        assert_eq!(g, before);
    }

    #[test]
    fn normalise_overflowing_total_is_degenerate() {
        let mut g = Grid::from_masses(vec![0.0, 1.0], vec![f64::MAX, f64::MAX]).unwrap();
        assert!(matches!(
            g.normalise(),
            Err(GridError::DegenerateDistribution { .. })
        ));
    }

    #[test]
    fn update_multiplies_and_renormalises() {
        let mut g = Grid::new(vec![0.0, 1.0]).unwrap();
        let evidence = g.update(|x| if x == 0.0 { 1.0 } else { 3.0 }).unwrap();
        assert!(close(evidence, 2.0));
        assert!(close(g.masses()[0], 0.25));
        assert!(close(g.masses()[1], 0.75));
    }

    #[test]
    fn update_is_atomic_on_failure() {
        let mut g = Grid::new(vec![0.0, 1.0, 2.0]).unwrap();
        let before = g.clone();
        assert!(matches!(
            g.update(|x| if x > 1.5 { -1.0 } else { 1.0 }),
            Err(GridError::InvalidArgument(_))
        ));
        assert_eq!(g, before);
        assert!(matches!(
            g.update(|_| 0.0),
            Err(GridError::DegenerateDistribution { .. })
        ));
        assert_eq!(g, before);
    }
}
