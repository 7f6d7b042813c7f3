//! `probgrid`: discrete probability distributions over a sorted 1-D domain.
//!
//! A [`Grid`] is the belief a histogram (Bayes) filter carries around: a
//! continuous quantity discretised into bins, one non-negative mass per bin.
//! The crate is pure computation: no I/O, no threads, no global state.
//!
//! **Construction** (every constructor returns a fully initialised grid or an
//! error, never a half-built one):
//! - [`Grid::uniform`]: evenly spaced bins, equal mass.
//! - [`Grid::point_mass`]: all mass on the bin nearest a value.
//! - [`Grid::gaussian`]: Normal-density weights, normalised.
//! - [`Grid::new`] / [`Grid::from_masses`]: caller-supplied domain (and masses).
//!
//! **Lookup and mutation:**
//! - [`Grid::index_of`]: nearest bin; exact matches resolve to their own bin,
//!   halfway ties resolve to the lower bin.
//! - [`Grid::value_at`] / [`Grid::set_value_at`]: read/write a bin's mass.
//!   Writes never renormalise; call [`Grid::normalise`] after a batch.
//! - [`Grid::update`]: multiply by a likelihood and renormalise (one Bayes step).
//!
//! **Queries:**
//! - [`Grid::integrate`]: mass over a half-open range of bins. A range that
//!   ends at the domain maximum includes the last bin, so the full domain
//!   always integrates to the total.
//! - [`Grid::cdf`] / [`Grid::sf`]: mass below / from a value's bin.
//! - [`Grid::expectation`], [`Grid::mean`], [`Grid::variance`],
//!   [`Grid::quantile`], [`Grid::quartiles`], [`Grid::mode`].
//! - (feature `stochastic`) [`Grid::sample`] / [`Grid::sample_n`].
//! - [`Grid::render`]: one-line glyph summary for logs (also `Display`).
//!
//! **Errors** are reported through [`GridError`]: `InvalidArgument`,
//! `OutOfDomain`, `DegenerateDistribution`. Failed operations leave the grid
//! untouched.
//!
//! **Concurrency:** a `Grid` is a plain owned value (`Send + Sync`). It does
//! no locking; share one across threads behind your own `Mutex`.
//!
//! # Example
//!
//! ```rust
//! use probgrid::Grid;
//!
//! // Prior: position somewhere in [0, 10].
//! let mut belief = Grid::uniform(0.0, 10.0, 101).unwrap();
//!
//! // Two noisy readings near 4.
//! for z in [4.2, 3.9] {
//!     belief
//!         .update(|x| (-0.5 * ((x - z) / 0.5_f64).powi(2)).exp())
//!         .unwrap();
//! }
//!
//! let m = belief.mean().unwrap();
//! assert!((m - 4.05).abs() < 0.05);
//! assert!(belief.cdf(3.0).unwrap() < 0.05);
//! println!("{belief}");
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod grid;
pub use grid::*;

mod render;
pub use render::*;

mod stats;
pub use stats::*;

#[cfg(feature = "stochastic")]
mod sample;
