//! Histogram filter: estimate a core temperature from a noisy thermometer.
//!
//! A grid over 0..100 °C starts as a broad Gaussian guess. Each reading
//! multiplies in a Gaussian likelihood; the belief narrows, and we print the
//! one-line render after every step plus a summary at the end.
//!
//! Run with:
//!   cargo run --example histogram_filter
//!
//! Set `RUST_LOG=probgrid=debug` to see the grid's own debug events.

use probgrid::{Grid, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // -----------------------------------------------------------------
    // 1. Prior: "probably around 40 °C, but who knows".
    // -----------------------------------------------------------------
    let domain = Grid::uniform(0.0, 100.0, 41).unwrap().domain().to_vec();
    let mut belief = Grid::gaussian(domain, 40.0, 20.0).unwrap();
    let render = RenderConfig::default().precision(0);
    println!("prior      {}", belief.render_with(&render));

    // -----------------------------------------------------------------
    // 2. Readings from a thermometer with 6 °C of noise.
    // -----------------------------------------------------------------
    let truth = 63.0;
    let sigma = 6.0;
    let noise = Normal::new(0.0, sigma).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    for step in 1..=8 {
        let z: f64 = truth + noise.sample(&mut rng);
        let evidence = belief
            .update(|x| (-0.5 * ((x - z) / sigma).powi(2)).exp())
            .unwrap();
        println!(
            "reading {step} {} (z={z:.1}, evidence={evidence:.3})",
            belief.render_with(&render)
        );
    }

    // -----------------------------------------------------------------
    // 3. Summaries a caller would act on.
    // -----------------------------------------------------------------
    let qs = belief.quartiles().unwrap();
    println!();
    println!("mean      = {:.1} °C", belief.mean().unwrap());
    println!("mode      = {:.1} °C", belief.mode().unwrap());
    println!(
        "quartiles = {:.1} / {:.1} / {:.1} °C",
        qs.q1, qs.median, qs.q3
    );
    // "Unsafe if any part is below 60 °C."
    println!("P(< 60)   = {:.3}", belief.cdf(60.0).unwrap());
    println!("P(>= 70)  = {:.3}", belief.sf(70.0).unwrap());

    let draws = belief.sample_n(&mut rng, 5).unwrap();
    println!("samples   = {draws:?}");
}
