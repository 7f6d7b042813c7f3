//! One-line diagnostic rendering of a grid.
//!
//! The output is meant for logs and terminals, not for parsing back:
//!
//! ```text
//! 0.0 ▂ ▃ ▄ ▅ ▅ ▄ ▃ ▂ 1.0
//! ```

use std::fmt;

use crate::Grid;

/// Eight-level glyph ramp, lowest to highest.
const RAMP: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Rendering knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderConfig {
    /// Decimal places for the domain endpoints.
    pub precision: usize,
    /// Masses below `floor` render blank; masses above `1 - floor` render as
    /// the top glyph.
    pub floor: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            precision: 1,
            floor: 1e-9,
        }
    }
}

impl RenderConfig {
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }
}

/// Glyph for a single mass, chosen by a log-odds transform.
///
/// `0.25 * log10(p / (1 - p))` is shifted to the middle of the ramp, so
/// even odds land on the fifth glyph and each factor of 10^4 in the odds
/// moves one step.
pub fn glyph(p: f64, floor: f64) -> char {
    if p.is_nan() || p < floor {
        return ' ';
    }
    if p > 1.0 - floor {
        return RAMP[RAMP.len() - 1];
    }
    let q = 0.25 * (p / (1.0 - p)).log10() + (RAMP.len() / 2) as f64;
    let idx = q.clamp(0.0, (RAMP.len() - 1) as f64) as usize;
    RAMP[idx]
}

impl Grid {
    /// Render with [`RenderConfig::default`].
    pub fn render(&self) -> String {
        self.render_with(&RenderConfig::default())
    }

    pub fn render_with(&self, cfg: &RenderConfig) -> String {
        let bars: Vec<String> = self
            .masses()
            .iter()
            .map(|&p| glyph(p, cfg.floor).to_string())
            .collect();
        format!(
            "{:.prec$} {} {:.prec$}",
            self.min(),
            bars.join(" "),
            self.max(),
            prec = cfg.precision
        )
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
