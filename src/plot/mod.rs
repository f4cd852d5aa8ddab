//! Chart rendering.
//!
//! - SVG charts drawn with Plotters (`charts`)
//! - a fixed-grid ASCII trend plot for terminal output (`ascii`)

pub mod ascii;
pub mod charts;

pub use ascii::*;
pub use charts::*;

/// Widen `[min, max]` by `frac` of its span on each side.
pub(crate) fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}
