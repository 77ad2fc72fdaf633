//! Chart rendering.
//!
//! - `ascii`: fixed-grid text charts for the report (deterministic, golden-tested)
//! - `svg`: Plotters SVG files for `bikes report --charts DIR`

pub mod ascii;
pub mod svg;
