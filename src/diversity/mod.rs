//! Provider diversity analysis for Bitcoin Core peer sets.
//!
//! This module turns a flat peer-record collection into a per-operator
//! aggregation, a folded display list and a concentration score.

pub mod types;
pub mod classifier;
pub mod aggregator;
pub mod scorer;
pub mod report;

pub use types::*;
pub use classifier::classify;
pub use aggregator::{aggregate, ColorMap, DEFAULT_DISPLAYED_PROVIDERS};
pub use scorer::{herfindahl_index, score};
pub use report::{generate_json_report, generate_text_report, print_summary};
