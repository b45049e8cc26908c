//! Analysis modules.
//!
//! Every figure shown in a report is computed here; the renderers only
//! format the results.

pub mod aggregator;
pub mod anomaly;
pub mod divisions;
pub mod predict;
pub mod stats;

pub use aggregator::*;
