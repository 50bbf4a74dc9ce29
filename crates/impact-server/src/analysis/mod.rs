//! Request flows combining the estimation core with the store.

pub mod compare;
pub mod heatmap;
pub mod stats;

pub use compare::compare_route;
pub use heatmap::period_heatmap;
pub use stats::period_summary;
