//! Implementations of the initial placement strategies.

pub mod best_fit_decreasing;
pub mod common;
pub mod min_utilization;
pub mod random;
