//! Terminal output helpers.

pub mod display;
pub mod progress;

pub use progress::{ProgressReporter, BAR_WIDTH};
