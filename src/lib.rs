/// Observed counts of Fisher's four-category genetic linkage problem.
pub mod model;

/// Expectation maximization for the linkage parameter, the configuration of the
/// fixed-point iteration, and the Estimator trait shared by inference algorithms.
pub mod fit;

/// Persistence of solve results (trace as CSV; summary report as JSON).
pub mod io;

/// Diagnostic scatter plot of the estimate trace.
pub mod plot;

pub use fit::{Estimator, EmConfig, EmError};
pub use fit::em::{ExpectMax, Trace, LatentSplit, solve};
pub use model::Counts;
