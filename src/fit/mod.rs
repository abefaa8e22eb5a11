use num_traits::Float;
use serde::{Serialize, Deserialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use crate::model::Counts;

/// Fixed-point expectation maximization for the linkage parameter.
pub mod em;

/// Trait shared by the inference algorithms of this crate, parametrized by the numeric
/// representation of the observed counts. Estimator does not care how you instantiate your
/// object: it only requires that, once configured, the algorithm can be run against a set of
/// counts, and that the result of the last successful run can be inspected afterwards without
/// running the algorithm again.
pub trait Estimator<F>
    where
        F : Float
{

    /// Whatever the algorithm produces (e.g. a trace of parameter estimates).
    type Output;

    /// Runs the inference algorithm for the informed counts,
    /// returning a reference to the stored result.
    fn fit<'a>(&'a mut self, counts : &Counts<F>) -> Result<&'a Self::Output, EmError>;

    /// If fit(.) has been called successfully at least once, returns the
    /// result of the last call, whithout changing the algorithm state.
    fn result<'a>(&'a self) -> Option<&'a Self::Output>;

}

#[derive(Debug, Error)]
pub enum EmError {

    #[error("E-step denominator vanished for psi = {psi}")]
    DegenerateSplit { psi : f64 },

    #[error("M-step denominator vanished (n = {total}, y11 = {y11})")]
    DegenerateData { total : f64, y11 : f64 },

    #[error("No convergence after {iterations} iterations (last estimate: {last})")]
    NotConverged { iterations : usize, last : f64 },

    #[error("Invalid counts: {0}")]
    InvalidCounts(String),

    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Plot error: {0}")]
    Plot(String)

}

/// Stopping threshold and starting point of the fixed-point iteration. The defaults
/// (tolerance 1e-6, initial guess 0.5) only apply when nothing else is informed by the
/// caller; the algorithm itself never falls back to them.
///
/// Configurations can be read from JSON files, where missing fields take the default value:
///
/// ```json
/// { "tolerance" : 1e-9, "initial_guess" : 0.1 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "F : Float + Deserialize<'de>"))]
pub struct EmConfig<F = f64> {

    pub tolerance : F,

    pub initial_guess : F,

    /// Optional cap on the number of completed iterations. Unbounded (None) unless
    /// set explicitly, in which case reaching the cap without meeting the stopping
    /// criterion yields EmError::NotConverged.
    pub max_iter : Option<usize>

}

impl<F> Default for EmConfig<F>
    where F : Float
{

    fn default() -> Self {
        Self {
            tolerance : F::from(1e-6).unwrap_or_else(F::epsilon),
            initial_guess : F::from(0.5).unwrap_or_else(F::one),
            max_iter : None
        }
    }

}

impl<F> EmConfig<F>
    where F : Float
{

    pub fn new(tolerance : F, initial_guess : F) -> Self {
        Self { tolerance, initial_guess, max_iter : None }
    }

    pub fn max_iter(mut self, max_iter : usize) -> Self {
        self.max_iter = Some(max_iter);
        self
    }

}

impl<F> EmConfig<F>
    where F : Float + for<'de> Deserialize<'de>
{

    pub fn load_from_path<P>(path : P) -> Result<Self, EmError>
    where
        P : AsRef<Path>
    {
        let f = File::open(path)?;
        Self::load(f)
    }

    pub fn load<R>(mut reader : R) -> Result<Self, EmError>
    where
        R : Read
    {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let cfg = serde_json::from_str(&content[..])?;
        Ok(cfg)
    }

}
