use num_traits::Float;
use tracing::{debug, info};
use crate::model::Counts;
use super::{Estimator, EmConfig, EmError};

/// The expectation maximization algorithm (Dempster, Laird & Rubin, 1977) applied to
/// Fisher's genetic linkage data. The first observed category (with probability 1/2 + psi/4)
/// is treated as the sum of two latent categories with probabilities 1/2 and psi/4. At each
/// iteration, the expectation step splits y1 into its expected latent parts under the current
/// psi, and the maximization step solves for psi in closed form as if the split were observed:
///
/// psi_{t+1} = (y12 + y4) / (n - y11)
///
/// The iteration stops once the value used to compute the latest update and the update itself
/// differ by no more than the tolerance. Note the reference value is the pre-update estimate
/// (not the second-to-last trace entry): the very first test is made against zero, so an initial
/// guess smaller in magnitude than the tolerance yields an empty trace.
///
/// # References
/// Dempster, A. P., Laird, N. M., & Rubin, D. B.
/// ([1977](https://rss.onlinelibrary.wiley.com/doi/abs/10.1111/j.2517-6161.1977.tb01600.x)).
/// Maximum Likelihood from Incomplete Data
/// Via the EM Algorithm. Journal of the Royal Statistical Society: Series B (Methodological),
/// 39(1), 1-22. doi: 10.1111/j.2517-6161.1977.tb01600.x
#[derive(Debug, Clone)]
pub struct ExpectMax<F = f64> {
    config : EmConfig<F>,
    trace : Option<Trace<F>>
}

impl<F> ExpectMax<F>
    where F : Float
{

    pub fn new(config : EmConfig<F>) -> Self {
        Self { config, trace : None }
    }

    pub fn config(&self) -> &EmConfig<F> {
        &self.config
    }

}

impl<F> Estimator<F> for ExpectMax<F>
    where F : Float
{

    type Output = Trace<F>;

    fn fit<'a>(&'a mut self, counts : &Counts<F>) -> Result<&'a Trace<F>, EmError> {
        let trace = expectation_maximization(counts, &self.config)?;
        Ok(&*self.trace.insert(trace))
    }

    fn result<'a>(&'a self) -> Option<&'a Trace<F>> {
        self.trace.as_ref()
    }

}

/// Expected decomposition of y1 into its two latent categories, y11 + y12 = y1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatentSplit<F> {
    pub y11 : F,
    pub y12 : F
}

/// Sequence of estimates produced by a solve, one per completed iteration, in
/// iteration order. The iteration count is always the length of the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace<F> {
    estimates : Vec<F>
}

impl<F> Trace<F>
    where F : Float
{

    pub fn estimates(&self) -> &[F] {
        &self.estimates[..]
    }

    pub fn iterations(&self) -> usize {
        self.estimates.len()
    }

    /// Final estimate, if the loop ran at least once.
    pub fn last(&self) -> Option<F> {
        self.estimates.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn into_inner(self) -> Vec<F> {
        self.estimates
    }

}

pub(crate) fn as_f64<F : Float>(v : F) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

/// Splits y1 into the expected counts of its latent categories given psi:
/// y11 = (y1/2) / (1/2 + psi/4) and y12 = y1 - y11.
pub fn expectation_step<F>(psi : F, y1 : F) -> Result<LatentSplit<F>, EmError>
    where F : Float
{
    let two = F::one() + F::one();
    let four = two + two;
    let denom = F::one() / two + psi / four;
    if denom == F::zero() {
        return Err(EmError::DegenerateSplit { psi : as_f64(psi) });
    }
    let y11 = (y1 / two) / denom;
    Ok(LatentSplit { y11, y12 : y1 - y11 })
}

/// Closed-form maximizer of the complete-data likelihood: psi = (y12 + y4) / (n - y11).
pub fn maximization_step<F>(split : &LatentSplit<F>, y4 : F, n : F) -> Result<F, EmError>
    where F : Float
{
    let denom = n - split.y11;
    if denom == F::zero() {
        return Err(EmError::DegenerateData { total : as_f64(n), y11 : as_f64(split.y11) });
    }
    Ok((split.y12 + y4) / denom)
}

/// Runs the fixed-point iteration from config.initial_guess until the last update moves
/// psi by no more than config.tolerance. There is no iteration limit unless config.max_iter
/// is set. Arithmetic failures abort the solve, discarding the estimates gathered so far.
pub fn expectation_maximization<F>(counts : &Counts<F>, config : &EmConfig<F>) -> Result<Trace<F>, EmError>
    where F : Float
{
    let (y1, y4, n) = (counts.y1(), counts.y4(), counts.total());
    let mut psi_prev = F::zero();
    let mut psi = config.initial_guess;
    let mut estimates = Vec::new();

    while (psi_prev - psi).abs() > config.tolerance {
        if let Some(max_iter) = config.max_iter {
            if estimates.len() >= max_iter {
                return Err(EmError::NotConverged { iterations : estimates.len(), last : as_f64(psi) });
            }
        }
        let split = expectation_step(psi, y1)?;
        let psi_new = maximization_step(&split, y4, n)?;
        psi_prev = psi;
        psi = psi_new;
        estimates.push(psi);
        debug!(
            iteration = estimates.len(),
            psi_used = as_f64(psi_prev),
            psi = as_f64(psi),
            y11 = as_f64(split.y11),
            y12 = as_f64(split.y12),
            "EM step"
        );
    }

    info!(iterations = estimates.len(), psi = as_f64(psi), "EM converged");
    Ok(Trace { estimates })
}

/// Convenience entry point taking the four counts, the tolerance and the initial guess
/// directly, without an iteration limit.
pub fn solve<F>(y1 : F, y2 : F, y3 : F, y4 : F, tolerance : F, initial_guess : F) -> Result<Trace<F>, EmError>
    where F : Float
{
    let counts = Counts::new(y1, y2, y3, y4);
    let config = EmConfig { tolerance, initial_guess, max_iter : None };
    expectation_maximization(&counts, &config)
}
