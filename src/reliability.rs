//! Reliability Calculator
//!
//! Converts a mean time to failure into an annual probability of failure.
//! Failures are modelled as a Poisson process with constant rate
//! `lambda = 1 / mttf`; the probability of at least one failure within one
//! year is the exponential CDF at t = 1:
//!
//! `P = 1 - exp(-lambda * 1)`
//!
//! The result is always in [0, 1). A non-positive MTTF has no defined rate
//! and is rejected, never swallowed.

use statrs::distribution::{ContinuousCDF, Exp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReliabilityError {
    #[error("mean_time_to_failure must be a positive, finite number of years (got {0})")]
    NonPositiveMttf(f64),
}

/// Annual probability of at least one failure, given an MTTF in years.
pub fn annual_probability_of_failure(mttf_years: f64) -> Result<f64, ReliabilityError> {
    if !mttf_years.is_finite() || mttf_years <= 0.0 {
        return Err(ReliabilityError::NonPositiveMttf(mttf_years));
    }
    let failure_rate = 1.0 / mttf_years;
    let distribution =
        Exp::new(failure_rate).map_err(|_| ReliabilityError::NonPositiveMttf(mttf_years))?;
    // exp(-rate) underflows to 0 for MTTFs far below a year, which would
    // round the CDF up to exactly 1; the contract is [0, 1).
    Ok(distribution.cdf(1.0).min(1.0 - f64::EPSILON))
}
