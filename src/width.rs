//! Mapping from the Cramér-Rao bound to the matching tolerance ("metric width").
//!
//! The mapping is a policy, independent of how the bound is derived: any [`WidthPolicy`] can be plugged in.
use serde::{Deserialize, Serialize};

use crate::error::CosmicError;
use crate::DEFAULT_WIDTH_SCALE;

/// A policy turning a variance bound (in squared time units) into a matching half-width (in time units).
pub trait WidthPolicy {
    /// Returns the half-width associated with the bound.
    fn width(&self, crb: f64) -> Result<f64, CosmicError>;
}

/// The half-width of a centered Gaussian interval, i.e., `num_std` standard deviations `sqrt(crb)`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct GaussianInterval {
    num_std: f64,
}

impl GaussianInterval {
    /// Create a Gaussian interval policy with the given number of standard deviations.
    pub fn build(num_std: f64) -> Result<Self, CosmicError> {
        if !(num_std.is_finite() && num_std > 0.0) {
            return Err(CosmicError::InvalidParameter(format!(
                "the number of standard deviations must be positive, got {}",
                num_std
            )));
        }
        Ok(GaussianInterval { num_std })
    }

    /// Returns the number of standard deviations.
    pub fn num_std(&self) -> f64 {
        self.num_std
    }
}

impl Default for GaussianInterval {
    fn default() -> Self {
        GaussianInterval {
            num_std: DEFAULT_WIDTH_SCALE,
        }
    }
}

impl WidthPolicy for GaussianInterval {
    fn width(&self, crb: f64) -> Result<f64, CosmicError> {
        if !(crb.is_finite() && crb >= 0.0) {
            return Err(CosmicError::InvalidInput(format!(
                "the Cramér-Rao bound must be a non-negative variance, got {}",
                crb
            )));
        }
        Ok(self.num_std * crb.sqrt())
    }
}

/// Returns the metric width associated with the bound, with the default policy (see [`DEFAULT_WIDTH_SCALE`]).
///
/// A zero bound (noiseless sensor) maps to a zero width. It is returned as is, but it is not a usable matching
/// tolerance: [`crate::score::score`] rejects it with [`CosmicError::InvalidParameter`].
///
/// # Examples
///
/// ```rust
/// use rusty_cosmic::width::width_from_crb;
///
/// assert_eq!(width_from_crb(0.0004).unwrap(), 0.06);
/// assert!(width_from_crb(-1.0).is_err());
/// ```
pub fn width_from_crb(crb: f64) -> Result<f64, CosmicError> {
    GaussianInterval::default().width(crb)
}
