//! The sensor model and the full metric pipeline: Cramér-Rao bound, metric width, and score.
//!
//! # Examples
//!
//! ```rust
//! use rusty_cosmic::event_train::EventTrain;
//! use rusty_cosmic::metric::SensorModel;
//!
//! let model = SensorModel::from_json(
//!     r#"{"kernel": {"alpha": 3.18, "gamma": 34.49, "amplitude": 1.0}, "period": 0.08, "noise_var": 0.0625}"#,
//! )
//! .unwrap();
//!
//! let truth = EventTrain::build(&[1.0, 2.0, 5.0]).unwrap();
//! let estimate = EventTrain::build(&[1.005, 2.01, 7.0]).unwrap();
//! let result = model.score(&truth, &estimate).unwrap();
//! assert_eq!(result.matches, vec![(0, 0), (1, 1)]);
//! ```
use serde::{Deserialize, Serialize};

use crate::crb::{compute_crb_with_phase, SamplePhase};
use crate::error::CosmicError;
use crate::event_train::EventTrain;
use crate::kernel::BiExponential;
use crate::score::{score, MatchResult};
use crate::width::{GaussianInterval, WidthPolicy};

/// A sampled sensor: its pulse kernel, its sampling period, and the variance of its additive Gaussian noise.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawSensorModel")]
pub struct SensorModel {
    kernel: BiExponential,
    period: f64,
    noise_var: f64,
    phase: SamplePhase,
}

#[derive(Deserialize)]
struct RawSensorModel {
    kernel: BiExponential,
    period: f64,
    noise_var: f64,
    #[serde(default)]
    phase: SamplePhase,
}

impl TryFrom<RawSensorModel> for SensorModel {
    type Error = CosmicError;

    fn try_from(raw: RawSensorModel) -> Result<Self, Self::Error> {
        SensorModel::build(raw.kernel, raw.period, raw.noise_var, raw.phase)
    }
}

impl SensorModel {
    /// Create a sensor model.
    /// The function returns an error if the sampling period is not positive or the noise variance is negative.
    pub fn build(
        kernel: BiExponential,
        period: f64,
        noise_var: f64,
        phase: SamplePhase,
    ) -> Result<Self, CosmicError> {
        if !(period.is_finite() && period > 0.0) {
            return Err(CosmicError::InvalidParameter(format!(
                "the sampling period must be positive, got {}",
                period
            )));
        }
        if !(noise_var.is_finite() && noise_var >= 0.0) {
            return Err(CosmicError::InvalidParameter(format!(
                "the noise variance must be non-negative, got {}",
                noise_var
            )));
        }
        Ok(SensorModel {
            kernel,
            period,
            noise_var,
            phase,
        })
    }

    /// Parse and validate a sensor model from its JSON description.
    pub fn from_json(json: &str) -> Result<Self, CosmicError> {
        serde_json::from_str(json).map_err(|e| CosmicError::InvalidConfig(e.to_string()))
    }

    /// Returns the pulse kernel.
    pub fn kernel(&self) -> &BiExponential {
        &self.kernel
    }

    /// Returns the sampling period.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Returns the noise variance.
    pub fn noise_var(&self) -> f64 {
        self.noise_var
    }

    /// Returns the phase convention of the bound.
    pub fn phase(&self) -> SamplePhase {
        self.phase
    }

    /// Returns the Cramér-Rao bound on the time of an event.
    pub fn crb(&self) -> Result<f64, CosmicError> {
        compute_crb_with_phase(
            self.period,
            self.kernel.amplitude(),
            self.noise_var,
            self.kernel.alpha(),
            self.kernel.gamma(),
            self.phase,
        )
    }

    /// Returns the metric width with the default policy.
    pub fn width(&self) -> Result<f64, CosmicError> {
        self.width_with(&GaussianInterval::default())
    }

    /// Returns the metric width with the prescribed policy.
    pub fn width_with<P: WidthPolicy>(&self, policy: &P) -> Result<f64, CosmicError> {
        policy.width(self.crb()?)
    }

    /// Score the estimated event train against the true one, with the metric width of the sensor.
    /// A noiseless sensor has a zero width, with which no score can be computed.
    pub fn score(
        &self,
        truth: &EventTrain,
        estimate: &EventTrain,
    ) -> Result<MatchResult, CosmicError> {
        score(self.width()?, truth, estimate)
    }
}
