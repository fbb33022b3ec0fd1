//! Pulse kernels, i.e., the impulse responses superposed at every event time.
//!
//! Two kernels are provided:
//! - [`BiExponential`]: the causal rise/decay response of the sensor (e.g., a calcium indicator),
//! - [`Triangular`]: a symmetric pulse used to draw comparable pulse trains.
use serde::{Deserialize, Serialize};

use crate::error::CosmicError;

/// A pulse kernel, evaluated at the time elapsed since an event.
pub trait Kernel {
    /// Returns the kernel value at `dt`.
    fn eval(&self, dt: f64) -> f64;

    /// Returns the time derivative of the kernel at `dt`.
    fn derivative(&self, dt: f64) -> f64;

    /// Returns the interval `[lo, hi]` outside of which the kernel vanishes.
    fn support(&self) -> (f64, f64);
}

/// The causal bi-exponential kernel `A * exp(-alpha * dt) * (1 - exp(-gamma * dt))` for `dt >= 0`.
///
/// The decay rate is `alpha` and the rise rate is `gamma`.
/// Before the event, i.e., for `dt < 0`, the kernel is zero.
///
/// # Examples
///
/// ```rust
/// use rusty_cosmic::kernel::{BiExponential, Kernel};
///
/// let kernel = BiExponential::build(3.18, 34.49, 1.0).unwrap();
/// assert_eq!(kernel.eval(-1.0), 0.0);
/// assert_eq!(kernel.eval(0.0), 0.0);
/// assert!(kernel.eval(0.1) > 0.0);
/// ```
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawBiExponential")]
pub struct BiExponential {
    /// The decay rate.
    alpha: f64,
    /// The rise rate.
    gamma: f64,
    /// The amplitude scale.
    amplitude: f64,
}

#[derive(Deserialize)]
struct RawBiExponential {
    alpha: f64,
    gamma: f64,
    #[serde(default = "unit_amplitude")]
    amplitude: f64,
}

fn unit_amplitude() -> f64 {
    1.0
}

impl TryFrom<RawBiExponential> for BiExponential {
    type Error = CosmicError;

    fn try_from(raw: RawBiExponential) -> Result<Self, Self::Error> {
        BiExponential::build(raw.alpha, raw.gamma, raw.amplitude)
    }
}

impl BiExponential {
    /// Create a bi-exponential kernel.
    /// The function returns an error if a rate is not positive or the amplitude is zero.
    pub fn build(alpha: f64, gamma: f64, amplitude: f64) -> Result<Self, CosmicError> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(CosmicError::InvalidParameter(format!(
                "the decay rate alpha must be positive, got {}",
                alpha
            )));
        }
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(CosmicError::InvalidParameter(format!(
                "the rise rate gamma must be positive, got {}",
                gamma
            )));
        }
        if !amplitude.is_finite() || amplitude == 0.0 {
            return Err(CosmicError::InvalidParameter(format!(
                "the amplitude must be finite and non-zero, got {}",
                amplitude
            )));
        }
        Ok(BiExponential {
            alpha,
            gamma,
            amplitude,
        })
    }

    /// Returns the decay rate.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the rise rate.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Returns the amplitude scale.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Returns the energy of the kernel derivative, i.e., the integral of its square over the positive half-line.
    pub fn derivative_energy(&self) -> f64 {
        self.amplitude * self.amplitude * self.gamma * self.gamma
            / (2.0 * (2.0 * self.alpha + self.gamma))
    }

    /// Returns the sum of the squared kernel derivative on the grid `{T, 2T, 3T, ...}`.
    ///
    /// The sample at the event time is left out: it sits on the onset kink, where the kernel is not
    /// differentiable with respect to the event time. The sum therefore vanishes as `T` grows.
    ///
    /// Writing the kernel as `A * (exp(-alpha * dt) - exp(-beta * dt))` with `beta = alpha + gamma`,
    /// every term of the squared derivative is a geometric series in `exp(-T)`.
    pub fn sampled_derivative_energy(&self, period: f64) -> f64 {
        let (alpha, beta) = (self.alpha, self.alpha + self.gamma);
        // sum of exp(-rate * i * period) over i >= 1, zero once exp overflows
        let series = |rate: f64| 1.0 / (rate * period).exp_m1();

        self.amplitude
            * self.amplitude
            * (alpha * alpha * series(2.0 * alpha) - 2.0 * alpha * beta * series(alpha + beta)
                + beta * beta * series(2.0 * beta))
    }
}

impl Kernel for BiExponential {
    fn eval(&self, dt: f64) -> f64 {
        if dt < 0.0 {
            return 0.0;
        }
        -self.amplitude * (-self.alpha * dt).exp() * (-self.gamma * dt).exp_m1()
    }

    /// The right derivative is returned at the event time.
    fn derivative(&self, dt: f64) -> f64 {
        if dt < 0.0 {
            return 0.0;
        }
        let beta = self.alpha + self.gamma;
        self.amplitude * (beta * (-beta * dt).exp() - self.alpha * (-self.alpha * dt).exp())
    }

    fn support(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }
}

/// The symmetric triangular pulse `max(0, 1 - |dt| / w)` of half-width `w`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Triangular {
    half_width: f64,
}

impl Triangular {
    /// Create a triangular pulse.
    /// The function returns an error if the half-width is not positive.
    pub fn build(half_width: f64) -> Result<Self, CosmicError> {
        if !(half_width.is_finite() && half_width > 0.0) {
            return Err(CosmicError::InvalidParameter(format!(
                "the pulse half-width must be positive, got {}",
                half_width
            )));
        }
        Ok(Triangular { half_width })
    }

    /// Returns the half-width of the pulse.
    pub fn half_width(&self) -> f64 {
        self.half_width
    }
}

impl Kernel for Triangular {
    fn eval(&self, dt: f64) -> f64 {
        (1.0 - dt.abs() / self.half_width).max(0.0)
    }

    /// Zero at the apex.
    fn derivative(&self, dt: f64) -> f64 {
        if dt == 0.0 || dt.abs() >= self.half_width {
            0.0
        } else {
            -dt.signum() / self.half_width
        }
    }

    fn support(&self) -> (f64, f64) {
        (-self.half_width, self.half_width)
    }
}
