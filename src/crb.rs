//! Cramér-Rao bound on the estimation of an event time from a noisy sampled signal.
//!
//! Under additive white Gaussian noise of variance `noise_var`, the Fisher information about the time of a single event
//! is `amplitude^2 / noise_var * S`, where `S` is the sum of the squared (unit-amplitude) kernel derivative over the
//! samples. The bound is its reciprocal. It is a property of the sensor and the noise, not of any estimator.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::CosmicError;
use crate::kernel::BiExponential;

/// The position of the event relative to the sampling grid.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplePhase {
    /// The event coincides with a sample. That sample sits on the onset kink of the kernel and is left out, so
    /// the information comes from the samples `T, 2T, ...` after the event.
    #[default]
    Aligned,
    /// The event falls uniformly at random within a sampling period; the Fisher information is averaged over its phase.
    Uniform,
}

/// Returns the Fisher information about the time of an event, for a kernel of unit amplitude scaled by `amplitude`.
pub fn fisher_information(
    period: f64,
    amplitude: f64,
    noise_var: f64,
    kernel: &BiExponential,
    phase: SamplePhase,
) -> Result<f64, CosmicError> {
    let signal_info = signal_information(period, amplitude, kernel, phase)?;
    check_noise_var(noise_var)?;
    Ok(signal_info / noise_var)
}

/// Returns the Cramér-Rao bound for the time of an event aligned with the sampling grid.
///
/// # Errors
///
/// - [`CosmicError::InvalidParameter`] if a parameter is out of its domain (non-positive period, rate, or negative noise variance),
/// - [`CosmicError::DegenerateModel`] if the signal carries no information about the event time (e.g., zero amplitude,
///   or a sampling period so long that no sample falls within the kernel support). The bound is never reported as
///   infinite.
///
/// # Examples
///
/// ```rust
/// use rusty_cosmic::crb::compute_crb;
///
/// let crb = compute_crb(0.08, 1.0, 0.25_f64.powi(2), 3.18, 34.49).unwrap();
/// assert!(crb > 0.0 && crb < 1e-2);
/// ```
pub fn compute_crb(
    period: f64,
    amplitude: f64,
    noise_var: f64,
    alpha: f64,
    gamma: f64,
) -> Result<f64, CosmicError> {
    compute_crb_with_phase(period, amplitude, noise_var, alpha, gamma, SamplePhase::Aligned)
}

/// Returns the Cramér-Rao bound for the time of an event with the prescribed phase convention.
/// See [`compute_crb`] for the errors.
pub fn compute_crb_with_phase(
    period: f64,
    amplitude: f64,
    noise_var: f64,
    alpha: f64,
    gamma: f64,
    phase: SamplePhase,
) -> Result<f64, CosmicError> {
    let kernel = BiExponential::build(alpha, gamma, 1.0)?;
    check_noise_var(noise_var)?;
    let signal_info = signal_information(period, amplitude, &kernel, phase)?;

    let crb = noise_var / signal_info;
    debug!(
        "CRB for T={}, A={}, noise_var={}, alpha={}, gamma={} ({:?}): {} (std {})",
        period,
        amplitude,
        noise_var,
        alpha,
        gamma,
        phase,
        crb,
        crb.sqrt()
    );
    Ok(crb)
}

/// The noise-free part of the Fisher information, i.e., `amplitude^2 * S`.
fn signal_information(
    period: f64,
    amplitude: f64,
    kernel: &BiExponential,
    phase: SamplePhase,
) -> Result<f64, CosmicError> {
    if !(period.is_finite() && period > 0.0) {
        return Err(CosmicError::InvalidParameter(format!(
            "the sampling period must be positive, got {}",
            period
        )));
    }
    if !amplitude.is_finite() {
        return Err(CosmicError::InvalidParameter(format!(
            "the amplitude must be finite, got {}",
            amplitude
        )));
    }

    // Rescale to a unit amplitude
    let energy = match phase {
        SamplePhase::Aligned => kernel.sampled_derivative_energy(period),
        SamplePhase::Uniform => kernel.derivative_energy() / period,
    } / (kernel.amplitude() * kernel.amplitude());

    let signal_info = amplitude * amplitude * energy;
    if !(signal_info.is_finite() && signal_info > 0.0) {
        return Err(CosmicError::DegenerateModel(format!(
            "no usable information about the event time (A={}, T={}, alpha={}, gamma={}): {}",
            amplitude,
            period,
            kernel.alpha(),
            kernel.gamma(),
            signal_info
        )));
    }
    debug!("Fisher information (times noise variance): {}", signal_info);
    Ok(signal_info)
}

fn check_noise_var(noise_var: f64) -> Result<(), CosmicError> {
    if !(noise_var.is_finite() && noise_var >= 0.0) {
        return Err(CosmicError::InvalidParameter(format!(
            "the noise variance must be non-negative, got {}",
            noise_var
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::kernel::Kernel;

    const ALPHA: f64 = 3.18;
    const GAMMA: f64 = 34.49;

    #[test]
    fn test_compute_crb_closed_form() {
        let kernel = BiExponential::build(ALPHA, GAMMA, 1.0).unwrap();
        let crb = compute_crb(0.08, 2.0, 0.0625, ALPHA, GAMMA).unwrap();
        assert_relative_eq!(
            crb,
            0.0625 / (4.0 * kernel.sampled_derivative_energy(0.08)),
            max_relative = 1e-12
        );

        // with uniform phase, the bound is linear in the period
        let crb = compute_crb_with_phase(0.08, 1.0, 0.0625, ALPHA, GAMMA, SamplePhase::Uniform)
            .unwrap();
        assert_relative_eq!(
            crb,
            0.0625 * 2.0 * (2.0 * ALPHA + GAMMA) * 0.08 / (GAMMA * GAMMA),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_compute_crb_brute_force() {
        let kernel = BiExponential::build(ALPHA, GAMMA, 1.0).unwrap();
        let (period, amplitude, noise_var) = (0.05, 1.5, 0.01);
        let info: f64 = (1..10_000)
            .map(|i| (amplitude * kernel.derivative(i as f64 * period)).powi(2) / noise_var)
            .sum();
        assert_relative_eq!(
            compute_crb(period, amplitude, noise_var, ALPHA, GAMMA).unwrap(),
            1.0 / info,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            fisher_information(period, amplitude, noise_var, &kernel, SamplePhase::Aligned)
                .unwrap(),
            info,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_compute_crb_invalid_parameters() {
        assert!(matches!(
            compute_crb(0.0, 1.0, 0.1, ALPHA, GAMMA),
            Err(CosmicError::InvalidParameter(_))
        ));
        assert!(matches!(
            compute_crb(-0.1, 1.0, 0.1, ALPHA, GAMMA),
            Err(CosmicError::InvalidParameter(_))
        ));
        assert!(matches!(
            compute_crb(0.1, 1.0, -0.1, ALPHA, GAMMA),
            Err(CosmicError::InvalidParameter(_))
        ));
        assert!(matches!(
            compute_crb(0.1, 1.0, 0.1, 0.0, GAMMA),
            Err(CosmicError::InvalidParameter(_))
        ));
        assert!(matches!(
            compute_crb(0.1, 1.0, 0.1, ALPHA, -GAMMA),
            Err(CosmicError::InvalidParameter(_))
        ));
        assert!(matches!(
            compute_crb(0.1, f64::NAN, 0.1, ALPHA, GAMMA),
            Err(CosmicError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_compute_crb_degenerate() {
        // zero amplitude: no information at all, the bound is rejected rather than infinite
        assert!(matches!(
            compute_crb(0.08, 0.0, 0.0625, ALPHA, GAMMA),
            Err(CosmicError::DegenerateModel(_))
        ));
        assert!(matches!(
            compute_crb_with_phase(0.08, 0.0, 0.0625, ALPHA, GAMMA, SamplePhase::Uniform),
            Err(CosmicError::DegenerateModel(_))
        ));
        // no sample falls within the kernel support
        assert!(matches!(
            compute_crb(1e3, 1.0, 0.0625, ALPHA, GAMMA),
            Err(CosmicError::DegenerateModel(_))
        ));
        assert!(matches!(
            compute_crb(1e6, 1.0, 0.0625, ALPHA, GAMMA),
            Err(CosmicError::DegenerateModel(_))
        ));
        // the averaged information underflows for absurdly coarse sampling
        assert!(matches!(
            compute_crb_with_phase(1e308, 1e-160, 0.0625, ALPHA, GAMMA, SamplePhase::Uniform),
            Err(CosmicError::DegenerateModel(_))
        ));
    }

    #[test]
    fn test_compute_crb_noiseless() {
        assert_eq!(compute_crb(0.08, 1.0, 0.0, ALPHA, GAMMA), Ok(0.0));
    }

    #[test]
    fn test_compute_crb_monotonic_noise() {
        for phase in [SamplePhase::Aligned, SamplePhase::Uniform] {
            let crbs = (0..100)
                .map(|i| {
                    compute_crb_with_phase(0.08, 1.0, i as f64 * 0.01, ALPHA, GAMMA, phase).unwrap()
                })
                .collect::<Vec<f64>>();
            assert!(crbs.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_compute_crb_monotonic_amplitude() {
        for phase in [SamplePhase::Aligned, SamplePhase::Uniform] {
            let crbs = (1..100)
                .map(|i| {
                    compute_crb_with_phase(0.08, i as f64 * 0.05, 0.0625, ALPHA, GAMMA, phase)
                        .unwrap()
                })
                .collect::<Vec<f64>>();
            assert!(crbs.windows(2).all(|w| w[0] > w[1]));
        }

        // only the magnitude of the amplitude matters
        assert_eq!(
            compute_crb(0.08, -2.0, 0.0625, ALPHA, GAMMA),
            compute_crb(0.08, 2.0, 0.0625, ALPHA, GAMMA)
        );
    }

    #[test]
    fn test_compute_crb_monotonic_period() {
        for (alpha, gamma) in [(ALPHA, GAMMA), (1.0, 0.5), (0.5, 10.0), (10.0, 1.0), (2.0, 50.0)] {
            for phase in [SamplePhase::Aligned, SamplePhase::Uniform] {
                let crbs = (1..2000)
                    .map(|i| {
                        compute_crb_with_phase(i as f64 * 0.001, 1.0, 0.0625, alpha, gamma, phase)
                            .unwrap()
                    })
                    .collect::<Vec<f64>>();
                assert!(
                    crbs.windows(2).all(|w| w[0] <= w[1] * (1.0 + 1e-12)),
                    "non-monotonic CRB for alpha={}, gamma={}, {:?}",
                    alpha,
                    gamma,
                    phase
                );
            }
        }
    }

    #[test]
    fn test_compute_crb_coarse_sampling() {
        // the bound keeps growing with the period, until no sample sees the pulse
        let crbs = [0.08, 0.5, 1.0, 10.0, 50.0]
            .into_iter()
            .map(|period| compute_crb(period, 1.0, 0.0625, ALPHA, GAMMA).unwrap())
            .collect::<Vec<f64>>();
        assert!(crbs.windows(2).all(|w| w[0] < w[1]));
        assert!(crbs[1] > 10.0 * crbs[0]);
        assert!(crbs[4] > 1e100);
        assert!(matches!(
            compute_crb(200.0, 1.0, 0.0625, ALPHA, GAMMA),
            Err(CosmicError::DegenerateModel(_))
        ));
    }

    #[test]
    fn test_sample_phase_deserialize() {
        assert_eq!(
            serde_json::from_str::<SamplePhase>(r#""uniform""#).unwrap(),
            SamplePhase::Uniform
        );
        assert_eq!(SamplePhase::default(), SamplePhase::Aligned);
    }
}
