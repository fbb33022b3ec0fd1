//! Sampling of synthetic data: true event trains, estimated event trains and noisy signals.
//!
//! The random number generator is always provided by the caller, so that results are reproducible without any global state.
//!
//! # Examples
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use rusty_cosmic::sampler::{rand_estimate, rand_event_train};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let truth = rand_event_train(1.0, 0.0, 30.0, &mut rng).unwrap();
//! let estimate = rand_estimate(&truth, 0.8, 0.03, &mut rng).unwrap();
//! assert!(estimate.len() <= truth.len());
//! ```
use log::debug;
use rand::distributions::Distribution;
use rand::seq::index;
use rand::Rng;
use rand_distr::{Exp, Normal};

use crate::error::CosmicError;
use crate::event_train::EventTrain;
use crate::signal::Signal;

/// Samples a Poisson event train with the given rate over `[start, end)`, i.e., with exponential inter-event times.
pub fn rand_event_train<R: Rng>(
    rate: f64,
    start: f64,
    end: f64,
    rng: &mut R,
) -> Result<EventTrain, CosmicError> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(CosmicError::InvalidParameter(format!(
            "the event rate must be positive, got {}",
            rate
        )));
    }
    if !(start.is_finite() && end.is_finite()) || start >= end {
        return Err(CosmicError::InvalidParameter(format!(
            "the time range [{}, {}) is invalid",
            start, end
        )));
    }

    let exp = Exp::new(rate).map_err(|e| CosmicError::InvalidParameter(e.to_string()))?;

    let mut times: Vec<f64> = vec![];
    let mut time = start;
    loop {
        time += exp.sample(rng);
        if time >= end {
            break;
        }
        // Inter-event times below the float resolution would duplicate an event
        if times.last().map_or(true, |&last| time > last) {
            times.push(time);
        }
    }

    debug!(
        "Sampled {} events over [{}, {}) with rate {}",
        times.len(),
        start,
        end,
        rate
    );
    EventTrain::build(&times)
}

/// Samples an estimate of the true event train: a random subset of `round(detection_ratio * K)` true events,
/// each displaced by a Gaussian jitter of standard deviation `jitter`.
///
/// The estimated events keep the amplitude of their true counterpart. Displaced events are sorted, and exact duplicates
/// are dropped.
pub fn rand_estimate<R: Rng>(
    truth: &EventTrain,
    detection_ratio: f64,
    jitter: f64,
    rng: &mut R,
) -> Result<EventTrain, CosmicError> {
    if !(0.0..=1.0).contains(&detection_ratio) {
        return Err(CosmicError::InvalidParameter(format!(
            "the detection ratio must be in [0, 1], got {}",
            detection_ratio
        )));
    }
    if !(jitter.is_finite() && jitter >= 0.0) {
        return Err(CosmicError::InvalidParameter(format!(
            "the jitter must be non-negative, got {}",
            jitter
        )));
    }

    let normal =
        Normal::new(0.0, jitter).map_err(|e| CosmicError::InvalidParameter(e.to_string()))?;
    let num_detected = (detection_ratio * truth.len() as f64).round() as usize;

    let detected = index::sample(rng, truth.len(), num_detected);
    let mut events: Vec<(f64, f64)> = detected
        .into_iter()
        .map(|k| (truth.times()[k] + normal.sample(rng), truth.amplitudes()[k]))
        .collect();

    events.sort_by(|a, b| a.0.total_cmp(&b.0));
    events.dedup_by(|a, b| a.0 == b.0);

    let (times, amplitudes): (Vec<f64>, Vec<f64>) = events.into_iter().unzip();
    EventTrain::build_with_amplitudes(&times, &amplitudes)
}

/// Returns a copy of the signal with additive white Gaussian noise of standard deviation `sigma`.
pub fn add_noise<R: Rng>(signal: &Signal, sigma: f64, rng: &mut R) -> Result<Signal, CosmicError> {
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(CosmicError::InvalidParameter(format!(
            "the noise standard deviation must be non-negative, got {}",
            sigma
        )));
    }
    let normal = Normal::new(0.0, sigma).map_err(|e| CosmicError::InvalidParameter(e.to_string()))?;

    let values = signal
        .values()
        .iter()
        .map(|value| value + normal.sample(rng))
        .collect();
    Signal::build(*signal.grid(), values)
}
