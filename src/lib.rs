//! This crate provides a metric to score estimated event trains (e.g., spikes inferred from calcium imaging) against the
//! ground truth, with a matching tolerance calibrated on the Cramér-Rao bound of the sensor.
//!
//! # Simulating Signals
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use rusty_cosmic::kernel::BiExponential;
//! use rusty_cosmic::sampler::{add_noise, rand_event_train};
//! use rusty_cosmic::signal::{synthesize, SamplingGrid};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let truth = rand_event_train(1.0, 0.0, 30.0, &mut rng).unwrap();
//!
//! // Noiseless and noisy fluorescence signals
//! let grid = SamplingGrid::build(0.08, 0.0, 30.0).unwrap();
//! let kernel = BiExponential::build(3.18, 34.49, 1.0).unwrap();
//! let signal = synthesize(&grid, &truth, &kernel);
//! let noisy_signal = add_noise(&signal, 0.25, &mut rng).unwrap();
//!
//! assert_eq!(noisy_signal.len(), 375);
//! ```
//!
//! # Scoring Estimates
//!
//! ```rust
//! use rusty_cosmic::crb::compute_crb;
//! use rusty_cosmic::event_train::EventTrain;
//! use rusty_cosmic::score::score;
//! use rusty_cosmic::width::width_from_crb;
//!
//! // The tolerance follows from the sensor and noise parameters
//! let crb = compute_crb(0.08, 1.0, 0.25_f64.powi(2), 3.18, 34.49).unwrap();
//! let width = width_from_crb(crb).unwrap();
//!
//! let truth = EventTrain::build(&[1.0, 2.0, 5.0]).unwrap();
//! let estimate = EventTrain::build(&[1.01, 5.0, 6.0]).unwrap();
//! let result = score(width, &truth, &estimate).unwrap();
//!
//! assert_eq!(result.matches, vec![(0, 0), (2, 1)]);
//! assert!(result.score > 0.66 && result.score < 0.67);
//! ```

pub mod crb;
pub mod error;
pub mod event_train;
pub mod kernel;
pub mod metric;
pub mod sampler;
pub mod score;
pub mod signal;
pub mod width;

/// Minimum number of samples to synthesize a signal in parallel.
pub const MIN_PARALLEL_SAMPLES: usize = 10_000;
/// Number of standard deviations in the default metric width, i.e., the half-width of a 99.7% Gaussian interval.
pub const DEFAULT_WIDTH_SCALE: f64 = 3.0;
/// Number of samples per metric width in the comparison pulse trains.
pub const PULSE_TRAIN_RESOLUTION: usize = 20;
/// Maximum number of samples in the comparison pulse trains.
pub const MAX_PULSE_TRAIN_SAMPLES: usize = 1_000_000;
