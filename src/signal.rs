//! Sampled signals and their synthesis from event trains.
//!
//! A signal is the superposition of a pulse kernel at every event of a train, sampled on a regular grid.
//! With the [`BiExponential`](crate::kernel::BiExponential) kernel, this models the noiseless response of a linear,
//! time-invariant and causal sensor, e.g., the fluorescence of a calcium indicator.
//!
//! # Examples
//!
//! ```rust
//! use rusty_cosmic::event_train::EventTrain;
//! use rusty_cosmic::kernel::BiExponential;
//! use rusty_cosmic::signal::{synthesize, SamplingGrid};
//!
//! let grid = SamplingGrid::build(0.08, 0.0, 30.0).unwrap();
//! let train = EventTrain::build(&[1.0, 2.0, 5.0]).unwrap();
//! let kernel = BiExponential::build(3.18, 34.49, 1.0).unwrap();
//!
//! let signal = synthesize(&grid, &train, &kernel);
//! assert_eq!(signal.len(), 375);
//! assert_eq!(signal.values()[0], 0.0);
//! ```
use log::trace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CosmicError;
use crate::event_train::EventTrain;
use crate::kernel::Kernel;
use crate::MIN_PARALLEL_SAMPLES;

/// A regular sampling grid `t_i = start + i * period` restricted to `[start, end)`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct SamplingGrid {
    /// The sampling period.
    period: f64,
    /// The time of the first sample.
    start: f64,
    /// The (excluded) end of the grid.
    end: f64,
    /// The number of samples in `[start, end)`.
    num_samples: usize,
}

impl SamplingGrid {
    /// Create a sampling grid.
    /// The function returns an error if the period is not positive or the time range is invalid.
    pub fn build(period: f64, start: f64, end: f64) -> Result<Self, CosmicError> {
        if !(period.is_finite() && period > 0.0) {
            return Err(CosmicError::InvalidParameter(format!(
                "the sampling period must be positive, got {}",
                period
            )));
        }
        if !(start.is_finite() && end.is_finite()) || start > end {
            return Err(CosmicError::InvalidParameter(format!(
                "the time range [{}, {}) is invalid",
                start, end
            )));
        }

        let ratio = (end - start) / period;
        if !ratio.is_finite() || ratio >= usize::MAX as f64 {
            return Err(CosmicError::InvalidParameter(format!(
                "the time range [{}, {}) is too long for the sampling period {}",
                start, end, period
            )));
        }

        // Fix the rounding of the ratio so that exactly the samples before the end are kept
        let mut num_samples = ratio.ceil() as usize;
        while num_samples > 0 && start + (num_samples - 1) as f64 * period >= end {
            num_samples -= 1;
        }
        while start + num_samples as f64 * period < end {
            num_samples += 1;
        }

        Ok(SamplingGrid {
            period,
            start,
            end,
            num_samples,
        })
    }

    /// Returns the sampling period.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Returns the time of the first sample.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the (excluded) end of the grid.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns the number of samples.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Returns the time of the i-th sample.
    pub fn time(&self, i: usize) -> f64 {
        self.start + i as f64 * self.period
    }

    /// Returns the sample times.
    pub fn times(&self) -> Vec<f64> {
        (0..self.num_samples).map(|i| self.time(i)).collect()
    }
}

/// A real-valued signal sampled on a regular grid.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Signal {
    grid: SamplingGrid,
    values: Vec<f64>,
}

impl Signal {
    /// Create a signal from its samples.
    /// The function returns an error if the number of values doesn't match the grid.
    pub fn build(grid: SamplingGrid, values: Vec<f64>) -> Result<Self, CosmicError> {
        if values.len() != grid.num_samples() {
            return Err(CosmicError::InvalidInput(format!(
                "the grid has {} samples but {} values were provided",
                grid.num_samples(),
                values.len()
            )));
        }
        Ok(Signal { grid, values })
    }

    /// Returns the sampling grid of the signal.
    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    /// Returns the sample times.
    pub fn times(&self) -> Vec<f64> {
        self.grid.times()
    }

    /// Returns the sample values.
    pub fn values(&self) -> &[f64] {
        &self.values[..]
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the signal has no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Returns the signal obtained by superposing the kernel at every event of the train, scaled by the event amplitude.
///
/// Only the events for which the sample falls within the kernel support contribute, i.e., for a causal kernel, the events
/// before (or at) the sample time. They are located by binary search, so that a kernel with a bounded support only costs
/// the events in its window.
pub fn synthesize<K: Kernel + Sync>(grid: &SamplingGrid, train: &EventTrain, kernel: &K) -> Signal {
    let (lo, hi) = kernel.support();
    let times = train.times();
    let amplitudes = train.amplitudes();

    let sample = |i: usize| -> f64 {
        let time = grid.time(i);
        train
            .positions_within(time - hi, time - lo)
            .map(|k| amplitudes[k] * kernel.eval(time - times[k]))
            .sum()
    };

    let values: Vec<f64> = if grid.num_samples() >= MIN_PARALLEL_SAMPLES {
        trace!(
            "Synthesizing {} samples from {} events in parallel",
            grid.num_samples(),
            train.len()
        );
        (0..grid.num_samples()).into_par_iter().map(sample).collect()
    } else {
        (0..grid.num_samples()).map(sample).collect()
    };

    Signal {
        grid: *grid,
        values,
    }
}
