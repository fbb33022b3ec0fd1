//! Module implementing the concept of an event train, i.e., a sorted collection of event times (e.g., spikes).
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::CosmicError;

/// Represents a train of events with strictly increasing times, each carrying an amplitude.
///
/// Input times are validated, never sorted: an unsorted train usually reveals a bug upstream.
///
/// # Examples
///
/// ```rust
/// use rusty_cosmic::event_train::EventTrain;
///
/// let train = EventTrain::build(&[1.0, 2.0, 5.0]).unwrap();
/// assert_eq!(train.len(), 3);
/// assert_eq!(train.amplitudes(), &[1.0, 1.0, 1.0]);
///
/// assert!(EventTrain::build(&[2.0, 1.0]).is_err());
/// ```
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawEventTrain")]
pub struct EventTrain {
    /// The (strictly increasing) event times.
    times: Vec<f64>,
    /// The event amplitudes, one per event.
    amplitudes: Vec<f64>,
}

/// Unvalidated form of an event train, as found in a configuration.
#[derive(Deserialize)]
struct RawEventTrain {
    times: Vec<f64>,
    #[serde(default)]
    amplitudes: Option<Vec<f64>>,
}

impl TryFrom<RawEventTrain> for EventTrain {
    type Error = CosmicError;

    fn try_from(raw: RawEventTrain) -> Result<Self, Self::Error> {
        match raw.amplitudes {
            Some(amplitudes) => EventTrain::build_with_amplitudes(&raw.times, &amplitudes),
            None => EventTrain::build(&raw.times),
        }
    }
}

impl EventTrain {
    /// Create an empty event train.
    pub fn new() -> Self {
        EventTrain::default()
    }

    /// Create an event train with unit amplitudes.
    /// The function returns an error for non-finite, unsorted or duplicated times.
    pub fn build(times: &[f64]) -> Result<Self, CosmicError> {
        EventTrain::build_with_amplitudes(times, &vec![1.0; times.len()])
    }

    /// Create an event train with the prescribed amplitudes.
    /// The function returns an error for non-finite, unsorted or duplicated times, or for invalid amplitudes.
    pub fn build_with_amplitudes(times: &[f64], amplitudes: &[f64]) -> Result<Self, CosmicError> {
        if times.len() != amplitudes.len() {
            return Err(CosmicError::MalformedEventTrain(format!(
                "{} times but {} amplitudes",
                times.len(),
                amplitudes.len()
            )));
        }

        if let Some((pos, time)) = times.iter().enumerate().find(|(_, t)| !t.is_finite()) {
            return Err(CosmicError::MalformedEventTrain(format!(
                "non-finite time {} at position {}",
                time, pos
            )));
        }

        if let Some((pos, amplitude)) = amplitudes
            .iter()
            .enumerate()
            .find(|(_, a)| !a.is_finite())
        {
            return Err(CosmicError::MalformedEventTrain(format!(
                "non-finite amplitude {} at position {}",
                amplitude, pos
            )));
        }

        if let Some((pos, ts)) = times.windows(2).enumerate().find(|(_, ts)| ts[1] <= ts[0]) {
            return Err(CosmicError::MalformedEventTrain(format!(
                "times must be strictly increasing, got {} at position {} followed by {}",
                ts[0],
                pos,
                ts[1]
            )));
        }

        Ok(EventTrain {
            times: times.to_vec(),
            amplitudes: amplitudes.to_vec(),
        })
    }

    /// Returns the number of events in the train.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Returns true if the train has no events.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns a slice of the event times.
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    /// Returns a slice of the event amplitudes.
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes[..]
    }

    /// Returns the time of the first event, if any.
    pub fn first(&self) -> Option<f64> {
        self.times.first().copied()
    }

    /// Returns the time of the last event, if any.
    pub fn last(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Returns an iterator over the (time, amplitude) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times
            .iter()
            .copied()
            .zip(self.amplitudes.iter().copied())
    }

    /// Returns the positions of the events whose time lies in the closed interval [lo, hi].
    pub(crate) fn positions_within(&self, lo: f64, hi: f64) -> Range<usize> {
        let start = self.times.partition_point(|&t| t < lo);
        let end = self.times.partition_point(|&t| t <= hi);
        start..end.max(start)
    }
}
