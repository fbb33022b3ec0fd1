//! Matching of an estimated event train against a reference, and the resulting precision, recall and score.
//!
//! An estimated event may be matched to a true event if they are at most `width` apart. Among the one-to-one matchings,
//! the one with the most pairs is kept; ties are broken by the smallest total time offset, then by the earliest true
//! events. The score is the harmonic mean of precision and recall.
//!
//! # Examples
//!
//! ```rust
//! use approx::assert_relative_eq;
//! use rusty_cosmic::event_train::EventTrain;
//! use rusty_cosmic::score::score;
//!
//! let truth = EventTrain::build(&[1.0, 2.0, 5.0]).unwrap();
//! let estimate = EventTrain::build(&[1.02, 5.05]).unwrap();
//!
//! let result = score(0.1, &truth, &estimate).unwrap();
//! assert_eq!(result.matches, vec![(0, 0), (2, 1)]);
//! assert_relative_eq!(result.precision, 1.0);
//! assert_relative_eq!(result.recall, 2.0 / 3.0);
//! assert_relative_eq!(result.score, 0.8, epsilon = 1e-12);
//! ```
use std::ops::Range;

use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::CosmicError;
use crate::event_train::EventTrain;
use crate::kernel::Triangular;
use crate::signal::{synthesize, SamplingGrid};
use crate::{MAX_PULSE_TRAIN_SAMPLES, PULSE_TRAIN_RESOLUTION};

/// The outcome of the comparison between an estimated event train and the true one.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// The harmonic mean of precision and recall.
    pub score: f64,
    /// The fraction of estimated events matched to a true event.
    pub precision: f64,
    /// The fraction of true events matched to an estimated event.
    pub recall: f64,
    /// The matched pairs (position in the true train, position in the estimated train), sorted.
    pub matches: Vec<(usize, usize)>,
    /// Both trains drawn as triangular pulse trains on a shared grid, for comparison.
    pub pulse_trains: PulseTrains,
}

/// Two event trains convolved with a triangular pulse and sampled on the same grid.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct PulseTrains {
    /// The sample times.
    pub times: Vec<f64>,
    /// The true pulse train.
    pub truth: Vec<f64>,
    /// The estimated pulse train.
    pub estimate: Vec<f64>,
}

impl PulseTrains {
    /// Draw both trains with a triangular pulse of half-width `width`.
    /// The grid covers all the pulses, with `PULSE_TRAIN_RESOLUTION` samples per half-width unless it gets too long.
    pub fn build(
        width: f64,
        truth: &EventTrain,
        estimate: &EventTrain,
    ) -> Result<Self, CosmicError> {
        let first = truth.first().into_iter().chain(estimate.first()).reduce(f64::min);
        let last = truth.last().into_iter().chain(estimate.last()).reduce(f64::max);
        let (first, last) = match (first, last) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(PulseTrains::default()),
        };

        let span = last - first + 2.0 * width;
        let mut step = width / PULSE_TRAIN_RESOLUTION as f64;
        if span / step + 2.0 > MAX_PULSE_TRAIN_SAMPLES as f64 {
            step = span / (MAX_PULSE_TRAIN_SAMPLES - 2) as f64;
            debug!(
                "Pulse trains over {} time units are coarsened to a step of {}",
                span, step
            );
        }

        let grid = SamplingGrid::build(step, first - width, last + width + step)?;
        let pulse = Triangular::build(width)?;

        Ok(PulseTrains {
            times: grid.times(),
            truth: synthesize(&grid, truth, &pulse).values().to_vec(),
            estimate: synthesize(&grid, estimate, &pulse).values().to_vec(),
        })
    }
}

/// Compare the estimated event train to the true one, with the prescribed matching tolerance.
///
/// Policy for empty trains: without true events, the recall is 1; without estimated events, the precision is 1.
/// Two empty trains therefore agree perfectly, with a score of 1.
///
/// The function returns an error if the width is not positive.
pub fn score(
    width: f64,
    truth: &EventTrain,
    estimate: &EventTrain,
) -> Result<MatchResult, CosmicError> {
    if !(width.is_finite() && width > 0.0) {
        return Err(CosmicError::InvalidParameter(format!(
            "the metric width must be positive, got {}",
            width
        )));
    }

    let matches = match_events(width, truth.times(), estimate.times());

    let recall = match truth.is_empty() {
        true => 1.0,
        false => matches.len() as f64 / truth.len() as f64,
    };
    let precision = match estimate.is_empty() {
        true => 1.0,
        false => matches.len() as f64 / estimate.len() as f64,
    };
    let score = match precision + recall > 0.0 {
        true => 2.0 * precision * recall / (precision + recall),
        false => 0.0,
    };

    debug!(
        "{} matches, {} true and {} estimated events (width {}): P={}, R={}, score={}",
        matches.len(),
        truth.len(),
        estimate.len(),
        width,
        precision,
        recall,
        score
    );

    Ok(MatchResult {
        score,
        precision,
        recall,
        matches,
        pulse_trains: PulseTrains::build(width, truth, estimate)?,
    })
}

/// Returns the matched pairs of a maximum matching, see the module documentation for the tie-breaking rules.
fn match_events(width: f64, truth: &[f64], estimate: &[f64]) -> Vec<(usize, usize)> {
    clusters(width, truth, estimate)
        .into_iter()
        .filter(|(truth_range, estimate_range)| {
            !truth_range.is_empty() && !estimate_range.is_empty()
        })
        .flat_map(|(truth_range, estimate_range)| {
            trace!(
                "Matching cluster of true events {:?} and estimated events {:?}",
                truth_range,
                estimate_range
            );
            match_cluster(width, truth, estimate, truth_range, estimate_range)
        })
        .collect()
}

/// Split the merged timeline into independent clusters, i.e., where consecutive events are more than `width` apart.
/// No candidate pair crosses the border of a cluster.
fn clusters(width: f64, truth: &[f64], estimate: &[f64]) -> Vec<(Range<usize>, Range<usize>)> {
    let mut clusters = vec![];
    let (mut truth_start, mut estimate_start) = (0, 0);
    let (mut truth_end, mut estimate_end) = (0, 0);
    let mut prev_time: Option<f64> = None;

    let timeline = truth
        .iter()
        .map(|t| (*t, true))
        .merge_by(estimate.iter().map(|t| (*t, false)), |a, b| a.0 <= b.0);

    for (time, is_truth) in timeline {
        if let Some(prev_time) = prev_time {
            if time - prev_time > width {
                clusters.push((truth_start..truth_end, estimate_start..estimate_end));
                (truth_start, estimate_start) = (truth_end, estimate_end);
            }
        }
        match is_truth {
            true => truth_end += 1,
            false => estimate_end += 1,
        }
        prev_time = Some(time);
    }

    if prev_time.is_some() {
        clusters.push((truth_start..truth_end, estimate_start..estimate_end));
    }
    clusters
}

/// The best matching of a prefix: the number of pairs, then their total time offset.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Value {
    count: usize,
    cost: f64,
}

impl Value {
    const ZERO: Value = Value {
        count: 0,
        cost: 0.0,
    };

    fn is_better_than(&self, other: &Value) -> bool {
        self.count > other.count || (self.count == other.count && self.cost < other.cost)
    }

    fn with_pair(&self, offset: f64) -> Value {
        Value {
            count: self.count + 1,
            cost: self.cost + offset,
        }
    }
}

/// The last decision of the best matching of a prefix.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    SkipTruth,
    Pair,
    SkipEstimate,
}

/// The best matchings of `truth[..=i]` with the estimate prefixes `estimate[..j]`, for `j` in `start..=end`.
///
/// Below the band, the true event `i` has no candidate and the best matching is the one of `truth[..i]`. Above it, no
/// candidate of `truth[..=i]` is left and the best matching is the one at `end`.
struct Band {
    start: usize,
    cells: Vec<(Value, Step)>,
}

impl Band {
    fn end(&self) -> usize {
        self.start + self.cells.len() - 1
    }
}

/// Returns the row and column of the cell holding the best matching of `truth[..i]` and `estimate[..j]`, or `None` for
/// the empty matching of `truth[..0]`.
fn locate(bands: &[Band], mut i: usize, j: usize) -> Option<(usize, usize)> {
    while i > 0 {
        let band = &bands[i - 1];
        if j >= band.start {
            return Some((i, j.min(band.end())));
        }
        i -= 1;
    }
    None
}

fn value_at(bands: &[Band], i: usize, j: usize) -> Value {
    match locate(bands, i, j) {
        Some((i, j)) => {
            let band = &bands[i - 1];
            band.cells[j - band.start].0
        }
        None => Value::ZERO,
    }
}

/// Returns the best matching of a cluster.
///
/// With windows of equal width, crossing pairs can always be uncrossed without losing a pair or increasing the total
/// offset, so it is enough to search among non-crossing matchings, by dynamic programming on prefixes. Each true event
/// only keeps the prefixes ending around its candidates, so memory grows with the number of candidate pairs.
fn match_cluster(
    width: f64,
    truth: &[f64],
    estimate: &[f64],
    truth_range: Range<usize>,
    estimate_range: Range<usize>,
) -> Vec<(usize, usize)> {
    let truth = &truth[truth_range.clone()];
    let estimate = &estimate[estimate_range.clone()];

    // bands[i - 1] holds the prefixes of truth[..i]
    let mut bands: Vec<Band> = Vec::with_capacity(truth.len());
    for (i, t) in (1..).zip(truth.iter()) {
        // candidates of t are estimate[lo..hi], with offsets computed as in the pair test
        let lo = estimate.partition_point(|e| *e < *t && t - e > width);
        let hi = estimate.partition_point(|e| *e <= *t || e - t <= width);
        let start = lo.saturating_sub(1);

        let mut cells: Vec<(Value, Step)> = Vec::with_capacity(hi + 1 - start);
        for j in start..=hi {
            // Candidates are ordered by preference: keeping earlier true events paired comes first
            let mut best = (value_at(&bands, i - 1, j), Step::SkipTruth);
            if j > 0 {
                let offset = (t - estimate[j - 1]).abs();
                if offset <= width {
                    let paired = value_at(&bands, i - 1, j - 1).with_pair(offset);
                    if paired.is_better_than(&best.0) {
                        best = (paired, Step::Pair);
                    }
                }
            }
            if j > start {
                let skipped = cells[j - 1 - start].0;
                if skipped.is_better_than(&best.0) {
                    best = (skipped, Step::SkipEstimate);
                }
            }
            cells.push(best);
        }
        bands.push(Band { start, cells });
    }

    let mut pairs = vec![];
    let mut cell = locate(&bands, truth.len(), estimate.len());
    while let Some((i, j)) = cell {
        let band = &bands[i - 1];
        cell = match band.cells[j - band.start].1 {
            Step::SkipTruth => locate(&bands, i - 1, j),
            Step::Pair => {
                pairs.push((truth_range.start + i - 1, estimate_range.start + j - 1));
                locate(&bands, i - 1, j - 1)
            }
            Step::SkipEstimate => locate(&bands, i, j - 1),
        };
    }
    pairs.reverse();
    pairs
}
