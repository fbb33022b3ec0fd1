use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use rusty_cosmic::crb::{compute_crb, compute_crb_with_phase, SamplePhase};
use rusty_cosmic::error::CosmicError;
use rusty_cosmic::event_train::EventTrain;
use rusty_cosmic::kernel::{BiExponential, Kernel};
use rusty_cosmic::metric::SensorModel;
use rusty_cosmic::sampler::{add_noise, rand_estimate, rand_event_train};
use rusty_cosmic::score::score;
use rusty_cosmic::signal::{synthesize, SamplingGrid};
use rusty_cosmic::width::width_from_crb;

const SEED: u64 = 1;
const ALPHA: f64 = 3.18;
const GAMMA: f64 = 34.49;
const PERIOD: f64 = 0.08;
const SIGMA: f64 = 0.25;

#[test]
fn test_full_pipeline() {
    let mut rng = StdRng::seed_from_u64(SEED);

    let truth = rand_event_train(1.0, 0.0, 30.0, &mut rng).unwrap();
    assert!(!truth.is_empty());

    let grid = SamplingGrid::build(PERIOD, 0.0, 30.0).unwrap();
    let kernel = BiExponential::build(ALPHA, GAMMA, 1.0).unwrap();
    let signal = synthesize(&grid, &truth, &kernel);
    let noisy_signal = add_noise(&signal, SIGMA, &mut rng).unwrap();
    assert_eq!(noisy_signal.len(), signal.len());

    let estimate = rand_estimate(&truth, 0.8, 0.03, &mut rng).unwrap();

    let crb = compute_crb(PERIOD, 1.0, SIGMA * SIGMA, ALPHA, GAMMA).unwrap();
    let width = width_from_crb(crb).unwrap();
    let result = score(width, &truth, &estimate).unwrap();

    assert!((0.0..=1.0).contains(&result.score));
    assert!((0.0..=1.0).contains(&result.precision));
    assert!((0.0..=1.0).contains(&result.recall));
    // at most 80% of the true events can be recovered
    assert!(result.recall <= 0.8 + 1.0 / truth.len() as f64);
    assert_eq!(
        result.pulse_trains.times.len(),
        result.pulse_trains.truth.len()
    );

    // the same seed reproduces the same score
    let mut rng = StdRng::seed_from_u64(SEED);
    let truth_2 = rand_event_train(1.0, 0.0, 30.0, &mut rng).unwrap();
    let signal_2 = synthesize(&grid, &truth_2, &kernel);
    let _ = add_noise(&signal_2, SIGMA, &mut rng).unwrap();
    let estimate_2 = rand_estimate(&truth_2, 0.8, 0.03, &mut rng).unwrap();
    assert_eq!(score(width, &truth_2, &estimate_2).unwrap(), result);
}

#[test]
fn test_wider_tolerance_never_loses_matches() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let truth = rand_event_train(2.0, 0.0, 100.0, &mut rng).unwrap();
    let estimate = rand_estimate(&truth, 0.9, 0.05, &mut rng).unwrap();

    let counts = [0.01, 0.02, 0.05, 0.1, 0.2]
        .into_iter()
        .map(|width| score(width, &truth, &estimate).unwrap().matches.len())
        .collect::<Vec<usize>>();
    assert!(counts.windows(2).all(|c| c[0] <= c[1]));
}

#[test]
fn test_matches_are_one_to_one() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let truth = rand_event_train(5.0, 0.0, 50.0, &mut rng).unwrap();
    let estimate = rand_event_train(5.0, 0.0, 50.0, &mut rng).unwrap();

    let result = score(0.1, &truth, &estimate).unwrap();
    let (true_ids, est_ids): (Vec<usize>, Vec<usize>) = result.matches.iter().copied().unzip();
    assert!(true_ids.windows(2).all(|w| w[0] < w[1]));
    assert!(est_ids.windows(2).all(|w| w[0] < w[1]));
    assert!(result
        .matches
        .iter()
        .all(|&(i, j)| (truth.times()[i] - estimate.times()[j]).abs() <= 0.1));
}

#[test]
fn test_single_event_reproduces_kernel() {
    let grid = SamplingGrid::build(PERIOD, 0.0, 10.0).unwrap();
    let kernel = BiExponential::build(ALPHA, GAMMA, 2.5).unwrap();
    let truth = EventTrain::build(&[3.0]).unwrap();
    let signal = synthesize(&grid, &truth, &kernel);

    for (time, value) in signal.times().into_iter().zip(signal.values()) {
        match time < 3.0 {
            true => assert_eq!(*value, 0.0),
            false => assert_relative_eq!(*value, kernel.eval(time - 3.0)),
        }
    }
}

#[test]
fn test_crb_phase_conventions() {
    // the rise is shorter than the period, so samples aligned with the event miss it, while a random
    // phase catches it on average
    let aligned = compute_crb(PERIOD, 1.0, SIGMA * SIGMA, ALPHA, GAMMA).unwrap();
    let uniform =
        compute_crb_with_phase(PERIOD, 1.0, SIGMA * SIGMA, ALPHA, GAMMA, SamplePhase::Uniform)
            .unwrap();
    assert!(aligned > uniform);

    // both converge to the same bound for a fine sampling
    let aligned = compute_crb(1e-5, 1.0, SIGMA * SIGMA, ALPHA, GAMMA).unwrap();
    let uniform =
        compute_crb_with_phase(1e-5, 1.0, SIGMA * SIGMA, ALPHA, GAMMA, SamplePhase::Uniform)
            .unwrap();
    assert_relative_eq!(aligned, uniform, max_relative = 1e-3);
}

#[test]
fn test_errors_propagate_through_model() {
    let kernel = BiExponential::build(ALPHA, GAMMA, 1.0).unwrap();
    let model = SensorModel::build(kernel, PERIOD, SIGMA * SIGMA, SamplePhase::Aligned).unwrap();

    assert!(matches!(
        EventTrain::build(&[2.0, 1.0]),
        Err(CosmicError::MalformedEventTrain(_))
    ));
    assert!(matches!(
        compute_crb(PERIOD, 0.0, SIGMA * SIGMA, ALPHA, GAMMA),
        Err(CosmicError::DegenerateModel(_))
    ));

    let truth = EventTrain::build(&[1.0, 2.0]).unwrap();
    let result = model.score(&truth, &EventTrain::new()).unwrap();
    assert_eq!((result.precision, result.recall, result.score), (1.0, 0.0, 0.0));
}
