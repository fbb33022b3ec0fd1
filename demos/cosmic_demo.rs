use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use rand::rngs::StdRng;
use rand::SeedableRng;

use rusty_cosmic::crb::compute_crb;
use rusty_cosmic::error::CosmicError;
use rusty_cosmic::kernel::BiExponential;
use rusty_cosmic::sampler::{add_noise, rand_estimate, rand_event_train};
use rusty_cosmic::score::score;
use rusty_cosmic::signal::{synthesize, SamplingGrid};
use rusty_cosmic::width::width_from_crb;

#[derive(Parser, Debug)]
struct Args {
    /// The seed used for spike sampling, noise and estimate simulation
    #[arg(long, default_value = "1")]
    seed: u64,
    /// The decay rate of the pulse
    #[arg(long, default_value = "3.18")]
    alpha: f64,
    /// The rise rate of the pulse
    #[arg(long, default_value = "34.49")]
    gamma: f64,
    /// The pulse amplitude
    #[arg(short = 'A', long, default_value = "1.0")]
    amplitude: f64,
    /// The sampling period
    #[arg(short = 'T', long, default_value = "0.08")]
    period: f64,
    /// The start of the recording
    #[arg(long, default_value = "0.0")]
    start: f64,
    /// The end of the recording
    #[arg(long, default_value = "30.0")]
    end: f64,
    /// The spike rate
    #[arg(long, default_value = "1.0")]
    spike_rate: f64,
    /// The noise standard deviation
    #[arg(long, default_value = "0.25")]
    sigma: f64,
    /// The fraction of true spikes in the estimate
    #[arg(long, default_value = "0.8")]
    detection_ratio: f64,
    /// The jitter of the estimated spikes
    #[arg(long, default_value = "0.03")]
    jitter: f64,
    /// Log the samples of the signals and pulse trains
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<(), CosmicError> {
    let args = Args::parse();

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build();
    let level = match args.verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .map_err(|e| CosmicError::InvalidConfig(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| CosmicError::InvalidConfig(e.to_string()))?;

    log::info!("{:?}", args);
    let mut rng = StdRng::seed_from_u64(args.seed);

    // Simulate the fluorescence signal
    let grid = SamplingGrid::build(args.period, args.start, args.end)?;
    let kernel = BiExponential::build(args.alpha, args.gamma, args.amplitude)?;
    let truth = rand_event_train(args.spike_rate, args.start, args.end, &mut rng)?;
    let signal = synthesize(&grid, &truth, &kernel);
    let noisy_signal = add_noise(&signal, args.sigma, &mut rng)?;
    log::info!(
        "Signal simulation: done! {} spikes over {} samples",
        truth.len(),
        signal.len()
    );

    // Simulate the spike estimates around a subset of the true spikes
    let estimate = rand_estimate(&truth, args.detection_ratio, args.jitter, &mut rng)?;
    log::info!("Estimate simulation: done! {} estimated spikes", estimate.len());

    // Compute the metric
    let crb = compute_crb(
        args.period,
        args.amplitude,
        args.sigma * args.sigma,
        args.alpha,
        args.gamma,
    )?;
    let width = width_from_crb(crb)?;
    log::info!("CRB is {:.3e} and metric width is {:.4}", crb, width);

    let result = score(width, &truth, &estimate)?;
    log::info!(
        "CosMIC score is: {:.3}. Precision is: {:.3}. Recall is: {:.3}.",
        result.score,
        result.precision,
        result.recall
    );

    for (time, (clean, noisy)) in signal
        .times()
        .iter()
        .zip(signal.values().iter().zip(noisy_signal.values()))
    {
        log::debug!("signal {:.3} {:.5} {:.5}", time, clean, noisy);
    }
    for (time, (y, y_hat)) in result.pulse_trains.times.iter().zip(
        result
            .pulse_trains
            .truth
            .iter()
            .zip(result.pulse_trains.estimate.iter()),
    ) {
        log::debug!("pulse {:.4} {:.3} {:.3}", time, y, y_hat);
    }

    Ok(())
}
