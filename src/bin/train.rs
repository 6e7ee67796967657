use log::{error, info};
use neuronet::config::TrainingConfig;
use neuronet::feed_forward::NeuronNetwork;
use neuronet::gradient_descent::DescentMode;
use neuronet::trainer::{Logging, Sample};
use neuronet::{Error, Result};
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::env;
use std::fs;
use std::process;

const DEFAULT_EPOCHS: usize = 20;

/// Mixed into the config seed so the data does not replay the stream the
/// network's starting values were drawn from.
const DATA_SEED: u64 = 0x5eed_da7a;

/// Points scattered around the unit circle, labelled by whether they fall in
/// the first/third or second/fourth quadrant.
fn generate_data<R: Rng>(rng: &mut R, num_samples: usize) -> Result<Vec<Sample>> {
    let radians = Uniform::new(0.0, 2.0 * std::f64::consts::PI);
    let noise = Normal::new(0.0, 0.1)
        .map_err(|e| Error::InvalidConfiguration(format!("noise distribution: {}", e)))?;

    let mut data = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let theta = radians.sample(rng);
        let point = vec![theta.cos() + noise.sample(rng), theta.sin() + noise.sample(rng)];
        let class = if point[0] * point[1] > 0.0 {
            vec![1.0, 0.0]
        } else {
            vec![0.0, 1.0]
        };
        data.push(Sample::new(point, class));
    }
    Ok(data)
}

/// Returns how many samples the network classifies correctly.
fn score(network: &NeuronNetwork, samples: &[Sample]) -> Result<usize> {
    let mut num_correct = 0;
    for sample in samples {
        let output = network.evaluate(&sample.input)?;
        let class = if output[0] > output[1] { 0 } else { 1 };
        if sample.expected[class] == 1.0 {
            num_correct += 1;
        }
    }
    Ok(num_correct)
}

fn load_config(path: Option<String>) -> Result<TrainingConfig> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .map_err(|e| Error::DataUnavailable(format!("{}: {}", path, e)))?;
            TrainingConfig::from_json(&json)
        }
        None => Ok(default_config()),
    }
}

fn default_config() -> TrainingConfig {
    TrainingConfig::new()
        .hidden_layers(&[5, 5])
        .descent(DescentMode::Constant { learning_rate: 0.5 })
        .logging(Logging::Epochs)
}

fn data_rng(config: &TrainingConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed ^ DATA_SEED)
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let config = load_config(args.next())?;
    let epochs = match args.next() {
        Some(arg) => arg
            .parse()
            .map_err(|e| Error::InvalidConfiguration(format!("epoch count {:?}: {}", arg, e)))?,
        None => DEFAULT_EPOCHS,
    };

    let mut data_rng = data_rng(&config);
    let training_data = generate_data(&mut data_rng, 10_000)?;
    let validation_data = generate_data(&mut data_rng, 1_000)?;
    let mut trainer = config.build(2, 2, training_data, validation_data)?;
    let mut rng = config.rng();
    info!("training {:?} for {} epochs", trainer.network().layer_sizes(), epochs);

    for _ in 0..epochs {
        let summary = trainer.run_epoch(config.mini_batch_size, &mut rng)?;
        println!(
            "epoch {}: training cost {:.6}, validation cost {:.6}",
            summary.epoch,
            summary.mean_cost,
            trainer.validate()?
        );
    }

    println!();
    for (name, samples) in &[
        ("Training", trainer.training_samples()),
        ("Validation", trainer.validation_samples()),
    ] {
        println!(
            "{} set results: {} of {} correct",
            name,
            score(trainer.network(), samples)?,
            samples.len()
        );
    }
    if let (Some(min), Some(max)) = (trainer.history().min(), trainer.history().max()) {
        println!("mini-batch cost ranged from {:.6} to {:.6}", min, max);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}
