//! Utilities for training neural networks.
//!
//! A `NetworkTrainer` owns a network and everything needed to improve it:
//! the cost function, the gradient descent rule, and the training and
//! validation samples. Training is driven from outside one epoch at a time;
//! each epoch visits every training sample exactly once, in randomly drawn
//! mini-batches.

use crate::cost::CostFunction;
use crate::error::{check_len, Error, Result};
use crate::feed_forward::{NetworkEdit, NeuronNetwork, Scratch};
use crate::gradient_descent::GradientDescent;
use crate::gradients::Gradients;
use crate::history::CostHistory;
use crate::initializer::ValueInitializer;
use crate::utils::ZeroOut;
use crate::vector::Vector;

use log::info;
use rand::{Rng, RngCore};
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// An input paired with the output the network should produce for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub input: Vector,
    pub expected: Vector,
}

impl Sample {
    pub fn new<I, O>(input: I, expected: O) -> Self
    where
        I: Into<Vector>,
        O: Into<Vector>,
    {
        Sample {
            input: input.into(),
            expected: expected.into(),
        }
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be logged after every epoch
    Epochs,
    /// A summary will be logged after every epoch, and the cost after every
    /// `n` mini-batches
    Iterations(usize),
}

impl Default for Logging {
    fn default() -> Self {
        Logging::Silent
    }
}

impl Logging {
    /// Performs logging after mini-batch `iteration` of `epoch`.
    fn iteration(&self, epoch: usize, iteration: usize, cost: f64) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && iteration % freq == 0 {
                info!("Epoch {} iteration {}:\tcost={}", epoch, iteration, cost);
            }
        }
    }

    /// Performs logging at the end of an epoch.
    fn epoch(&self, summary: &EpochSummary, elapsed: Duration) {
        if let Logging::Silent = self {
            return;
        }
        info!(
            "Epoch {} ran {} iterations in {:.3} seconds, mean cost {}",
            summary.epoch,
            summary.iterations,
            elapsed.as_secs_f64(),
            summary.mean_cost
        );
    }
}

/// What happened during one call to `NetworkTrainer::run_epoch`.
#[derive(Clone, Debug, PartialEq)]
pub struct EpochSummary {
    /// The number of completed epochs, including this one.
    pub epoch: usize,
    /// The number of mini-batches processed.
    pub iterations: usize,
    /// The size of each mini-batch, in processing order.
    pub batch_sizes: Vec<usize>,
    /// The mean per-sample cost of each mini-batch, in processing order.
    pub batch_costs: Vec<f64>,
    /// The mean per-sample cost over the whole epoch.
    pub mean_cost: f64,
}

/// Trains a `NeuronNetwork` with mini-batch gradient descent.
#[derive(Debug)]
pub struct NetworkTrainer {
    network: NeuronNetwork,
    cost: Box<dyn CostFunction>,
    descent: Box<dyn GradientDescent>,
    training: Vec<Sample>,
    validation: Vec<Sample>,
    n_epochs: usize,
    n_iterations: usize,
    workers: usize,
    logging: Logging,
    history: CostHistory,
    scratch: Option<Scratch>,
    gradients: Option<Gradients>,
}

impl NetworkTrainer {
    /// Creates a new trainer with zeroed counters.
    ///
    /// Fails if any training sample does not fit the network.
    pub fn new(
        network: NeuronNetwork,
        cost: Box<dyn CostFunction>,
        descent: Box<dyn GradientDescent>,
        training: Vec<Sample>,
    ) -> Result<Self> {
        check_samples(&network, &training)?;
        Ok(NetworkTrainer {
            network,
            cost,
            descent,
            training,
            validation: Vec::new(),
            n_epochs: 0,
            n_iterations: 0,
            workers: 1,
            logging: Logging::Silent,
            history: CostHistory::new(),
            scratch: None,
            gradients: None,
        })
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets how many threads share the per-sample work of each mini-batch.
    /// `1` (the default) keeps training on the calling thread.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn network(&self) -> &NeuronNetwork {
        &self.network
    }

    /// Gives up the trainer, returning the trained network.
    pub fn into_network(self) -> NeuronNetwork {
        self.network
    }

    pub fn cost_function(&self) -> &dyn CostFunction {
        &*self.cost
    }

    pub fn n_epochs(&self) -> usize {
        self.n_epochs
    }

    /// Returns the number of mini-batches processed in the current epoch.
    pub fn n_iterations(&self) -> usize {
        self.n_iterations
    }

    pub fn history(&self) -> &CostHistory {
        &self.history
    }

    pub fn reset_history(&mut self) {
        self.history.reset();
    }

    pub fn training_samples(&self) -> &[Sample] {
        &self.training
    }

    pub fn validation_samples(&self) -> &[Sample] {
        &self.validation
    }

    pub fn set_training_samples(&mut self, samples: Vec<Sample>) -> Result<()> {
        check_samples(&self.network, &samples)?;
        self.training = samples;
        Ok(())
    }

    pub fn set_validation_samples(&mut self, samples: Vec<Sample>) -> Result<()> {
        check_samples(&self.network, &samples)?;
        self.validation = samples;
        Ok(())
    }

    pub fn set_cost_function(&mut self, cost: Box<dyn CostFunction>) {
        self.cost = cost;
    }

    pub fn set_gradient_descent(&mut self, descent: Box<dyn GradientDescent>) {
        self.descent = descent;
    }

    /// Applies a structural edit to the network.
    ///
    /// Any per-layer buffers sized for the old shape are dropped and the
    /// iteration counter restarts. Sample sets are not re-checked here; an
    /// epoch started on samples that no longer fit fails up front.
    pub fn apply_edit(&mut self, edit: NetworkEdit) -> Result<()> {
        self.network.apply(edit)?;
        self.scratch = None;
        self.gradients = None;
        self.n_iterations = 0;
        Ok(())
    }

    /// Re-draws every network parameter.
    pub fn reinitialize(
        &mut self,
        rng: &mut dyn RngCore,
        initializer: &dyn ValueInitializer,
    ) -> Result<()> {
        self.network.initialize(rng, initializer)
    }

    /// Runs one epoch: every training sample is used exactly once, in
    /// mini-batches of `mini_batch_size` drawn at random without
    /// replacement. The last batch holds whatever is left and may be
    /// smaller.
    pub fn run_epoch<R>(&mut self, mini_batch_size: usize, rng: &mut R) -> Result<EpochSummary>
    where
        R: Rng + ?Sized,
    {
        if mini_batch_size == 0 {
            return Err(Error::InvalidConfiguration(
                "mini-batch size must be at least 1".into(),
            ));
        }
        if self.training.is_empty() {
            return Err(Error::InvalidConfiguration(
                "cannot run an epoch without training samples".into(),
            ));
        }
        check_samples(&self.network, &self.training)?;

        let start_time = Instant::now();
        self.n_iterations = 0;
        // The samples are moved out while the network trains on them.
        let training = std::mem::take(&mut self.training);
        let batches = self.run_batches(&training, mini_batch_size, rng);
        self.training = training;
        let (batch_sizes, batch_costs, total_cost) = batches?;
        self.n_epochs += 1;

        let summary = EpochSummary {
            epoch: self.n_epochs,
            iterations: self.n_iterations,
            batch_sizes,
            batch_costs,
            mean_cost: total_cost / self.training.len() as f64,
        };
        self.logging.epoch(&summary, start_time.elapsed());
        Ok(summary)
    }

    /// Trains on every sample of `training` in random mini-batches, returning
    /// the batch sizes, the batch costs and the sample-weighted total cost.
    fn run_batches<R>(
        &mut self,
        training: &[Sample],
        mini_batch_size: usize,
        rng: &mut R,
    ) -> Result<(Vec<usize>, Vec<f64>, f64)>
    where
        R: Rng + ?Sized,
    {
        let mut sampler = BatchSampler::new(training.len());
        let mut batch = Vec::with_capacity(mini_batch_size);
        let mut batch_sizes = Vec::new();
        let mut batch_costs = Vec::new();
        let mut total_cost = 0.0;
        while sampler.next_batch(mini_batch_size, rng, &mut batch) {
            let samples: Vec<&Sample> = batch.iter().map(|&i| &training[i]).collect();
            let cost = self.train_batch(&samples)?;
            batch_sizes.push(batch.len());
            batch_costs.push(cost);
            total_cost += cost * batch.len() as f64;
        }
        Ok((batch_sizes, batch_costs, total_cost))
    }

    /// Runs one gradient descent step on `batch`: backpropagates every
    /// sample, averages the derivatives, and updates the network once.
    /// Returns the mean cost of the batch.
    pub fn run_iteration(&mut self, batch: &[Sample]) -> Result<f64> {
        if batch.is_empty() {
            return Err(Error::InvalidConfiguration(
                "cannot run an iteration on an empty batch".into(),
            ));
        }
        check_samples(&self.network, batch)?;
        let samples: Vec<&Sample> = batch.iter().collect();
        self.train_batch(&samples)
    }

    /// Returns the mean cost over the validation samples, without changing
    /// the network.
    pub fn validate(&self) -> Result<f64> {
        self.mean_cost(&self.validation)
    }

    /// Returns the mean cost of the network over `samples`.
    pub fn mean_cost(&self, samples: &[Sample]) -> Result<f64> {
        if samples.is_empty() {
            return Err(Error::InvalidConfiguration(
                "cannot compute the cost of an empty sample set".into(),
            ));
        }
        let mut total = 0.0;
        for sample in samples {
            let output = self.network.evaluate(&sample.input)?;
            total += self.cost.cost(&sample.expected, &output)?;
        }
        Ok(total / samples.len() as f64)
    }

    /// Computes the mean gradients of `batch`, applies them, and records the
    /// batch. Returns the mean cost.
    fn train_batch(&mut self, batch: &[&Sample]) -> Result<f64> {
        let mut gradients = match self.gradients.take() {
            Some(gradients) => gradients,
            None => Gradients::zeros(&self.network),
        };
        let cost = mean_gradients(
            &self.network,
            &*self.cost,
            batch,
            self.workers,
            &mut self.scratch,
            &mut gradients,
        )?;
        self.descent.modify_network(
            &mut self.network,
            self.n_iterations,
            self.n_epochs,
            &gradients,
        )?;
        self.gradients = Some(gradients);
        self.history.push(cost);
        self.logging.iteration(self.n_epochs, self.n_iterations, cost);
        self.n_iterations += 1;
        Ok(cost)
    }
}

/// Fails unless every sample's input and expected output fit `network`.
fn check_samples(network: &NeuronNetwork, samples: &[Sample]) -> Result<()> {
    for sample in samples {
        check_len("sample inputs", network.n_inputs(), sample.input.len())?;
        check_len("sample outputs", network.n_outputs(), sample.expected.len())?;
    }
    Ok(())
}

/// Backpropagates every sample of `batch`, overwriting `gradients` with their
/// mean. Returns the mean cost.
///
/// With more than one worker the batch is split into contiguous chunks, each
/// summed on its own thread with its own buffers; the partial sums are then
/// added in chunk order, so results only depend on the worker count.
fn mean_gradients(
    network: &NeuronNetwork,
    cost: &dyn CostFunction,
    batch: &[&Sample],
    workers: usize,
    scratch: &mut Option<Scratch>,
    gradients: &mut Gradients,
) -> Result<f64> {
    gradients.zero_out();
    let total_cost = if workers > 1 && batch.len() > 1 {
        let chunk_size = (batch.len() + workers - 1) / workers;
        let partials = batch
            .par_chunks(chunk_size)
            .map(|chunk| {
                let mut partial = Gradients::zeros(network);
                let partial_cost =
                    accumulate(network, cost, chunk, &mut network.new_scratch(), &mut partial)?;
                Ok((partial, partial_cost))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut total_cost = 0.0;
        for (partial, partial_cost) in &partials {
            gradients.add_assign_checked(partial)?;
            total_cost += partial_cost;
        }
        total_cost
    } else {
        let scratch = scratch.get_or_insert_with(|| network.new_scratch());
        accumulate(network, cost, batch, scratch, gradients)?
    };

    let n = batch.len() as f64;
    gradients.divide(n);
    Ok(total_cost / n)
}

/// Adds the gradients of `samples` into `gradients`, in order, and returns
/// their summed cost.
fn accumulate(
    network: &NeuronNetwork,
    cost: &dyn CostFunction,
    samples: &[&Sample],
    scratch: &mut Scratch,
    gradients: &mut Gradients,
) -> Result<f64> {
    let mut total_cost = 0.0;
    for sample in samples {
        total_cost +=
            network.backpropagate(&sample.input, &sample.expected, cost, scratch, gradients)?;
    }
    Ok(total_cost)
}

/// Draws mini-batches of sample indices without replacement.
struct BatchSampler {
    unused: Vec<usize>,
}

impl BatchSampler {
    fn new(n_samples: usize) -> Self {
        BatchSampler {
            unused: (0..n_samples).collect(),
        }
    }

    /// Fills `batch` with up to `size` indices picked uniformly at random
    /// from the unused pool. Returns false once the pool is empty.
    fn next_batch<R>(&mut self, size: usize, rng: &mut R, batch: &mut Vec<usize>) -> bool
    where
        R: Rng + ?Sized,
    {
        batch.clear();
        for _ in 0..size.min(self.unused.len()) {
            let i = rng.gen_range(0..self.unused.len());
            batch.push(self.unused.swap_remove(i));
        }
        !batch.is_empty()
    }
}
