//! Serializable description of a training run.

use crate::activator::{ActivationFunction, Activator};
use crate::cost::Cost;
use crate::error::{Error, Result};
use crate::feed_forward::NeuronNetwork;
use crate::gradient_descent::DescentMode;
use crate::initializer::Initializer;
use crate::trainer::{Logging, NetworkTrainer, Sample};

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Everything needed to set up a network and its trainer, apart from the
/// data itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub seed: u64,
    /// Node counts of the hidden layers. Input and output counts come from
    /// the data.
    pub hidden_layers: Vec<usize>,
    pub mini_batch_size: usize,
    /// The activation function of every layer, unless `layer_activators` is
    /// given.
    pub activator: Activator,
    /// One activation function per layer, hidden layers first and the output
    /// layer last.
    pub layer_activators: Option<Vec<Activator>>,
    pub cost: Cost,
    pub descent: DescentMode,
    pub initializer: Initializer,
    pub workers: usize,
    pub logging: Logging,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            seed: 12345,
            hidden_layers: vec![20, 20],
            mini_batch_size: 10,
            activator: Activator::default(),
            layer_activators: None,
            cost: Cost::default(),
            descent: DescentMode::default(),
            initializer: Initializer::default(),
            workers: 1,
            logging: Logging::default(),
        }
    }
}

impl TrainingConfig {
    /// Creates a config with the default values:
    ///
    /// * Seed 12345.
    /// * Two hidden layers of 20 nodes.
    /// * Mini-batches of 10 samples.
    /// * Logistic activation and quadratic cost.
    /// * A constant learning rate of 0.01.
    /// * Gaussian starting values with mean 0 and standard deviation 1.
    /// * Training on the calling thread, without logs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfiguration(format!("bad training config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfiguration(format!("cannot serialize config: {}", e)))
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn hidden_layers(mut self, sizes: &[usize]) -> Self {
        self.hidden_layers = sizes.to_vec();
        self
    }

    pub fn mini_batch_size(mut self, size: usize) -> Self {
        self.mini_batch_size = size;
        self
    }

    /// Sets the activation function to use in every layer.
    pub fn activator(mut self, activator: Activator) -> Self {
        self.activator = activator;
        self
    }

    /// Sets a separate activation function for each layer, hidden layers
    /// first and the output layer last.
    pub fn layer_activators(mut self, activators: &[Activator]) -> Self {
        self.layer_activators = Some(activators.to_vec());
        self
    }

    pub fn cost(mut self, cost: Cost) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the gradient descent rule, including its learning rate.
    pub fn descent(mut self, descent: DescentMode) -> Self {
        self.descent = descent;
        self
    }

    pub fn initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = initializer;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Verifies that every setting is usable, returning an error if
    /// something is wrong.
    pub fn validate(&self) -> Result<()> {
        if self.mini_batch_size == 0 {
            return Err(Error::InvalidConfiguration(
                "mini-batch size must be at least 1".into(),
            ));
        }
        if self.workers == 0 {
            return Err(Error::InvalidConfiguration(
                "at least one worker is required".into(),
            ));
        }
        if self.hidden_layers.iter().any(|&n| n == 0) {
            return Err(Error::InvalidConfiguration(
                "hidden layers must have at least one node".into(),
            ));
        }
        if let Some(activators) = &self.layer_activators {
            if activators.len() != self.hidden_layers.len() + 1 {
                return Err(Error::InvalidConfiguration(format!(
                    "{} layer activators given for {} layers",
                    activators.len(),
                    self.hidden_layers.len() + 1
                )));
            }
        }
        self.descent.validate()?;
        self.initializer.validate()
    }

    /// Returns a generator seeded from `seed`.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// Returns the full list of layer sizes for the given data shape.
    pub fn layer_sizes(&self, n_inputs: usize, n_outputs: usize) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(n_inputs);
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(n_outputs);
        sizes
    }

    /// Builds a freshly initialized network and a trainer for it.
    ///
    /// Starting values are drawn from `self.rng()`, so the same config
    /// always yields the same network.
    pub fn build(
        &self,
        n_inputs: usize,
        n_outputs: usize,
        training: Vec<Sample>,
        validation: Vec<Sample>,
    ) -> Result<NetworkTrainer> {
        self.validate()?;
        let activation: Arc<dyn ActivationFunction> = Arc::new(self.activator);
        let mut network = NeuronNetwork::new(
            &mut self.rng(),
            activation,
            &self.initializer,
            &self.layer_sizes(n_inputs, n_outputs),
        )?;
        if let Some(activators) = &self.layer_activators {
            for (layer, &activator) in activators.iter().enumerate() {
                network.set_activation(layer, Arc::new(activator))?;
            }
        }
        let mut trainer =
            NetworkTrainer::new(network, Box::new(self.cost), self.descent.build()?, training)?
                .workers(self.workers)
                .logging(self.logging);
        trainer.set_validation_samples(validation)?;
        Ok(trainer)
    }
}
