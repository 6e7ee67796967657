//! Starting values for a layer's weights and biases.

use crate::error::{Error, Result};
use crate::matrix::Mat;
use crate::vector::Vector;

use rand::RngCore;
use rand_distr::{Distribution, Normal};
use std::fmt;

/// Fills a layer's weight matrix and bias vector with starting values.
pub trait ValueInitializer: fmt::Debug {
    /// Overwrites every entry of `weights` and `biases`.
    ///
    /// `layer_index` is the 1-based position of the layer in the network
    /// (layer 0 is the input layer, which has no parameters), for
    /// initializers that depend on depth.
    fn init(
        &self,
        rng: &mut dyn RngCore,
        weights: &mut Mat,
        biases: &mut Vector,
        layer_index: usize,
    ) -> Result<()>;
}

/// Value initializer types.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    /// Independent samples from `Normal(mean, std_dev)`. Biases are drawn
    /// first, then weights in row order.
    Gaussian { mean: f64, std_dev: f64 },
    /// Every weight and bias set to zero.
    Zeros,
}

impl Initializer {
    pub const NAMES: [&'static str; 2] = ["Gaussian", "Zeros"];

    pub fn index(self) -> usize {
        match self {
            Initializer::Gaussian { .. } => 0,
            Initializer::Zeros => 1,
        }
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Creates the variant at `index` with its default parameters.
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Initializer::default()),
            1 => Ok(Initializer::Zeros),
            _ => Err(Error::InvalidConfiguration(format!(
                "unknown value initializer index {}",
                index
            ))),
        }
    }

    /// Checks the variant's parameters.
    pub fn validate(&self) -> Result<()> {
        if let Initializer::Gaussian { mean, std_dev } = *self {
            normal(mean, std_dev)?;
        }
        Ok(())
    }
}

impl Default for Initializer {
    fn default() -> Self {
        Initializer::Gaussian {
            mean: 0.0,
            std_dev: 1.0,
        }
    }
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    if !mean.is_finite() {
        return Err(Error::InvalidConfiguration(format!(
            "gaussian mean must be finite, got {}",
            mean
        )));
    }
    // `Normal::new` accepts a negative deviation and mirrors the distribution.
    if !(std_dev >= 0.0) {
        return Err(Error::InvalidConfiguration(format!(
            "gaussian std_dev must not be negative, got {}",
            std_dev
        )));
    }
    Normal::new(mean, std_dev).map_err(|e| {
        Error::InvalidConfiguration(format!("gaussian std_dev {}: {}", std_dev, e))
    })
}

impl ValueInitializer for Initializer {
    fn init(
        &self,
        rng: &mut dyn RngCore,
        weights: &mut Mat,
        biases: &mut Vector,
        _layer_index: usize,
    ) -> Result<()> {
        match *self {
            Initializer::Gaussian { mean, std_dev } => {
                let distribution = normal(mean, std_dev)?;
                for b in biases.iter_mut() {
                    *b = distribution.sample(rng);
                }
                for w in weights.as_mut_slice() {
                    *w = distribution.sample(rng);
                }
            }
            Initializer::Zeros => {
                for b in biases.iter_mut() {
                    *b = 0.0;
                }
                for w in weights.as_mut_slice() {
                    *w = 0.0;
                }
            }
        }
        Ok(())
    }
}
