//! Parameter update rules.

use crate::error::{Error, Result};
use crate::feed_forward::NeuronNetwork;
use crate::gradients::Gradients;

use log::debug;
use std::fmt;

/// Moves the network towards a lower cost, given the mean cost gradient of
/// a mini-batch.
pub trait GradientDescent: fmt::Debug + Send {
    /// Updates every weight and bias of `network`.
    ///
    /// `iteration` is the mini-batch index within the current epoch and
    /// `epoch` the number of completed epochs. `gradients` must be shaped
    /// like the network; nothing is modified if it is not.
    fn modify_network(
        &mut self,
        network: &mut NeuronNetwork,
        iteration: usize,
        epoch: usize,
        gradients: &Gradients,
    ) -> Result<()>;
}

/// Gradient descent types.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DescentMode {
    /// A constant learning rate.
    Constant { learning_rate: f64 },
    /// Starts at `learning_rate` and halves it whenever two consecutive
    /// gradients point in opposing directions.
    Halving { learning_rate: f64 },
}

impl DescentMode {
    pub const NAMES: [&'static str; 2] = ["Constant", "Halving"];

    pub fn index(self) -> usize {
        match self {
            DescentMode::Constant { .. } => 0,
            DescentMode::Halving { .. } => 1,
        }
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    pub fn learning_rate(self) -> f64 {
        match self {
            DescentMode::Constant { learning_rate } | DescentMode::Halving { learning_rate } => {
                learning_rate
            }
        }
    }

    /// Creates the variant at `index` with the given learning rate.
    pub fn from_index(index: usize, learning_rate: f64) -> Result<Self> {
        match index {
            0 => Ok(DescentMode::Constant { learning_rate }),
            1 => Ok(DescentMode::Halving { learning_rate }),
            _ => Err(Error::InvalidConfiguration(format!(
                "unknown gradient descent index {}",
                index
            ))),
        }
    }

    pub fn validate(self) -> Result<()> {
        let rate = self.learning_rate();
        if rate.is_finite() && rate > 0.0 {
            Ok(())
        } else {
            Err(Error::InvalidConfiguration(format!(
                "learning rate must be positive and finite, got {}",
                rate
            )))
        }
    }

    /// Creates a fresh update rule of this type.
    pub fn build(self) -> Result<Box<dyn GradientDescent>> {
        self.validate()?;
        Ok(match self {
            DescentMode::Constant { learning_rate } => Box::new(ConstantRate::new(learning_rate)),
            DescentMode::Halving { learning_rate } => Box::new(HalvingRate::new(learning_rate)),
        })
    }
}

impl Default for DescentMode {
    fn default() -> Self {
        DescentMode::Constant {
            learning_rate: 0.01,
        }
    }
}

/// `parameter -= rate * derivative` for every weight and bias.
fn descend(network: &mut NeuronNetwork, rate: f64, gradients: &Gradients) -> Result<()> {
    gradients.check_shape(network)?;
    for ((weights, biases), (weight_gradient, bias_gradient)) in network
        .parameters_mut()
        .zip(gradients.weights.iter().zip(&gradients.biases))
    {
        for (b, d) in biases.iter_mut().zip(bias_gradient.iter()) {
            *b -= rate * d;
        }
        for (w, d) in weights.iter_mut().zip(weight_gradient.as_slice()) {
            *w -= rate * d;
        }
    }
    Ok(())
}

/// A simple gradient descent algorithm with a constant learning rate.
#[derive(Clone, Debug)]
pub struct ConstantRate {
    pub learning_rate: f64,
}

impl ConstantRate {
    pub fn new(learning_rate: f64) -> Self {
        ConstantRate { learning_rate }
    }
}

impl GradientDescent for ConstantRate {
    fn modify_network(
        &mut self,
        network: &mut NeuronNetwork,
        _iteration: usize,
        _epoch: usize,
        gradients: &Gradients,
    ) -> Result<()> {
        descend(network, self.learning_rate, gradients)
    }
}

/// Gradient descent that halves its learning rate whenever the dot product
/// of the previous and current gradients is negative, i.e. when the last
/// step overshot.
#[derive(Clone, Debug)]
pub struct HalvingRate {
    learning_rate: f64,
    previous: Option<Gradients>,
}

impl HalvingRate {
    pub fn new(learning_rate: f64) -> Self {
        HalvingRate {
            learning_rate,
            previous: None,
        }
    }

    /// Returns the rate the next step will use, before any halving.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl GradientDescent for HalvingRate {
    fn modify_network(
        &mut self,
        network: &mut NeuronNetwork,
        iteration: usize,
        epoch: usize,
        gradients: &Gradients,
    ) -> Result<()> {
        gradients.check_shape(network)?;
        // A previous gradient of a different shape predates a structural
        // edit and says nothing about the current one.
        let overshot = match self.previous.as_ref().map(|p| p.dot(gradients)) {
            Some(Ok(dot)) => dot < 0.0,
            _ => false,
        };
        if overshot {
            self.learning_rate /= 2.0;
            debug!(
                "epoch {} iteration {}: learning rate halved to {}",
                epoch, iteration, self.learning_rate
            );
        }
        descend(network, self.learning_rate, gradients)?;
        self.previous = Some(gradients.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activator::{ActivationFunction, Activator};
    use crate::layers::NeuronLayer;
    use crate::matrix::Mat;
    use crate::vector::Vector;

    use std::sync::Arc;

    fn network() -> NeuronNetwork {
        let act: Arc<dyn ActivationFunction> = Arc::new(Activator::Logistic);
        let hidden = NeuronLayer::new(
            Mat::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap(),
            Vector::from(vec![0.5, -0.5]),
            act.clone(),
        )
        .unwrap();
        let output = NeuronLayer::new(
            Mat::from_rows(&[vec![1.0, -1.0]]).unwrap(),
            Vector::from(vec![0.0]),
            act,
        )
        .unwrap();
        NeuronNetwork::from_layers(2, vec![hidden, output]).unwrap()
    }

    fn ones(network: &NeuronNetwork, value: f64) -> Gradients {
        let mut gradients = Gradients::zeros(network);
        for b in gradients.biases.iter_mut() {
            for x in b.iter_mut() {
                *x = value;
            }
        }
        for w in gradients.weights.iter_mut() {
            for x in w.as_mut_slice() {
                *x = value;
            }
        }
        gradients
    }

    #[test]
    fn constant_rate_step() {
        let mut network = network();
        let gradients = ones(&network, 2.0);
        let mut descent = DescentMode::Constant { learning_rate: 0.25 }.build().unwrap();
        descent.modify_network(&mut network, 0, 0, &gradients).unwrap();

        let layers = network.layers();
        assert_eq!(layers[0].weights().as_slice(), &[0.5, 1.5, 2.5, 3.5]);
        assert_eq!(layers[0].biases().as_slice(), &[0.0, -1.0]);
        assert_eq!(layers[1].weights().as_slice(), &[0.5, -1.5]);
        assert_eq!(layers[1].biases().as_slice(), &[-0.5]);
    }

    #[test]
    fn mismatched_gradients_change_nothing() {
        let mut network = network();
        let mut gradients = ones(&network, 1.0);
        gradients.weights[1] = Mat::zeros(1, 3);
        let mut descent = ConstantRate::new(1.0);
        assert!(descent.modify_network(&mut network, 0, 0, &gradients).is_err());
        assert_eq!(network.layers()[0].weights().as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(network.layers()[0].biases().as_slice(), &[0.5, -0.5]);
    }

    #[test]
    fn halving_rate_halves_on_reversal() {
        let mut network = network();
        let mut descent = HalvingRate::new(1.0);

        let steps = [ones(&network, 1.0), ones(&network, 0.5), ones(&network, -1.0)];

        descent.modify_network(&mut network, 0, 0, &steps[0]).unwrap();
        assert_eq!(descent.learning_rate(), 1.0);
        descent.modify_network(&mut network, 1, 0, &steps[1]).unwrap();
        assert_eq!(descent.learning_rate(), 1.0);
        descent.modify_network(&mut network, 2, 0, &steps[2]).unwrap();
        assert_eq!(descent.learning_rate(), 0.5);

        // 0.0 - 1.0 - 0.5 + 0.5
        assert_eq!(network.layers()[1].biases().as_slice(), &[-1.0]);
    }

    #[test]
    fn registry_and_validation() {
        assert_eq!(DescentMode::default().name(), "Constant");
        assert_eq!(DescentMode::default().learning_rate(), 0.01);
        assert_eq!(
            DescentMode::from_index(1, 0.3),
            Ok(DescentMode::Halving { learning_rate: 0.3 })
        );
        assert!(DescentMode::from_index(2, 0.3).is_err());
        for &rate in &[0.0, -1.0, std::f64::NAN, std::f64::INFINITY] {
            assert!(matches!(
                DescentMode::Constant { learning_rate: rate }.build(),
                Err(Error::InvalidConfiguration(_))
            ));
        }
    }
}
