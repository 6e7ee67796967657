use crate::activator::ActivationFunction;
use crate::error::{check_len, Result};
use crate::layers::LayerEvaluation;
use crate::matrix::Mat;
use crate::vector::Vector;

use itertools::multizip;
use std::sync::Arc;

/// A fully connected layer of neurons.
///
/// Row `j` of `weights` holds the weights from every node of the previous
/// layer into node `j`; `biases[j]` is node `j`'s bias. The activation
/// function is shared and stateless, so cloning a layer is cheap apart from
/// its parameters.
#[derive(Clone, Debug)]
pub struct NeuronLayer {
    /// The network weights, with each neuron's weights stored as a row.
    weights: Mat,
    biases: Vector,
    /// The activation function to be used for every neuron in the layer.
    activation: Arc<dyn ActivationFunction>,
}

impl NeuronLayer {
    /// Creates a layer from existing parameters.
    ///
    /// Fails unless `weights` has one row per bias.
    pub fn new(
        weights: Mat,
        biases: Vector,
        activation: Arc<dyn ActivationFunction>,
    ) -> Result<Self> {
        check_len("weight rows / bias count", weights.rows(), biases.len())?;
        Ok(NeuronLayer {
            weights,
            biases,
            activation,
        })
    }

    /// Creates a layer of `nodes` nodes fed by `inputs` nodes, with every
    /// weight and bias set to zero.
    pub fn zeros(
        inputs: usize,
        nodes: usize,
        activation: Arc<dyn ActivationFunction>,
    ) -> Self {
        NeuronLayer {
            weights: Mat::zeros(nodes, inputs),
            biases: Vector::zeros(nodes),
            activation,
        }
    }

    /// Returns the number of nodes in this layer.
    pub fn n_nodes(&self) -> usize {
        self.biases.len()
    }

    /// Returns the number of inputs to this layer.
    pub fn n_inputs(&self) -> usize {
        self.weights.cols()
    }

    pub fn weights(&self) -> &Mat {
        &self.weights
    }

    pub fn biases(&self) -> &Vector {
        &self.biases
    }

    /// Mutable access to the weights, row-major. The shape cannot change
    /// through this view.
    pub fn weights_mut(&mut self) -> &mut [f64] {
        self.weights.as_mut_slice()
    }

    pub fn biases_mut(&mut self) -> &mut [f64] {
        self.biases.as_mut_slice()
    }

    /// Mutable access to both parameter sets at once.
    pub(crate) fn parameters_mut(&mut self) -> (&mut Mat, &mut Vector) {
        (&mut self.weights, &mut self.biases)
    }

    pub fn activation(&self) -> &Arc<dyn ActivationFunction> {
        &self.activation
    }

    pub fn set_activation(&mut self, activation: Arc<dyn ActivationFunction>) {
        self.activation = activation;
    }

    /// Feeds `inputs` through the layer, returning only its output.
    pub fn evaluate(&self, inputs: &[f64]) -> Result<Vector> {
        let weighted_input = self.weighted_input(inputs)?;
        Ok(self.activation.evaluate(&weighted_input))
    }

    /// Feeds `inputs` through the layer, returning the weighted inputs, the
    /// outputs, and the derivatives of the outputs.
    pub fn evaluate_full(&self, inputs: &[f64]) -> Result<LayerEvaluation> {
        let mut evaluation = LayerEvaluation::new(self.n_nodes());
        self.evaluate_into(inputs, &mut evaluation)?;
        Ok(evaluation)
    }

    /// Like `evaluate_full`, writing into a scratch buffer that must already
    /// be sized to this layer's node count.
    pub fn evaluate_into(
        &self,
        inputs: &[f64],
        evaluation: &mut LayerEvaluation,
    ) -> Result<()> {
        check_len("layer inputs", self.n_inputs(), inputs.len())?;
        let LayerEvaluation {
            weighted_input,
            output,
            derivative,
        } = evaluation;
        for buffer in [&*weighted_input, &*output, &*derivative].iter() {
            check_len("layer scratch buffer", self.n_nodes(), buffer.len())?;
        }
        self.weights.mul_vector_into(inputs, weighted_input)?;
        for (z, b) in multizip((weighted_input.iter_mut(), self.biases.iter())) {
            *z += *b;
        }
        self.activation.evaluate_into(weighted_input, output, derivative)
    }

    /// Changes the layer to `n_nodes` nodes fed by `n_inputs` inputs.
    ///
    /// Weights and biases inside both the old and new bounds keep their
    /// values; new entries are zero and anything outside the new bounds is
    /// discarded.
    pub fn resize(&mut self, n_nodes: usize, n_inputs: usize) {
        self.weights = self.weights.resized(n_nodes, n_inputs);
        self.biases = self.biases.resized(n_nodes);
    }

    fn weighted_input(&self, inputs: &[f64]) -> Result<Vector> {
        let mut weighted_input = self.weights.mul_vector(inputs)?;
        for (z, b) in multizip((weighted_input.iter_mut(), self.biases.iter())) {
            *z += *b;
        }
        Ok(weighted_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activator::Activator;
    use crate::error::Error;

    use approx::assert_relative_eq;

    fn logistic() -> Arc<dyn ActivationFunction> {
        Arc::new(Activator::Logistic)
    }

    fn layer() -> NeuronLayer {
        let weights =
            Mat::from_rows(&[vec![1.0, 2.0, 3.0], vec![-1.0, 0.5, 0.0]]).unwrap();
        NeuronLayer::new(weights, Vector::from(vec![0.5, -0.5]), logistic())
            .unwrap()
    }

    #[test]
    fn mismatched_parameters_fail() {
        let result = NeuronLayer::new(Mat::zeros(2, 3), Vector::zeros(3), logistic());
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn forward_pass() {
        let layer = layer();
        let evaluation = layer.evaluate_full(&[1.0, 0.0, -1.0]).unwrap();
        assert_eq!(evaluation.weighted_input.as_slice(), &[-1.5, -1.5]);
        for i in 0..2 {
            let y = 1.0 / (1.0 + 1.5f64.exp());
            assert_relative_eq!(evaluation.output[i], y);
            assert_relative_eq!(evaluation.derivative[i], y * (1.0 - y));
        }
        assert_eq!(layer.evaluate(&[1.0, 0.0, -1.0]).unwrap(), evaluation.output);
    }

    #[test]
    fn wrong_input_size() {
        let layer = layer();
        assert_eq!(
            layer.evaluate(&[1.0, 2.0]),
            Err(Error::ShapeMismatch {
                context: "matrix columns / vector length",
                expected: 3,
                actual: 2,
            })
        );
        let mut scratch = LayerEvaluation::new(2);
        assert!(layer.evaluate_into(&[1.0], &mut scratch).is_err());
    }

    #[test]
    fn wrong_scratch_size() {
        let layer = layer();
        let mut scratch = LayerEvaluation::new(3);
        assert_eq!(
            layer.evaluate_into(&[1.0, 0.0, -1.0], &mut scratch),
            Err(Error::ShapeMismatch {
                context: "layer scratch buffer",
                expected: 2,
                actual: 3,
            })
        );
    }

    #[test]
    fn zero_layer_outputs_half() {
        let layer = NeuronLayer::zeros(4, 3, logistic());
        let output = layer.evaluate(&[3.0, -7.0, 0.25, 100.0]).unwrap();
        assert_eq!(output.as_slice(), &[0.5, 0.5, 0.5]);
    }

    #[test]
    fn grow_preserves_values() {
        let mut layer = layer();
        layer.resize(3, 4);
        assert_eq!(layer.n_nodes(), 3);
        assert_eq!(layer.n_inputs(), 4);
        assert_eq!(layer.weights().row(0), &[1.0, 2.0, 3.0, 0.0]);
        assert_eq!(layer.weights().row(1), &[-1.0, 0.5, 0.0, 0.0]);
        assert_eq!(layer.weights().row(2), &[0.0; 4]);
        assert_eq!(layer.biases().as_slice(), &[0.5, -0.5, 0.0]);
    }

    #[test]
    fn shrink_truncates() {
        let mut layer = layer();
        layer.resize(1, 2);
        assert_eq!(layer.weights().as_slice(), &[1.0, 2.0]);
        assert_eq!(layer.biases().as_slice(), &[0.5]);

        layer.resize(2, 3);
        assert_eq!(layer.weights().row(0), &[1.0, 2.0, 0.0]);
        assert_eq!(layer.weights().row(1), &[0.0, 0.0, 0.0]);
        assert_eq!(layer.biases().as_slice(), &[0.5, 0.0]);
    }

    #[test]
    fn swap_activation() {
        let mut layer = NeuronLayer::zeros(1, 1, logistic());
        layer.set_activation(Arc::new(Activator::ReLU));
        assert_eq!(layer.evaluate(&[1.0]).unwrap().as_slice(), &[0.0]);
    }
}
