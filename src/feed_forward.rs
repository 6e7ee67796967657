//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network).
//!
//! The network owns its layers in order, not counting the input layer, which
//! has no parameters and is described only by its node count.

use crate::activator::{ActivationFunction, Activator};
use crate::cost::CostFunction;
use crate::error::{check_len, Error, Result};
use crate::gradients::Gradients;
use crate::initializer::ValueInitializer;
use crate::layers::{LayerEvaluation, NeuronLayer};
use crate::matrix::Mat;
use crate::vector::Vector;

use itertools::multizip;
use log::debug;
use rand::RngCore;
use std::sync::Arc;

/// A Feedforward neural network
#[derive(Clone, Debug)]
pub struct NeuronNetwork {
    n_inputs: usize,
    layers: Vec<NeuronLayer>, // never empty
}

/// Per-layer buffers reused across forward and backward passes.
#[derive(Clone, Debug)]
pub struct Scratch {
    /// Forward-pass values, one entry per layer.
    pub layers: Vec<LayerEvaluation>,
    /// Backpropagated node errors, one entry per layer.
    pub errors: Vec<Vector>,
}

/// A structural change to a network, applied between training calls.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NetworkEdit {
    /// Changes the node count of `layer`. The following layer's inputs
    /// follow along.
    ResizeLayer { layer: usize, n_nodes: usize },
    /// Inserts a zeroed layer of `n_nodes` nodes before position `index`
    /// (`index == n_layers` appends a new output layer).
    InsertLayer { index: usize, n_nodes: usize },
    /// Removes `layer`, reconnecting its neighbours.
    RemoveLayer { layer: usize },
    /// Swaps the activation function of `layer`.
    SetActivation { layer: usize, activator: Activator },
    /// Changes the number of input nodes.
    SetInputCount { n_inputs: usize },
}

impl NeuronNetwork {
    /// Creates a new, untrained neural network.
    ///
    /// Arguments:
    ///  * `rng` - the source of randomness handed to `initializer`.
    ///  * `activation` - the activation function to use for each layer.
    ///  * `initializer` - fills each layer's starting weights and biases.
    ///  * `layer_sizes` - the number of neurons in each layer, starting with
    ///                    the input layer. Must contain at least 2 non-zero
    ///                    elements.
    pub fn new(
        rng: &mut dyn RngCore,
        activation: Arc<dyn ActivationFunction>,
        initializer: &dyn ValueInitializer,
        layer_sizes: &[usize],
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "a network needs at least 2 layer sizes, got {}",
                layer_sizes.len()
            )));
        }
        if let Some(i) = layer_sizes.iter().position(|&n| n == 0) {
            return Err(Error::InvalidConfiguration(format!(
                "layer {} has no nodes",
                i
            )));
        }

        let mut layers = Vec::with_capacity(layer_sizes.len() - 1);
        for i in 1..layer_sizes.len() {
            let mut weights = Mat::zeros(layer_sizes[i], layer_sizes[i - 1]);
            let mut biases = Vector::zeros(layer_sizes[i]);
            initializer.init(rng, &mut weights, &mut biases, i)?;
            layers.push(NeuronLayer::new(weights, biases, activation.clone())?);
        }
        Ok(NeuronNetwork {
            n_inputs: layer_sizes[0],
            layers,
        })
    }

    /// Assembles a network from existing layers, checking that each layer's
    /// inputs match the previous layer's nodes.
    pub fn from_layers(n_inputs: usize, layers: Vec<NeuronLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::InvalidConfiguration(
                "a network needs at least one layer".into(),
            ));
        }
        if n_inputs == 0 {
            return Err(Error::InvalidConfiguration(
                "a network needs at least one input".into(),
            ));
        }
        let mut previous = n_inputs;
        for layer in &layers {
            check_len("layer inputs / previous layer nodes", previous, layer.n_inputs())?;
            if layer.n_nodes() == 0 {
                return Err(Error::InvalidConfiguration("layer has no nodes".into()));
            }
            previous = layer.n_nodes();
        }
        Ok(NeuronNetwork { n_inputs, layers })
    }

    /// Returns the size of the input layer to the network.
    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    /// Returns the size of the output layer from the network.
    pub fn n_outputs(&self) -> usize {
        self.layers[self.layers.len() - 1].n_nodes()
    }

    /// Returns the number of layers, not counting the input layer.
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[NeuronLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&NeuronLayer> {
        self.layers.get(index)
    }

    /// Returns the node count of every layer, input layer first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        sizes.push(self.n_inputs);
        sizes.extend(self.layers.iter().map(|l| l.n_nodes()));
        sizes
    }

    /// Mutable `(weights, biases)` views of every layer, in network order.
    /// Weights are row-major; shapes cannot change through these views.
    pub fn parameters_mut(
        &mut self,
    ) -> impl Iterator<Item = (&mut [f64], &mut [f64])> + '_ {
        self.layers.iter_mut().map(|layer| {
            let (weights, biases) = layer.parameters_mut();
            (weights.as_mut_slice(), biases.as_mut_slice())
        })
    }

    /// Feeds the provided `input` through the network, returning the output
    /// layer.
    pub fn evaluate(&self, input: &[f64]) -> Result<Vector> {
        check_len("network inputs", self.n_inputs, input.len())?;
        let mut output = self.layers[0].evaluate(input)?;
        for layer in &self.layers[1..] {
            output = layer.evaluate(&output)?;
        }
        Ok(output)
    }

    /// Returns forward and backward buffers sized for this network.
    pub fn new_scratch(&self) -> Scratch {
        Scratch {
            layers: self
                .layers
                .iter()
                .map(|l| LayerEvaluation::new(l.n_nodes()))
                .collect(),
            errors: self.layers.iter().map(|l| Vector::zeros(l.n_nodes())).collect(),
        }
    }

    /// Feeds the provided `input` through the network, recording every
    /// layer's weighted input, output and activation derivative.
    ///
    /// `evaluations` must hold exactly one buffer per layer, each sized to
    /// that layer's node count.
    pub fn evaluate_into(
        &self,
        input: &[f64],
        evaluations: &mut [LayerEvaluation],
    ) -> Result<()> {
        check_len("network inputs", self.n_inputs, input.len())?;
        check_len("evaluation buffers / layers", self.layers.len(), evaluations.len())?;
        for (i, layer) in self.layers.iter().enumerate() {
            let (before, after) = evaluations.split_at_mut(i);
            let inputs: &[f64] = if i == 0 { input } else { &before[i - 1].output };
            layer.evaluate_into(inputs, &mut after[0])?;
        }
        Ok(())
    }

    /// Runs one sample forward and back through the network, adding its
    /// bias and weight derivatives into `gradients`. Returns the sample's
    /// cost.
    pub fn backpropagate(
        &self,
        input: &[f64],
        expected: &[f64],
        cost: &dyn CostFunction,
        scratch: &mut Scratch,
        gradients: &mut Gradients,
    ) -> Result<f64> {
        check_len("expected outputs", self.n_outputs(), expected.len())?;
        check_len("error buffers / layers", self.layers.len(), scratch.errors.len())?;
        for (layer, error) in self.layers.iter().zip(&scratch.errors) {
            check_len("error buffer", layer.n_nodes(), error.len())?;
        }
        gradients.check_shape(self)?;

        self.evaluate_into(input, &mut scratch.layers)?;
        let last = self.layers.len() - 1;
        let (sample_cost, cost_derivative) =
            cost.cost_with_derivative(expected, &scratch.layers[last].output)?;

        // The cost derivative is stored negated, so flip it back here.
        for (e, c, d) in multizip((
            scratch.errors[last].iter_mut(),
            cost_derivative.iter(),
            scratch.layers[last].derivative.iter(),
        )) {
            *e = -c * d;
        }

        for l in (0..last).rev() {
            let (this, next) = scratch.errors.split_at_mut(l + 1);
            self.layers[l + 1]
                .weights()
                .transpose_mul_vector_into(&next[0], &mut this[l])?;
            for (e, d) in this[l].iter_mut().zip(scratch.layers[l].derivative.iter()) {
                *e *= d;
            }
        }

        for (l, (bias_gradient, weight_gradient)) in gradients
            .biases
            .iter_mut()
            .zip(gradients.weights.iter_mut())
            .enumerate()
        {
            let inputs: &[f64] = if l == 0 {
                input
            } else {
                &scratch.layers[l - 1].output
            };
            let errors = &scratch.errors[l];
            for (j, (g, &e)) in bias_gradient.iter_mut().zip(errors.iter()).enumerate() {
                *g += e;
                let row = &mut weight_gradient.as_mut_slice()
                    [j * inputs.len()..(j + 1) * inputs.len()];
                for (w, x) in row.iter_mut().zip(inputs) {
                    *w += e * x;
                }
            }
        }

        Ok(sample_cost)
    }

    /// Re-draws every weight and bias from `initializer`. Nothing changes if
    /// the initializer fails.
    pub fn initialize(
        &mut self,
        rng: &mut dyn RngCore,
        initializer: &dyn ValueInitializer,
    ) -> Result<()> {
        let mut fresh = Vec::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate() {
            let mut weights = Mat::zeros(layer.n_nodes(), layer.n_inputs());
            let mut biases = Vector::zeros(layer.n_nodes());
            initializer.init(rng, &mut weights, &mut biases, i + 1)?;
            fresh.push((weights, biases));
        }
        for (layer, (weights, biases)) in self.layers.iter_mut().zip(fresh) {
            let (w, b) = layer.parameters_mut();
            *w = weights;
            *b = biases;
        }
        Ok(())
    }

    /// Applies a structural edit. The edit is validated first and either
    /// applied completely or not at all.
    pub fn apply(&mut self, edit: NetworkEdit) -> Result<()> {
        match edit {
            NetworkEdit::ResizeLayer { layer, n_nodes } => self.resize_layer(layer, n_nodes),
            NetworkEdit::InsertLayer { index, n_nodes } => self.insert_layer(index, n_nodes),
            NetworkEdit::RemoveLayer { layer } => self.remove_layer(layer),
            NetworkEdit::SetActivation { layer, activator } => {
                self.set_activation(layer, Arc::new(activator))
            }
            NetworkEdit::SetInputCount { n_inputs } => self.set_input_count(n_inputs),
        }
    }

    /// Changes `layer` to `n_nodes` nodes, keeping overlapping weights and
    /// biases, and resizes the next layer's inputs to match.
    pub fn resize_layer(&mut self, layer: usize, n_nodes: usize) -> Result<()> {
        self.check_layer_index(layer)?;
        check_node_count(n_nodes)?;

        let n_inputs = self.layers[layer].n_inputs();
        self.layers[layer].resize(n_nodes, n_inputs);
        if let Some(next) = self.layers.get_mut(layer + 1) {
            let next_nodes = next.n_nodes();
            next.resize(next_nodes, n_nodes);
        }
        debug!("resized layer {} to {} nodes", layer, n_nodes);
        Ok(())
    }

    /// Inserts a zeroed layer of `n_nodes` nodes at position `index`.
    ///
    /// The new layer borrows the activation function of the layer it is
    /// inserted before (or after, when appending).
    pub fn insert_layer(&mut self, index: usize, n_nodes: usize) -> Result<()> {
        if index > self.layers.len() {
            return Err(Error::InvalidConfiguration(format!(
                "cannot insert a layer at {} into a network of {} layers",
                index,
                self.layers.len()
            )));
        }
        check_node_count(n_nodes)?;

        let n_inputs = self.inputs_of(index);
        let activation = self.layers[index.min(self.layers.len() - 1)]
            .activation()
            .clone();
        if let Some(next) = self.layers.get_mut(index) {
            let next_nodes = next.n_nodes();
            next.resize(next_nodes, n_nodes);
        }
        self.layers
            .insert(index, NeuronLayer::zeros(n_inputs, n_nodes, activation));
        debug!("inserted a layer of {} nodes at {}", n_nodes, index);
        Ok(())
    }

    /// Removes `layer` and reconnects the following layer to the one before
    /// it. The last remaining layer cannot be removed.
    pub fn remove_layer(&mut self, layer: usize) -> Result<()> {
        self.check_layer_index(layer)?;
        if self.layers.len() == 1 {
            return Err(Error::InvalidConfiguration(
                "cannot remove the only layer of a network".into(),
            ));
        }

        let n_inputs = self.inputs_of(layer);
        self.layers.remove(layer);
        if let Some(next) = self.layers.get_mut(layer) {
            let next_nodes = next.n_nodes();
            next.resize(next_nodes, n_inputs);
        }
        debug!("removed layer {}", layer);
        Ok(())
    }

    /// Swaps the activation function of `layer`.
    pub fn set_activation(
        &mut self,
        layer: usize,
        activation: Arc<dyn ActivationFunction>,
    ) -> Result<()> {
        self.check_layer_index(layer)?;
        debug!("layer {} activation set to {:?}", layer, activation);
        self.layers[layer].set_activation(activation);
        Ok(())
    }

    /// Changes the number of input nodes, resizing the first layer's inputs.
    pub fn set_input_count(&mut self, n_inputs: usize) -> Result<()> {
        check_node_count(n_inputs)?;
        let first = &mut self.layers[0];
        let n_nodes = first.n_nodes();
        first.resize(n_nodes, n_inputs);
        self.n_inputs = n_inputs;
        debug!("input count set to {}", n_inputs);
        Ok(())
    }

    /// Returns the number of nodes feeding position `index`.
    fn inputs_of(&self, index: usize) -> usize {
        if index == 0 {
            self.n_inputs
        } else {
            self.layers[index - 1].n_nodes()
        }
    }

    fn check_layer_index(&self, layer: usize) -> Result<()> {
        if layer < self.layers.len() {
            Ok(())
        } else {
            Err(Error::InvalidConfiguration(format!(
                "layer {} does not exist in a network of {} layers",
                layer,
                self.layers.len()
            )))
        }
    }
}

fn check_node_count(n_nodes: usize) -> Result<()> {
    if n_nodes == 0 {
        Err(Error::InvalidConfiguration("a layer needs at least one node".into()))
    } else {
        Ok(())
    }
}
