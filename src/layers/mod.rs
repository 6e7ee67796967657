mod dense;

pub use self::dense::NeuronLayer;

use crate::vector::Vector;

/// The intermediate values of one layer's forward pass, kept for
/// backpropagation.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerEvaluation {
    /// Weights times the previous layer's output, plus the biases.
    pub weighted_input: Vector,
    /// The activation function applied to `weighted_input`.
    pub output: Vector,
    /// The derivative of `output` with respect to `weighted_input`.
    pub derivative: Vector,
}

impl LayerEvaluation {
    /// Returns zeroed buffers for a layer of `n_nodes` nodes.
    pub fn new(n_nodes: usize) -> Self {
        LayerEvaluation {
            weighted_input: Vector::zeros(n_nodes),
            output: Vector::zeros(n_nodes),
            derivative: Vector::zeros(n_nodes),
        }
    }

    /// Returns the node count these buffers are sized for.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }
}
