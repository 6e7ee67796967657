use crate::error::{check_len, Result};
use crate::feed_forward::NeuronNetwork;
use crate::matrix::Mat;
use crate::utils::ZeroOut;
use crate::vector::Vector;

/// Cost derivatives for every bias and weight of a network, one entry per
/// layer in network order.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradients {
    pub biases: Vec<Vector>,
    pub weights: Vec<Mat>,
}

impl Gradients {
    /// Returns zeroed gradients shaped like `network`'s parameters.
    pub fn zeros(network: &NeuronNetwork) -> Self {
        let layers = network.layers();
        Gradients {
            biases: layers.iter().map(|l| Vector::zeros(l.n_nodes())).collect(),
            weights: layers
                .iter()
                .map(|l| Mat::zeros(l.n_nodes(), l.n_inputs()))
                .collect(),
        }
    }

    pub fn n_layers(&self) -> usize {
        self.biases.len()
    }

    /// Fails unless every entry matches the corresponding layer's bias and
    /// weight shapes.
    pub fn check_shape(&self, network: &NeuronNetwork) -> Result<()> {
        let layers = network.layers();
        check_len("bias gradient layers", layers.len(), self.biases.len())?;
        check_len("weight gradient layers", layers.len(), self.weights.len())?;
        for ((layer, b), w) in layers.iter().zip(&self.biases).zip(&self.weights) {
            check_len("bias gradient length", layer.n_nodes(), b.len())?;
            layer.weights().check_same_shape("weight gradient shape", w)?;
        }
        Ok(())
    }

    /// Adds `other` into `self`, layer by layer.
    pub fn add_assign_checked(&mut self, other: &Gradients) -> Result<()> {
        self.check_same_shape(other)?;
        for (b, ob) in self.biases.iter_mut().zip(&other.biases) {
            b.add_assign_checked(ob)?;
        }
        for (w, ow) in self.weights.iter_mut().zip(&other.weights) {
            w.add_assign_checked(ow)?;
        }
        Ok(())
    }

    /// Divides every derivative by `n`.
    pub fn divide(&mut self, n: f64) {
        for b in self.biases.iter_mut() {
            for x in b.iter_mut() {
                *x /= n;
            }
        }
        for w in self.weights.iter_mut() {
            for x in w.as_mut_slice() {
                *x /= n;
            }
        }
    }

    /// Inner product of the two gradients viewed as flat vectors, summed
    /// layer by layer, biases before weights.
    pub fn dot(&self, other: &Gradients) -> Result<f64> {
        self.check_same_shape(other)?;
        let mut sum = 0.0;
        for ((b, ob), (w, ow)) in self
            .biases
            .iter()
            .zip(&other.biases)
            .zip(self.weights.iter().zip(&other.weights))
        {
            sum += b.dot(ob)?;
            sum += w.frobenius_dot(ow)?;
        }
        Ok(sum)
    }

    fn check_same_shape(&self, other: &Gradients) -> Result<()> {
        check_len("gradient layers", self.biases.len(), other.biases.len())?;
        check_len("gradient layers", self.weights.len(), other.weights.len())?;
        for (b, ob) in self.biases.iter().zip(&other.biases) {
            check_len("bias gradient length", b.len(), ob.len())?;
        }
        for (w, ow) in self.weights.iter().zip(&other.weights) {
            w.check_same_shape("weight gradient shape", ow)?;
        }
        Ok(())
    }
}

impl ZeroOut for Gradients {
    fn zero_out(&mut self) {
        self.biases.zero_out();
        self.weights.zero_out();
    }
}
