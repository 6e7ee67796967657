//! Activation function types.

use crate::error::{check_len, Error, Result};
use crate::vector::Vector;

use std::fmt;

/// Filters the weighted inputs of a whole layer of nodes.
///
/// Implementors only need the scalar `f` and `fprime`; the vector forms are
/// provided. Implementations must be stateless so a single instance can be
/// shared by any number of layers.
pub trait ActivationFunction: fmt::Debug + Send + Sync {
    /// Evaluates `y = f(x)`.
    fn f(&self, x: f64) -> f64;

    /// Evaluates the derivative `f'(x)`, given both the input `x` and the
    /// already computed output `y = f(x)`.
    fn fprime(&self, x: f64, y: f64) -> f64;

    /// Applies the function to every weighted input.
    fn evaluate(&self, weighted_input: &Vector) -> Vector {
        weighted_input.map(|x| self.f(x))
    }

    /// Applies the function to every weighted input, returning the outputs
    /// and their derivatives with respect to the weighted inputs.
    fn evaluate_with_derivative(&self, weighted_input: &Vector) -> (Vector, Vector) {
        let output = self.evaluate(weighted_input);
        let derivative = weighted_input
            .iter()
            .zip(output.iter())
            .map(|(&x, &y)| self.fprime(x, y))
            .collect::<Vec<_>>();
        (output, Vector::from(derivative))
    }

    /// Like `evaluate_with_derivative`, writing into caller-owned buffers.
    /// Both buffers must have the same length as `weighted_input`.
    fn evaluate_into(
        &self,
        weighted_input: &[f64],
        output: &mut [f64],
        derivative: &mut [f64],
    ) -> Result<()> {
        check_len("activation output buffer", weighted_input.len(), output.len())?;
        check_len("activation derivative buffer", weighted_input.len(), derivative.len())?;
        for ((&x, y), d) in weighted_input
            .iter()
            .zip(output.iter_mut())
            .zip(derivative.iter_mut())
        {
            *y = self.f(x);
            *d = self.fprime(x, *y);
        }
        Ok(())
    }
}

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activator {
    /// Logistic sigmoid, `1 / (1 + e^-x)`
    Logistic,
    /// Hyperbolic tan function
    TanH,
    /// Rectified Linear Unit
    ReLU,
}

impl Activator {
    /// Display names, in variant index order.
    pub const NAMES: [&'static str; 3] = ["Logistic", "TanH", "ReLU"];

    const ALL: [Activator; 3] = [Activator::Logistic, Activator::TanH, Activator::ReLU];

    pub fn index(self) -> usize {
        match self {
            Activator::Logistic => 0,
            Activator::TanH => 1,
            Activator::ReLU => 2,
        }
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            Error::InvalidConfiguration(format!("unknown activation function index {}", index))
        })
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| Self::ALL[i])
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!("unknown activation function {:?}", name))
            })
    }
}

impl Default for Activator {
    fn default() -> Self {
        Activator::Logistic
    }
}

impl ActivationFunction for Activator {
    fn f(&self, x: f64) -> f64 {
        match self {
            Activator::Logistic => 1.0 / (1.0 + (-x).exp()),
            Activator::TanH => 2.0 / (1.0 + (-2.0 * x).exp()) - 1.0,
            Activator::ReLU => {
                if x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
        }
    }

    fn fprime(&self, x: f64, y: f64) -> f64 {
        match self {
            Activator::Logistic => y * (1.0 - y),
            Activator::TanH => 1.0 - y * y,
            Activator::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}
