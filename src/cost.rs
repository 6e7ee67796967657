//! Cost functions, measuring how far a network's output is from the expected
//! output.

use crate::error::{check_len, Error, Result};
use crate::vector::Vector;

use std::fmt;

/// Gets the "cost", or error, in a network output when compared to the
/// expected output.
pub trait CostFunction: fmt::Debug + Send + Sync {
    /// Returns the cost of `actual` given `expected`.
    fn cost(&self, expected: &[f64], actual: &[f64]) -> Result<f64> {
        self.cost_with_derivative(expected, actual).map(|(cost, _)| cost)
    }

    /// Returns the cost together with its derivative vector.
    ///
    /// The derivative is stored *negated*: it points down the cost gradient
    /// with respect to `actual`. Backpropagation negates it again before
    /// using it as the output layer's error.
    fn cost_with_derivative(&self, expected: &[f64], actual: &[f64]) -> Result<(f64, Vector)>;
}

/// Cost function types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cost {
    /// Half the squared distance between expected and actual outputs.
    Quadratic,
}

impl Cost {
    pub const NAMES: [&'static str; 1] = ["Quadratic"];

    pub fn index(self) -> usize {
        match self {
            Cost::Quadratic => 0,
        }
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Cost::Quadratic),
            _ => Err(Error::InvalidConfiguration(format!(
                "unknown cost function index {}",
                index
            ))),
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map_or_else(
                || {
                    Err(Error::InvalidConfiguration(format!(
                        "unknown cost function {:?}",
                        name
                    )))
                },
                Self::from_index,
            )
    }
}

impl Default for Cost {
    fn default() -> Self {
        Cost::Quadratic
    }
}

impl CostFunction for Cost {
    fn cost_with_derivative(&self, expected: &[f64], actual: &[f64]) -> Result<(f64, Vector)> {
        check_len("expected / actual output length", expected.len(), actual.len())?;
        match self {
            Cost::Quadratic => {
                let mut derivative = Vector::zeros(expected.len());
                let mut sum = 0.0;
                for ((e, a), d) in expected.iter().zip(actual).zip(derivative.iter_mut()) {
                    let difference = e - a;
                    *d = difference;
                    sum += difference * difference;
                }
                Ok((sum / 2.0, derivative))
            }
        }
    }
}
