//! A small feed-forward neural network engine trained with mini-batch
//! gradient descent.
//!
//! # Example
//!
//! Let's train a simple neural network on the XOR function:
//!
//! ```
//! # use neuronet::config::TrainingConfig;
//! # use neuronet::gradient_descent::DescentMode;
//! # use neuronet::trainer::Sample;
//! // Create examples of the XOR function
//! let examples = vec![
//!     Sample::new(vec![0.0, 0.0], vec![0.0]),
//!     Sample::new(vec![0.0, 1.0], vec![1.0]),
//!     Sample::new(vec![1.0, 0.0], vec![1.0]),
//!     Sample::new(vec![1.0, 1.0], vec![0.0]),
//! ];
//!
//! let config = TrainingConfig::new()
//!     .hidden_layers(&[3])
//!     .mini_batch_size(4)
//!     .descent(DescentMode::Constant { learning_rate: 0.5 });
//! let mut trainer = config.build(2, 1, examples.clone(), examples).unwrap();
//! let mut rng = config.rng();
//!
//! // Train for a while, and verify the network got better at it
//! let before = trainer.validate().unwrap();
//! for _ in 0..200 {
//!     trainer.run_epoch(config.mini_batch_size, &mut rng).unwrap();
//! }
//! assert!(trainer.validate().unwrap() < before);
//! ```

#[macro_use]
extern crate serde_derive;

pub mod activator;
pub mod config;
pub mod cost;
pub mod error;
pub mod feed_forward;
pub mod gradient_descent;
pub mod gradients;
pub mod history;
pub mod initializer;
pub mod layers;
pub mod matrix;
pub mod trainer;
pub mod vector;

mod utils;

pub use crate::error::{Error, Result};
pub use crate::utils::ZeroOut;
