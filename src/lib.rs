//! A multilayer perceptron trained with online stochastic gradient descent.
//!
//! Every layer is fully connected with a logistic sigmoid; the network is
//! trained on squared error one example at a time.
//!
//! # Modules
//!
//! - `layers`: a single sigmoid layer with its forward, gradient and update steps
//! - `network`: the layer chain, backpropagation and architecture specs
//! - `activation`: the sigmoid and its numeric-safety policy
//! - `data`: IDX parsing and dataset partitions
//! - `train`: the online SGD driver
//! - `config`: JSON run configuration

pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod data;
pub mod train;
pub mod config;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::NumericPolicy;
pub use layers::dense::{Layer, Phase};
pub use network::{Network, NetworkSpec};
pub use loss::SquaredError;
pub use data::{Dataset, DatasetConfig, Partition};
pub use train::{train_loop, train_step, TrainConfig};
pub use error::{NnError, Result};
