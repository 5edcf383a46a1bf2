pub mod dataset;
pub mod idx;
pub mod mnist;

pub use dataset::{argmax, one_hot, Dataset, DatasetConfig, Partition};
pub use mnist::load_mnist;
