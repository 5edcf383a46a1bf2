pub mod policy;
pub mod sigmoid;

pub use policy::NumericPolicy;
pub use sigmoid::{sigmoid, sigmoid_derivative};
