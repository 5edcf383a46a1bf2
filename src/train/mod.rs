pub mod trainer;
pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;

pub use trainer::{evaluate, overfit_single, train_step, Evaluation};
pub use epoch_stats::EpochStats;
pub use train_config::TrainConfig;
pub use loop_fn::train_loop;
