//! Run configuration loaded from JSON.
//!
//! ```json
//! {
//!   "network": {
//!     "layers": [
//!       { "input_size": 784, "size": 300 },
//!       { "input_size": 300, "size": 10 }
//!     ],
//!     "numeric_policy": "clamp",
//!     "seed": 7
//!   },
//!   "train": { "epochs": 5, "learning_rate": 0.5, "lr_decay": 0.9 },
//!   "dataset": { "n_train": 54000, "n_valid": 6000, "n_test": 10000, "input_width": 784, "classes": 10 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::data::dataset::DatasetConfig;
use crate::error::{NnError, Result};
use crate::network::spec::NetworkSpec;
use crate::train::train_config::TrainConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Architecture; the CLI builds one from `--hidden` when absent.
    #[serde(default)]
    pub network: Option<NetworkSpec>,
    pub train: TrainConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
}

impl RunConfig {
    /// Checks each section and that the network matches the dataset widths.
    pub fn validate(&self) -> Result<()> {
        self.train.validate()?;
        if let Some(spec) = &self.network {
            spec.validate()?;
            check_width("network input", self.dataset.input_width, spec.input_size())?;
            check_width("network output", self.dataset.classes, spec.output_size())?;
        }
        Ok(())
    }
}

fn check_width(context: &str, expected: usize, actual: Option<usize>) -> Result<()> {
    match actual {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(NnError::dimension(context, expected, actual)),
        None => Err(NnError::InvalidConfig("network has no layers".to_owned())),
    }
}

/// Loads and validates a run configuration from a JSON file.
pub fn load_config(path: &str) -> Result<RunConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: RunConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
