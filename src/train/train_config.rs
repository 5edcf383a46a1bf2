use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`              — total number of passes over the training partition
/// - `learning_rate`       — step size of the first epoch
/// - `lr_decay`            — multiplied into the learning rate after every epoch
/// - `max_steps_per_epoch` — optional cap on examples visited per epoch
/// - `shuffle`             — visit training examples in a fresh random order each epoch
/// - `progress_tx`         — optional channel sender; one `EpochStats` is sent per
///                           completed epoch.  If the receiver is dropped the loop
///                           terminates early (clean shutdown).
/// - `stop_flag`           — optional atomic flag; when set to `true` from another
///                           thread the loop terminates after the current epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    #[serde(default = "default_lr_decay")]
    pub lr_decay: f64,
    #[serde(default)]
    pub max_steps_per_epoch: Option<usize>,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    #[serde(skip)]
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    #[serde(skip)]
    pub stop_flag: Option<Arc<AtomicBool>>,
}

fn default_lr_decay() -> f64 {
    1.0
}

fn default_shuffle() -> bool {
    true
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with a constant learning rate, no
    /// progress channel and no stop flag.
    pub fn new(epochs: usize, learning_rate: f64) -> Self {
        TrainConfig {
            epochs,
            learning_rate,
            lr_decay: default_lr_decay(),
            max_steps_per_epoch: None,
            shuffle: default_shuffle(),
            progress_tx: None,
            stop_flag: None,
        }
    }

    /// Learning rate used during the 1-based `epoch`.
    pub fn learning_rate_at(&self, epoch: usize) -> f64 {
        self.learning_rate * self.lr_decay.powi(epoch.saturating_sub(1) as i32)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "learning_rate must be finite and positive, got {}",
                self.learning_rate
            )));
        }
        if !self.lr_decay.is_finite() || self.lr_decay <= 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "lr_decay must be finite and positive, got {}",
                self.lr_decay
            )));
        }
        // decay is monotone, so the last epoch has the extreme rate
        let final_rate = self.learning_rate_at(self.epochs.max(1));
        if !final_rate.is_finite() || final_rate <= 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "learning rate decays to {} by epoch {}; lower epochs or bring lr_decay closer to 1",
                final_rate, self.epochs
            )));
        }
        if self.max_steps_per_epoch == Some(0) {
            return Err(NnError::InvalidConfig(
                "max_steps_per_epoch must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn json_fills_defaults() {
        let cfg: TrainConfig = serde_json::from_str(r#"{ "epochs": 3, "learning_rate": 0.5 }"#).unwrap();
        assert_eq!(cfg.lr_decay, 1.0);
        assert!(cfg.shuffle);
        assert!(cfg.max_steps_per_epoch.is_none());
        assert!(cfg.progress_tx.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn decay_compounds_per_epoch() {
        let mut cfg = TrainConfig::new(5, 0.5);
        cfg.lr_decay = 0.5;
        assert_relative_eq!(cfg.learning_rate_at(1), 0.5);
        assert_relative_eq!(cfg.learning_rate_at(3), 0.125);
    }

    #[test]
    fn validate_rejects_rate_that_decays_to_zero() {
        let mut cfg = TrainConfig::new(1200, 0.5);
        cfg.lr_decay = 0.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("by epoch 1200"));

        cfg.epochs = 20;
        cfg.validate().unwrap();
    }

    #[test]
    fn validate_rejects_rate_that_grows_to_infinity() {
        let mut cfg = TrainConfig::new(2000, 0.5);
        cfg.lr_decay = 2.0;
        assert!(matches!(cfg.validate(), Err(NnError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(TrainConfig::new(1, 0.0).validate().is_err());
        let mut cfg = TrainConfig::new(1, 0.1);
        cfg.max_steps_per_epoch = Some(0);
        assert!(cfg.validate().is_err());
    }
}
