use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Learning rate applied during this epoch.
    pub learning_rate: f64,
    /// Examples visited (one weight update each).
    pub steps: usize,
    /// Mean squared error over the visited training examples.
    pub train_loss: f64,
    /// Mean squared error on the validation partition, if one was provided.
    pub val_loss: Option<f64>,
    /// Validation accuracy as a fraction in [0, 1].
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
