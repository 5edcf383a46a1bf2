use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::data::dataset::Partition;
use crate::error::{NnError, Result};
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::{evaluate, train_step};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with online SGD for `config.epochs` epochs and returns
/// the mean training loss of the **last completed epoch**.
///
/// # Arguments
/// - `network` — mutable reference to the network; modified in place
/// - `train`   — training partition
/// - `valid`   — optional validation partition, evaluated after every epoch
/// - `config`  — hyperparameters, optional progress channel, optional stop flag
/// - `rng`     — drives the per-epoch shuffle
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
pub fn train_loop<R: Rng + ?Sized>(
    network: &mut Network,
    train: &Partition,
    valid: Option<&Partition>,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<f64> {
    config.validate()?;
    if train.is_empty() {
        return Err(NnError::InvalidConfig("training partition is empty".to_owned()));
    }

    let mut last_train_loss = 0.0;
    let mut order: Vec<usize> = (0..train.len()).collect();

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            break;
        }

        let t_start = Instant::now();
        let learning_rate = config.learning_rate_at(epoch);

        // ── One pass over the training data ────────────────────────────────
        if config.shuffle {
            order.shuffle(rng);
        }
        let steps = config
            .max_steps_per_epoch
            .map_or(order.len(), |cap| cap.min(order.len()));

        let mut total_loss = 0.0;
        for &idx in &order[..steps] {
            let input = &train.inputs[idx];
            let target = &train.targets[idx];
            total_loss += train_step(network, input, target, learning_rate)?;
        }
        let train_loss = total_loss / steps as f64;
        last_train_loss = train_loss;
        if !train_loss.is_finite() {
            warn!(epoch, train_loss, "training loss is not finite");
        }

        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        // ── Validation ────────────────────────────────────────────────────
        let (val_loss, val_accuracy) = match valid {
            Some(v) if !v.is_empty() => {
                let eval = evaluate(network, v)?;
                (Some(eval.loss), Some(eval.accuracy))
            }
            _ => (None, None),
        };

        info!(
            epoch,
            total_epochs = config.epochs,
            learning_rate,
            train_loss,
            val_loss = ?val_loss,
            val_accuracy = ?val_accuracy,
            elapsed_ms,
            "epoch finished"
        );

        // ── Emit progress ─────────────────────────────────────────────────
        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            learning_rate,
            steps,
            train_loss,
            val_loss,
            val_accuracy,
            elapsed_ms,
        };

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }

        // Check stop flag again after potentially expensive eval.
        if stop_requested(config) {
            break;
        }
    }

    Ok(last_train_loss)
}

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}
