use tracing::debug;

use crate::data::dataset::{argmax, Partition};
use crate::error::Result;
use crate::loss::squared_error::SquaredError;
use crate::network::network::Network;

/// Loss and accuracy of a network on one partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Mean squared error per example.
    pub loss: f64,
    /// Fraction of examples whose largest output matches the target class.
    pub accuracy: f64,
}

/// One online SGD step: forward, backpropagate, adjust.
///
/// Returns the squared error of the prediction made before the update.
pub fn train_step(
    network: &mut Network,
    input: &[f64],
    target: &[f64],
    learning_rate: f64,
) -> Result<f64> {
    let loss = SquaredError::loss(network.forward(input)?, target);
    network.backpropagate(input, target)?;
    network.adjust(learning_rate)?;
    Ok(loss)
}

/// Trains repeatedly on a single example and returns the squared error seen
/// before each of the `steps` updates.
pub fn overfit_single(
    network: &mut Network,
    input: &[f64],
    target: &[f64],
    learning_rate: f64,
    steps: usize,
) -> Result<Vec<f64>> {
    let mut losses = Vec::with_capacity(steps);
    for step in 0..steps {
        let loss = train_step(network, input, target, learning_rate)?;
        debug!(step, loss, "single-example step");
        losses.push(loss);
    }
    Ok(losses)
}

/// Mean loss and argmax accuracy over `partition`, without touching weights.
pub fn evaluate(network: &mut Network, partition: &Partition) -> Result<Evaluation> {
    if partition.is_empty() {
        return Ok(Evaluation { loss: 0.0, accuracy: 0.0 });
    }
    let mut total_loss = 0.0;
    let mut correct = 0usize;
    for (input, target) in partition.iter() {
        let output = network.forward(input)?;
        total_loss += SquaredError::loss(output, target);
        if argmax(output) == argmax(target) {
            correct += 1;
        }
    }
    let n = partition.len() as f64;
    Ok(Evaluation {
        loss: total_loss / n,
        accuracy: correct as f64 / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::NumericPolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn train_step_reduces_loss_on_same_example() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut net = Network::with_widths(&[3, 4, 2], NumericPolicy::Clamp, &mut rng).unwrap();
        let x = [0.2, 0.9, -0.4];
        let t = [1.0, 0.0];
        let first = train_step(&mut net, &x, &t, 0.5).unwrap();
        let second = train_step(&mut net, &x, &t, 0.5).unwrap();
        assert!(second < first);
    }

    #[test]
    fn evaluate_counts_argmax_hits() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut net = Network::with_widths(&[2, 2], NumericPolicy::Clamp, &mut rng).unwrap();
        let out = net.forward(&[0.0, 0.0]).unwrap().to_vec();
        let predicted = argmax(&out);
        let mut hit = vec![0.0; 2];
        hit[predicted] = 1.0;
        let mut miss = vec![0.0; 2];
        miss[1 - predicted] = 1.0;

        let part = Partition::new(vec![vec![0.0, 0.0]; 2], vec![hit, miss]).unwrap();
        let eval = evaluate(&mut net, &part).unwrap();
        assert_eq!(eval.accuracy, 0.5);
        assert!(eval.loss > 0.0);
    }

    #[test]
    fn evaluate_empty_partition() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut net = Network::with_widths(&[2, 2], NumericPolicy::Clamp, &mut rng).unwrap();
        let eval = evaluate(&mut net, &Partition::default()).unwrap();
        assert_eq!(eval, Evaluation { loss: 0.0, accuracy: 0.0 });
    }
}
