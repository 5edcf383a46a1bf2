// Finite-difference checks of the gradients produced by backpropagation.
// Loss is half the summed squared error, whose output derivative is
// (output - target).

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use sigmoid_mlp::{Network, NumericPolicy, SquaredError};

const EPSILON: f64 = 1e-5;
const TOLERANCE: f64 = 1e-7;

fn half_loss(net: &mut Network, x: &[f64], t: &[f64]) -> f64 {
    let out = net.forward(x).unwrap();
    0.5 * SquaredError::loss(out, t)
}

fn numerical_gradient(
    net: &mut Network,
    x: &[f64],
    t: &[f64],
    layer: usize,
    row: usize,
    col: usize,
) -> f64 {
    let w = net.layers()[layer].weights().data[row][col];

    net.layers_mut()[layer].set_weight(row, col, w + EPSILON).unwrap();
    let plus = half_loss(net, x, t);
    net.layers_mut()[layer].set_weight(row, col, w - EPSILON).unwrap();
    let minus = half_loss(net, x, t);
    net.layers_mut()[layer].set_weight(row, col, w).unwrap();

    (plus - minus) / (2.0 * EPSILON)
}

fn setup(widths: &[usize]) -> (Network, Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(11);
    let mut net = Network::with_widths(widths, NumericPolicy::Clamp, &mut rng).unwrap();
    // larger weights so the gradients are not all near zero
    for layer in net.layers_mut() {
        let (rows, cols) = (layer.weights().rows, layer.weights().cols);
        for j in 0..rows {
            for i in 0..cols {
                let w = layer.weights().data[j][i];
                layer.set_weight(j, i, w * 20.0).unwrap();
            }
        }
    }
    let input: Vec<f64> = (0..widths[0]).map(|i| (i as f64 * 0.37).sin()).collect();
    let mut target = vec![0.0; widths[widths.len() - 1]];
    target[1] = 1.0;
    (net, input, target)
}

#[test]
fn first_layer_gradient_matches_finite_differences() {
    let (mut net, x, t) = setup(&[5, 4, 3]);
    net.forward(&x).unwrap();
    net.backpropagate(&x, &t).unwrap();
    let analytic = net.layers()[0].gradient().clone();

    for row in 0..analytic.rows {
        for col in 0..analytic.cols {
            let numeric = numerical_gradient(&mut net, &x, &t, 0, row, col);
            assert_abs_diff_eq!(analytic.data[row][col], numeric, epsilon = TOLERANCE);
        }
    }
}

#[test]
fn output_layer_gradient_matches_finite_differences() {
    let (mut net, x, t) = setup(&[5, 4, 3]);
    net.forward(&x).unwrap();
    net.backpropagate(&x, &t).unwrap();
    let analytic = net.layers()[1].gradient().clone();

    for row in 0..analytic.rows {
        for col in 0..analytic.cols {
            let numeric = numerical_gradient(&mut net, &x, &t, 1, row, col);
            assert_abs_diff_eq!(analytic.data[row][col], numeric, epsilon = TOLERANCE);
        }
    }
}

#[test]
fn deep_network_gradient_matches_finite_differences() {
    let (mut net, x, t) = setup(&[4, 5, 4, 3, 2]);
    net.forward(&x).unwrap();
    net.backpropagate(&x, &t).unwrap();

    for layer in 0..4 {
        let analytic = net.layers()[layer].gradient().clone();
        for row in 0..analytic.rows {
            for col in 0..analytic.cols {
                let numeric = numerical_gradient(&mut net, &x, &t, layer, row, col);
                assert_abs_diff_eq!(analytic.data[row][col], numeric, epsilon = TOLERANCE);
            }
        }
    }
}

#[test]
fn returned_error_is_input_layer_bias_gradient() {
    let (mut net, x, t) = setup(&[5, 4, 3]);
    net.forward(&x).unwrap();
    let error = net.backpropagate(&x, &t).unwrap();
    let gradient = net.layers()[0].gradient();

    assert_eq!(error.len(), 4);
    for (j, e) in error.iter().enumerate() {
        assert_eq!(*e, gradient.data[j][5]);
    }
}
