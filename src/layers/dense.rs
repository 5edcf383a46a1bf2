use std::fmt;

use rand::Rng;

use crate::activation::{sigmoid, sigmoid_derivative, NumericPolicy};
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Default half-width of the uniform weight initialization interval.
pub const DEFAULT_INIT_RANGE: f64 = 0.05;

/// Where a layer is in its per-example cycle.
///
/// `Idle → Forwarded → Gradiented → Idle`. A new forward pass is always
/// allowed and discards a pending gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Forwarded,
    Gradiented,
}

/// One fully-connected sigmoid layer.
///
/// `weights` has shape `size × (input_size + 1)`; the last column of each row
/// is that neuron's bias.
#[derive(Debug, Clone)]
pub struct Layer {
    pub input_size: usize,
    pub size: usize,
    weights: Matrix,
    gradient: Matrix,
    input: Vec<f64>,
    activations: Vec<f64>,
    outputs: Vec<f64>,
    error: Vec<f64>,
    policy: NumericPolicy,
    phase: Phase,
    index: usize,
}

impl Layer {
    /// Creates a layer with every weight drawn uniformly from
    /// `[-init_range, init_range]`.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        size: usize,
        init_range: f64,
        policy: NumericPolicy,
        rng: &mut R,
    ) -> Result<Layer> {
        if input_size == 0 || size == 0 {
            return Err(NnError::InvalidConfig(format!(
                "layer widths must be positive, got {} -> {}",
                input_size, size
            )));
        }
        if !init_range.is_finite() || init_range < 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "init_range must be a finite non-negative number, got {}",
                init_range
            )));
        }
        let weights = Matrix::uniform(size, input_size + 1, init_range, rng);
        Ok(Layer::with_weights(weights, policy))
    }

    /// Creates a layer from an explicit `size × (input_size + 1)` weight matrix.
    pub fn from_weights(weights: Matrix, policy: NumericPolicy) -> Result<Layer> {
        if weights.rows == 0 {
            return Err(NnError::InvalidConfig(
                "weight matrix needs at least one row".to_owned(),
            ));
        }
        if weights.data.len() != weights.rows {
            return Err(NnError::dimension("weight rows", weights.rows, weights.data.len()));
        }
        if weights.cols < 2 {
            return Err(NnError::InvalidConfig(format!(
                "weight matrix needs at least one input column plus bias, got {} columns",
                weights.cols
            )));
        }
        if let Some(bad) = weights.data.iter().find(|row| row.len() != weights.cols) {
            return Err(NnError::dimension("weight row", weights.cols, bad.len()));
        }
        Ok(Layer::with_weights(weights, policy))
    }

    fn with_weights(weights: Matrix, policy: NumericPolicy) -> Layer {
        let size = weights.rows;
        let input_size = weights.cols - 1;
        Layer {
            input_size,
            size,
            gradient: Matrix::zeros(size, input_size + 1),
            weights,
            input: Vec::with_capacity(input_size),
            activations: vec![0.0; size],
            outputs: vec![0.0; size],
            error: vec![0.0; size],
            policy,
            phase: Phase::Idle,
            index: 0,
        }
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Forward pass for this layer alone: `outputs = sigmoid(W·x + b)`.
    pub fn update_states(&mut self, x: &[f64]) -> Result<&[f64]> {
        self.check_input(x, "layer input")?;
        // A failed forward leaves the scratch buffers half-written.
        self.phase = Phase::Idle;
        self.input.clear();
        self.input.extend_from_slice(x);
        for j in 0..self.size {
            let row = self.weights.row(j);
            let mut sum = row[self.input_size];
            for (w, xi) in row[..self.input_size].iter().zip(x) {
                sum += w * xi;
            }
            self.activations[j] = sum;
            self.outputs[j] = sigmoid(sum, self.policy)?;
        }
        self.phase = Phase::Forwarded;
        Ok(&self.outputs)
    }

    /// Computes this layer's error and weight gradient.
    ///
    /// `x` must be the input of the preceding `update_states`; `upstream` is
    /// `∂Loss/∂output` for each neuron. Returns the layer's error vector.
    pub fn local_gradient(&mut self, x: &[f64], upstream: &[f64]) -> Result<&[f64]> {
        if self.phase == Phase::Idle {
            return Err(self.out_of_order("compute a gradient"));
        }
        self.check_input(x, "gradient input")?;
        if x.iter().map(|v| v.to_bits()).ne(self.input.iter().map(|v| v.to_bits())) {
            return Err(NnError::StaleInput { layer: self.index });
        }
        if upstream.len() != self.size {
            return Err(NnError::dimension(
                format!("layer {} upstream error", self.index),
                self.size,
                upstream.len(),
            ));
        }

        for j in 0..self.size {
            let e = upstream[j] * sigmoid_derivative(self.outputs[j]);
            self.error[j] = e;
            let grad_row = &mut self.gradient.data[j];
            for (g, xi) in grad_row[..self.input_size].iter_mut().zip(x) {
                *g = xi * e;
            }
            grad_row[self.input_size] = e;
        }
        self.phase = Phase::Gradiented;
        Ok(&self.error)
    }

    /// Folds this layer's error back through its weights (bias column
    /// excluded): `Σ_k weight[k][i] * error[k]` for every input `i`.
    pub fn fold_back(&self) -> Result<Vec<f64>> {
        if self.phase != Phase::Gradiented {
            return Err(self.out_of_order("fold back its error"));
        }
        let mut folded = vec![0.0; self.input_size];
        for (row, e) in self.weights.data.iter().zip(&self.error) {
            for (f, w) in folded.iter_mut().zip(&row[..self.input_size]) {
                *f += w * e;
            }
        }
        Ok(folded)
    }

    /// One gradient-descent step: `weight -= learning_rate * gradient`.
    pub fn adjust(&mut self, learning_rate: f64) -> Result<()> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "learning rate must be finite and positive, got {}",
                learning_rate
            )));
        }
        if self.phase != Phase::Gradiented {
            return Err(self.out_of_order("adjust weights"));
        }
        self.weights.sub_scaled(&self.gradient, learning_rate);
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Overwrites one weight; `col == input_size` addresses the bias.
    pub fn set_weight(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.size {
            return Err(NnError::dimension("weight row index bound", self.size, row));
        }
        if col > self.input_size {
            return Err(NnError::dimension("weight column index bound", self.input_size + 1, col));
        }
        self.weights.data[row][col] = value;
        Ok(())
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn gradient(&self) -> &Matrix {
        &self.gradient
    }

    pub fn activations(&self) -> &[f64] {
        &self.activations
    }

    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    pub fn error(&self) -> &[f64] {
        &self.error
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn policy(&self) -> NumericPolicy {
        self.policy
    }

    fn check_input(&self, x: &[f64], what: &str) -> Result<()> {
        if x.len() != self.input_size {
            return Err(NnError::dimension(
                format!("layer {} {}", self.index, what),
                self.input_size,
                x.len(),
            ));
        }
        Ok(())
    }

    fn out_of_order(&self, operation: &'static str) -> NnError {
        NnError::OutOfOrder {
            layer: self.index,
            operation,
            phase: self.phase,
        }
    }
}

/// Dumps the weight matrix one neuron per line, bias last.
impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "layer {}: {} -> {} ({:?})", self.index, self.input_size, self.size, self.policy())?;
        for row in &self.weights.data {
            let cells: Vec<String> = row.iter().map(|w| format!("{:.6}", w)).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}
