/// Squared-error loss, the objective the network's backpropagation differentiates.
pub struct SquaredError;

impl SquaredError {
    /// Scalar loss: sum((predicted - expected)²)
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum()
    }

    /// Per-output gradient: predicted - expected
    ///
    /// This is the derivative of half the scalar loss, matching the error
    /// term the output layer feeds into its local gradient.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| a - b)
            .collect()
    }
}
