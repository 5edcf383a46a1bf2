use serde::{Deserialize, Serialize};

use crate::error::{NnError, Result};

/// Partition sizes and vector widths the loader must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub n_train: usize,
    pub n_valid: usize,
    pub n_test: usize,
    pub input_width: usize,
    pub classes: usize,
}

impl DatasetConfig {
    /// 54,000 / 6,000 / 10,000 examples of 28×28 pixels in 10 classes.
    pub fn mnist() -> DatasetConfig {
        DatasetConfig {
            n_train: 54_000,
            n_valid: 6_000,
            n_test: 10_000,
            input_width: 784,
            classes: 10,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig::mnist()
    }
}

/// Input vectors paired with one-hot targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<Vec<f64>>,
}

impl Partition {
    pub fn new(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Result<Partition> {
        if inputs.len() != targets.len() {
            return Err(NnError::dimension("partition targets", inputs.len(), targets.len()));
        }
        Ok(Partition { inputs, targets })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<(&[f64], &[f64])> {
        Some((self.inputs.get(i)?.as_slice(), self.targets.get(i)?.as_slice()))
    }

    pub fn push(&mut self, input: Vec<f64>, target: Vec<f64>) {
        self.inputs.push(input);
        self.targets.push(target);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> {
        self.inputs
            .iter()
            .zip(self.targets.iter())
            .map(|(x, t)| (x.as_slice(), t.as_slice()))
    }
}

/// Training, validation and test partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub train: Partition,
    pub valid: Partition,
    pub test: Partition,
    pub input_width: usize,
    pub classes: usize,
}

/// One-hot vector of length `classes` with a 1 at `class`.
pub fn one_hot(class: usize, classes: usize) -> Result<Vec<f64>> {
    if class >= classes {
        return Err(NnError::Dataset(format!(
            "class index {} is out of range for {} classes",
            class, classes
        )));
    }
    let mut v = vec![0.0; classes];
    v[class] = 1.0;
    Ok(v)
}

/// Index of the maximum element in a slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
