use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::activation::NumericPolicy;
use crate::error::{NnError, Result};
use crate::layers::dense::{Layer, Phase};
use crate::loss::squared_error::SquaredError;
use crate::network::spec::NetworkSpec;

/// An ordered chain of sigmoid layers trained by online backpropagation.
///
/// Adjacent widths are checked at construction, so every layer's output width
/// equals the next layer's input width.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Chains already-built layers, rejecting any width mismatch.
    pub fn from_layers(mut layers: Vec<Layer>) -> Result<Network> {
        if layers.is_empty() {
            return Err(NnError::InvalidConfig("network has no layers".to_owned()));
        }
        for i in 1..layers.len() {
            if layers[i - 1].size != layers[i].input_size {
                return Err(NnError::dimension(
                    format!("input of layer {}", i),
                    layers[i - 1].size,
                    layers[i].input_size,
                ));
            }
        }
        for (i, layer) in layers.iter_mut().enumerate() {
            layer.set_index(i);
        }
        let network = Network { layers };
        info!(widths = ?network.widths(), "built network");
        Ok(network)
    }

    /// Builds a network from `spec`, drawing initial weights from `rng`.
    ///
    /// `spec.seed` is ignored here; see `from_spec_seeded`.
    pub fn from_spec<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;
        let layers = spec
            .layers
            .iter()
            .map(|l| Layer::new(l.input_size, l.size, spec.init_range, spec.numeric_policy, rng))
            .collect::<Result<Vec<_>>>()?;
        Network::from_layers(layers)
    }

    /// Builds a network from `spec`, seeding a fresh generator from
    /// `spec.seed` or from entropy when it is absent.
    pub fn from_spec_seeded(spec: &NetworkSpec) -> Result<Network> {
        let mut rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Network::from_spec(spec, &mut rng)
    }

    /// Builds `widths[0] → widths[1] → … → widths[n]` with the default
    /// initialization range.
    pub fn with_widths<R: Rng + ?Sized>(
        widths: &[usize],
        policy: NumericPolicy,
        rng: &mut R,
    ) -> Result<Network> {
        let mut spec = NetworkSpec::from_widths(widths)?;
        spec.numeric_policy = policy;
        Network::from_spec(&spec, rng)
    }

    /// Forward pass; stores activations in each layer for backprop.
    pub fn forward(&mut self, x: &[f64]) -> Result<&[f64]> {
        for i in 0..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            let input = match done.last() {
                Some(prev) => prev.outputs(),
                None => x,
            };
            rest[0].update_states(input)?;
        }
        Ok(self.last().outputs())
    }

    /// Backpropagates the squared-error derivative for `target` from the
    /// output layer to the input layer, leaving every layer's gradient ready
    /// for `adjust`. `x` must be the input of the preceding `forward`.
    ///
    /// Returns the input layer's error vector.
    pub fn backpropagate(&mut self, x: &[f64], target: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.input_size() {
            return Err(NnError::dimension("network input", self.input_size(), x.len()));
        }
        if target.len() != self.output_size() {
            return Err(NnError::dimension("target", self.output_size(), target.len()));
        }

        let last = self.layers.len() - 1;
        let mut upstream = SquaredError::derivative(self.layers[last].outputs(), target);

        for i in (0..=last).rev() {
            let (done, rest) = self.layers.split_at_mut(i);
            let input = match done.last() {
                Some(prev) => prev.outputs(),
                None => x,
            };
            rest[0].local_gradient(input, &upstream)?;
            if i > 0 {
                upstream = rest[0].fold_back()?;
            }
        }
        debug!(depth = self.layers.len(), "backpropagated");
        Ok(self.layers[0].error().to_vec())
    }

    /// Applies one gradient-descent step to every layer.
    ///
    /// Either every layer is adjusted or none is.
    pub fn adjust(&mut self, learning_rate: f64) -> Result<()> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "learning rate must be finite and positive, got {}",
                learning_rate
            )));
        }
        if let Some((i, layer)) = self
            .layers
            .iter()
            .enumerate()
            .find(|(_, l)| l.phase() != Phase::Gradiented)
        {
            return Err(NnError::OutOfOrder {
                layer: i,
                operation: "adjust weights",
                phase: layer.phase(),
            });
        }
        for layer in &mut self.layers {
            layer.adjust(learning_rate)?;
        }
        Ok(())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access for weight surgery; widths cannot change through it.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size
    }

    pub fn output_size(&self) -> usize {
        self.last().size
    }

    /// `[input, hidden…, output]` widths.
    pub fn widths(&self) -> Vec<usize> {
        std::iter::once(self.input_size())
            .chain(self.layers.iter().map(|l| l.size))
            .collect()
    }

    fn last(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for layer in &self.layers {
            writeln!(f, "--------------------")?;
            write!(f, "{}", layer)?;
        }
        writeln!(f, "--------------------")
    }
}
