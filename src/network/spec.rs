use serde::{Deserialize, Serialize};

use crate::activation::NumericPolicy;
use crate::error::{NnError, Result};
use crate::layers::dense::DEFAULT_INIT_RANGE;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`       — number of neurons in this layer
/// - `input_size` — number of neurons feeding into this layer (i.e. the output
///                  size of the previous layer, or the raw input dimension for
///                  the first layer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
}

/// A serializable description of a network architecture and how to
/// initialize it.
///
/// Widths are checked when the network is built, so a spec read from JSON may
/// still violate the chaining invariant; `validate` reports that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    /// Half-width of the uniform weight initialization interval.
    #[serde(default = "default_init_range")]
    pub init_range: f64,
    /// Sigmoid overflow handling shared by every layer.
    #[serde(default)]
    pub numeric_policy: NumericPolicy,
    /// Seed for weight initialization; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_init_range() -> f64 {
    DEFAULT_INIT_RANGE
}

impl NetworkSpec {
    /// Chains `widths` into layers: `[784, 300, 10]` gives 784→300→10.
    pub fn from_widths(widths: &[usize]) -> Result<NetworkSpec> {
        if widths.len() < 2 {
            return Err(NnError::InvalidConfig(format!(
                "a network needs an input width and at least one layer, got {} widths",
                widths.len()
            )));
        }
        let layers = widths
            .windows(2)
            .map(|w| LayerSpec { input_size: w[0], size: w[1] })
            .collect();
        Ok(NetworkSpec {
            layers,
            init_range: DEFAULT_INIT_RANGE,
            numeric_policy: NumericPolicy::default(),
            seed: None,
        })
    }

    /// Checks that the spec describes a non-empty, correctly chained network.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NnError::InvalidConfig("network has no layers".to_owned()));
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].size != pair[1].input_size {
                return Err(NnError::dimension(
                    format!("input of layer {}", i + 1),
                    pair[0].size,
                    pair[1].input_size,
                ));
            }
        }
        Ok(())
    }

    pub fn input_size(&self) -> Option<usize> {
        self.layers.first().map(|l| l.input_size)
    }

    pub fn output_size(&self) -> Option<usize> {
        self.layers.last().map(|l| l.size)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
