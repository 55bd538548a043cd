//! Layer-width description of the approximating network.

use crate::error::PinnError;

/// Default hidden widths: three layers of 50 units.
pub const DEFAULT_LAYERS: [usize; 5] = [2, 50, 50, 50, 1];

/// Sequence of layer widths, inputs first.
///
/// The first width is the input dimension (S and t) and must be 2; the last
/// is the scalar value and must be 1.
///
/// # Examples
/// ```
/// use pricer_pinn::network::Architecture;
///
/// let arch = Architecture::new(vec![2, 20, 20, 1]).unwrap();
/// assert_eq!(arch.num_dense_layers(), 3);
/// assert_eq!(arch.num_parameters(), 2 * 20 + 20 + 20 * 20 + 20 + 20 + 1);
///
/// assert!(Architecture::new(vec![3, 10, 1]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Architecture {
    layers: Vec<usize>,
}

impl Architecture {
    /// Validates and wraps a list of layer widths.
    ///
    /// # Errors
    /// `PinnError::InvalidConfig` if there are fewer than two layers, the
    /// first width is not 2, the last is not 1, or any width is zero.
    pub fn new(layers: Vec<usize>) -> Result<Self, PinnError> {
        let invalid = |message: String| PinnError::InvalidConfig {
            name: "layers",
            message,
        };
        if layers.len() < 2 {
            return Err(invalid(format!("need at least 2 layers, got {}", layers.len())));
        }
        if layers[0] != 2 {
            return Err(invalid(format!("input layer must have width 2, got {}", layers[0])));
        }
        if layers[layers.len() - 1] != 1 {
            return Err(invalid(format!(
                "output layer must have width 1, got {}",
                layers[layers.len() - 1]
            )));
        }
        if let Some(pos) = layers.iter().position(|&w| w == 0) {
            return Err(invalid(format!("layer {} has zero width", pos)));
        }
        Ok(Self { layers })
    }

    /// Layer widths, inputs first.
    #[inline]
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    /// Number of weight matrices.
    #[inline]
    pub fn num_dense_layers(&self) -> usize {
        self.layers.len() - 1
    }

    /// (fan_in, fan_out) of every dense layer.
    pub fn fans(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.layers.windows(2).map(|w| (w[0], w[1]))
    }

    /// Shapes of the parameter tensors in order `[W0, b0, W1, b1, ...]`.
    pub fn parameter_shapes(&self) -> Vec<(usize, usize)> {
        self.fans()
            .flat_map(|(fan_in, fan_out)| [(fan_in, fan_out), (1, fan_out)])
            .collect()
    }

    /// Total number of scalar parameters.
    pub fn num_parameters(&self) -> usize {
        self.fans().map(|(fan_in, fan_out)| (fan_in + 1) * fan_out).sum()
    }
}

impl Default for Architecture {
    fn default() -> Self {
        Self {
            layers: DEFAULT_LAYERS.to_vec(),
        }
    }
}
