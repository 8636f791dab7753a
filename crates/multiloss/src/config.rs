//! Configuration of a [`MultiLoss`](crate::MultiLoss).
//!
//! Loss types and weights accept either a single value or a list, both from
//! Rust and from JSON:
//!
//! ```json
//! { "loss_types": ["mse", "pearsonloss"], "weights": [1.0, 0.5] }
//! { "loss_types": "bce" }
//! ```

use std::{fs, path::Path};

use burn::config::Config;
use serde::{Deserialize, Serialize};

use crate::error::{MultiLossError, MultiLossResult};

/// One loss-type name or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LossTypes {
    /// A single loss type.
    One(String),
    /// Several loss types, evaluated in this order.
    Many(Vec<String>),
}

impl LossTypes {
    /// The names as an ordered sequence.
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::One(name) => vec![name.clone()],
            Self::Many(names) => names.clone(),
        }
    }
}

impl From<&str> for LossTypes {
    fn from(name: &str) -> Self {
        Self::One(name.to_owned())
    }
}

impl From<String> for LossTypes {
    fn from(name: String) -> Self {
        Self::One(name)
    }
}

impl From<Vec<String>> for LossTypes {
    fn from(names: Vec<String>) -> Self {
        Self::Many(names)
    }
}

impl From<Vec<&str>> for LossTypes {
    fn from(names: Vec<&str>) -> Self {
        Self::Many(names.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for LossTypes {
    fn from(names: [&str; N]) -> Self {
        Self::Many(names.into_iter().map(str::to_owned).collect())
    }
}

/// One weight or an ordered list matching the loss types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LossWeights {
    /// A single weight.
    One(f64),
    /// One weight per loss type.
    Many(Vec<f64>),
}

impl LossWeights {
    /// The weights as an ordered sequence.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::One(weight) => vec![*weight],
            Self::Many(weights) => weights.clone(),
        }
    }
}

impl From<f64> for LossWeights {
    fn from(weight: f64) -> Self {
        Self::One(weight)
    }
}

impl From<Vec<f64>> for LossWeights {
    fn from(weights: Vec<f64>) -> Self {
        Self::Many(weights)
    }
}

impl<const N: usize> From<[f64; N]> for LossWeights {
    fn from(weights: [f64; N]) -> Self {
        Self::Many(weights.to_vec())
    }
}

/// Configuration for creating a [`MultiLoss`](crate::MultiLoss).
#[derive(Config, Debug)]
pub struct MultiLossConfig {
    /// Loss types to aggregate. `None` builds a bare aggregator that can only
    /// hand out individual loss functions.
    #[config(default = "None")]
    pub loss_types: Option<LossTypes>,

    /// Per-term weights. `None` weighs every term with 1.0.
    #[config(default = "None")]
    pub weights: Option<LossWeights>,

    /// Fail construction on unknown loss types instead of dropping them.
    /// `None` behaves like `Some(false)`.
    #[config(default = "None")]
    pub strict: Option<bool>,
}

impl MultiLossConfig {
    /// Configuration aggregating `loss_types` with unit weights.
    pub fn of(loss_types: impl Into<LossTypes>) -> Self {
        Self::new().with_loss_types(Some(loss_types.into()))
    }

    /// Whether unknown loss types fail construction.
    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    /// Sets the per-term weights.
    #[must_use]
    pub fn weighted(self, weights: impl Into<LossWeights>) -> Self {
        self.with_weights(Some(weights.into()))
    }

    /// The normalized `(name, weight)` pairs, or `None` for a bare aggregator.
    ///
    /// An empty loss-type list counts as no loss types, and an empty weight
    /// list counts as no weights.
    ///
    /// # Errors
    ///
    /// Returns [`MultiLossError::WeightCountMismatch`] if the number of weights
    /// does not match the number of loss types.
    pub fn terms(&self) -> MultiLossResult<Option<Vec<(String, f64)>>> {
        let names = match &self.loss_types {
            Some(loss_types) => loss_types.names(),
            None => return Ok(None),
        };
        if names.is_empty() {
            return Ok(None);
        }

        let weights = match self.weights.as_ref().map(LossWeights::values) {
            Some(weights) if !weights.is_empty() => weights,
            _ => vec![1.0; names.len()],
        };

        if weights.len() != names.len() {
            return Err(MultiLossError::WeightCountMismatch {
                loss_types: names.len(),
                weights: weights.len(),
            });
        }

        Ok(Some(names.into_iter().zip(weights).collect()))
    }

    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`MultiLossError::InvalidSpec`] if `loss_types` is neither a
    /// string nor a list of strings, `weights` is neither a number nor a list
    /// of numbers, or the document is not valid JSON.
    pub fn from_json(json: &str) -> MultiLossResult<Self> {
        serde_json::from_str(json).map_err(|source| MultiLossError::InvalidSpec { source })
    }

    /// Loads a configuration from a JSON file.
    ///
    /// Unlike [`Config::load`], missing optional keys take their defaults and
    /// failures are reported as [`MultiLossError`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> MultiLossResult<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path).map_err(|source| MultiLossError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&config_str)
    }

    /// Saves this configuration to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: impl AsRef<Path>) -> MultiLossResult<()> {
        let path = path.as_ref();
        let config_str = serde_json::to_string_pretty(self)
            .map_err(|source| MultiLossError::InvalidSpec { source })?;
        fs::write(path, config_str).map_err(|source| MultiLossError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
