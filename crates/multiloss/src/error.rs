//! Error types for multi-loss construction and evaluation.

use std::path::PathBuf;

use thiserror::Error;

/// Broad category of a [`MultiLossError`].
///
/// Lets a training loop tell configuration mistakes apart from bad inputs
/// without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The aggregator was configured inconsistently or used in the wrong mode.
    Configuration,
    /// An argument had the wrong kind (loss-type list, input type).
    Type,
    /// An argument had the right kind but an unusable value (shapes, empty lists).
    Value,
    /// A loss-type name could not be turned into a loss function.
    Resolution,
    /// Reading or writing a configuration file failed.
    Io,
}

/// Errors that can occur while building or evaluating a [`MultiLoss`](crate::MultiLoss).
#[derive(Debug, Error)]
pub enum MultiLossError {
    /// Weight list and loss-type list have different lengths.
    #[error("loss_types and weights should have same length: {loss_types} loss types, {weights} weights")]
    WeightCountMismatch {
        /// Number of configured loss types.
        loss_types: usize,
        /// Number of configured weights.
        weights: usize,
    },

    /// The aggregator was built without loss types and cannot be evaluated.
    #[error(
        "no valid loss_types provided at construction; only the individual loss constructors can be used"
    )]
    Unconfigured,

    /// A configuration document does not describe a valid loss specification.
    #[error("loss_types should be a string or a sequence of strings, weights a number or a sequence of numbers")]
    InvalidSpec {
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Prediction is a tensor but the label is not.
    #[error("Type mismatch: {pred} and {label} provided")]
    TypeMismatch {
        /// Runtime type of the prediction.
        pred: String,
        /// Runtime type of the label.
        label: String,
    },

    /// The prediction is not a framework tensor.
    #[error("unsupported prediction input: {found}; predictions must be tensors")]
    UnsupportedInput {
        /// Runtime type of the prediction.
        found: String,
    },

    /// Prediction and label shapes differ.
    #[error("Input tensors have mismatch shape: {pred:?} and {label:?}")]
    ShapeMismatch {
        /// Shape of the prediction.
        pred: Vec<usize>,
        /// Shape of the label.
        label: Vec<usize>,
    },

    /// A multi-output evaluation was requested with no outputs.
    #[error("outputs cannot be empty - at least one (prediction, label) pair is required")]
    EmptyOutputs,

    /// A loss-type name is not present in the registry.
    #[error("unknown loss type '{name}', expected one of {known:?}")]
    UnknownLossType {
        /// The name that failed to resolve.
        name: String,
        /// Names known to the registry.
        known: Vec<String>,
    },

    /// Reading or writing a configuration file failed.
    #[error("failed to access configuration file: {path}")]
    Io {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl MultiLossError {
    /// Returns the category this error belongs to.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::WeightCountMismatch { .. } | Self::Unconfigured => ErrorKind::Configuration,
            Self::InvalidSpec { .. } | Self::TypeMismatch { .. } | Self::UnsupportedInput { .. } => {
                ErrorKind::Type
            }
            Self::ShapeMismatch { .. } | Self::EmptyOutputs => ErrorKind::Value,
            Self::UnknownLossType { .. } => ErrorKind::Resolution,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

/// A specialized `Result` type for multi-loss operations.
pub type MultiLossResult<T> = Result<T, MultiLossError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_message_contains_both_shapes() {
        let err = MultiLossError::ShapeMismatch {
            pred: vec![4, 1],
            label: vec![4],
        };

        assert_eq!(
            err.to_string(),
            "Input tensors have mismatch shape: [4, 1] and [4]"
        );
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn configuration_errors_share_a_kind() {
        let mismatch = MultiLossError::WeightCountMismatch {
            loss_types: 2,
            weights: 3,
        };

        assert_eq!(mismatch.kind(), ErrorKind::Configuration);
        assert_eq!(MultiLossError::Unconfigured.kind(), ErrorKind::Configuration);
        assert!(mismatch.to_string().contains("2 loss types, 3 weights"));
    }
}
