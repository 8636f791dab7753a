//! Configurable weighted multi-term loss aggregation for the Burn deep learning framework.
//!
//! This crate combines independent loss functions into one weighted scalar that
//! drives gradient-based optimization, and reports every term next to it for
//! logging.
//!
//! ## Loss Functions
//!
//! - **`mse`**: Burn's `MseLoss` with mean reduction
//! - **`bce`**: [`BceLoss`], binary cross-entropy on probabilities with float targets
//! - **`pearsonloss`**: [`PearsonLoss`], one minus the mean row-wise Pearson correlation
//!
//! Further loss types can be added through a [`LossRegistry`].
//!
//! ## Usage Example
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use multiloss::{MultiLossConfig, Placement};
//!
//! let device = Default::default();
//! let loss = MultiLossConfig::of(["mse", "bce"])
//!     .weighted([2.0, 3.0])
//!     .init::<NdArray>(&Placement::Unplaced)
//!     .expect("valid loss configuration");
//!
//! let pred = Tensor::<NdArray, 1>::from_floats([0.2, 0.7, 0.9], &device);
//! let label = Tensor::<NdArray, 1>::from_floats([0.0, 1.0, 1.0], &device);
//!
//! let (total, values) = loss.forward(pred, label).expect("matching inputs");
//! assert!(values.contains_key("total_loss"));
//! # let _ = total;
//! ```
//!
//! ## Modes
//!
//! An aggregator built without loss types is *bare*: it hands out individual
//! loss functions ([`MultiLoss::build`], [`MultiLoss::mse`], ...) but refuses to
//! be evaluated with [`MultiLossError::Unconfigured`].
//!
//! Unknown loss-type names are logged and dropped at construction unless
//! [`MultiLossConfig::strict`] is set.

mod bce;
mod config;
mod device;
mod error;
mod function;
mod input;
mod multi_loss;
mod pearson;
mod registry;
mod values;

pub use bce::BceLoss;
pub use config::{LossTypes, LossWeights, MultiLossConfig};
pub use device::Placement;
pub use error::{ErrorKind, MultiLossError, MultiLossResult};
pub use function::{into_rows, LossFunction};
pub use input::LossInput;
pub use multi_loss::MultiLoss;
pub use pearson::{PearsonLoss, PearsonLossConfig};
pub use registry::{LossFactory, LossRegistry, BCE, MSE, PEARSON};
pub use values::{LossValues, TOTAL_LOSS};

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    pub type TestBackend = NdArray;
}
