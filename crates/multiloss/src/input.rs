//! Inputs accepted by [`MultiLoss::forward`](crate::MultiLoss::forward).
//!
//! Training loops sometimes hand over labels that never made it onto a device,
//! e.g. a plain list of targets read from disk. Those are represented here so
//! the aggregator can reject them with a typed error instead of silently
//! producing nothing.

use std::any::type_name;

use burn::tensor::{backend::Backend, Tensor};

/// A prediction or label passed to the aggregator.
#[derive(Debug, Clone)]
pub enum LossInput<B: Backend, const D: usize> {
    /// A framework tensor.
    Tensor(Tensor<B, D>),
    /// Plain host-side values that were never turned into a tensor.
    Values(Vec<f64>),
}

impl<B: Backend, const D: usize> LossInput<B, D> {
    /// Runtime type name, used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Self::Tensor(_) => type_name::<Tensor<B, D>>().to_owned(),
            Self::Values(_) => type_name::<Vec<f64>>().to_owned(),
        }
    }

    /// Returns `true` for the tensor variant.
    pub const fn is_tensor(&self) -> bool {
        matches!(self, Self::Tensor(_))
    }
}

impl<B: Backend, const D: usize> From<Tensor<B, D>> for LossInput<B, D> {
    fn from(tensor: Tensor<B, D>) -> Self {
        Self::Tensor(tensor)
    }
}

impl<B: Backend, const D: usize> From<Vec<f64>> for LossInput<B, D> {
    fn from(values: Vec<f64>) -> Self {
        Self::Values(values)
    }
}
