//! The call contract shared by every aggregated loss function.
//!
//! Loss functions see their inputs as `[rows, features]`: any rank-`D` tensor
//! is flattened along all but its last axis before being handed over. Mean
//! reductions (MSE, BCE) are unaffected by this, and row-wise losses such as
//! [`PearsonLoss`](crate::PearsonLoss) treat each row as one sample.

use std::fmt;

use burn::{
    module::Module,
    nn::loss::{MseLoss, Reduction},
    tensor::{backend::Backend, Tensor},
};

/// A loss function usable as a term of a [`MultiLoss`](crate::MultiLoss).
pub trait LossFunction<B: Backend>: fmt::Debug + Send + Sync {
    /// Computes the scalar loss for `[rows, features]` inputs.
    ///
    /// # Shapes
    ///
    /// - predictions: `[rows, features]`
    /// - targets: `[rows, features]`
    /// - output: `[1]`
    fn forward(&self, predictions: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1>;

    /// Moves the loss function and any state it holds to `device`.
    fn to_device(self: Box<Self>, device: &B::Device) -> Box<dyn LossFunction<B>>;
}

/// Flattens a rank-`D` tensor into `[rows, features]` along its last axis.
///
/// A rank-1 tensor of length `n` becomes a single row `[1, n]`.
pub fn into_rows<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Tensor<B, 2> {
    let dims = tensor.dims();
    let (features, leading) = match dims.split_last() {
        Some((last, leading)) => (*last, leading),
        None => (1, &[][..]),
    };
    let rows = leading.iter().product::<usize>();

    tensor.reshape([rows, features])
}

impl<B: Backend> LossFunction<B> for MseLoss {
    fn forward(&self, predictions: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        MseLoss::forward(self, predictions, targets, Reduction::Mean)
    }

    fn to_device(self: Box<Self>, device: &B::Device) -> Box<dyn LossFunction<B>> {
        Box::new(Module::<B>::to_device(*self, device))
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::{TensorData, Tolerance};

    use super::*;
    use crate::tests::TestBackend;

    #[test]
    fn into_rows_keeps_rank_one_as_single_row() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 1>::from_floats([1.0, 2.0, 3.0], &device);

        assert_eq!(into_rows(tensor).dims(), [1, 3]);
    }

    #[test]
    fn into_rows_merges_leading_axes() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 3>::zeros([2, 3, 5], &device);

        assert_eq!(into_rows(tensor).dims(), [6, 5]);
    }

    #[test]
    fn mse_term_computes_mean_squared_error() {
        let device = Default::default();
        let loss: Box<dyn LossFunction<TestBackend>> = Box::new(MseLoss::new());

        let pred = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0], [3.0, 4.0]], &device);
        let target = Tensor::<TestBackend, 2>::from_floats([[1.0, 1.0], [1.0, 1.0]], &device);

        // (0 + 1 + 4 + 9) / 4
        let expected = TensorData::from([3.5]);
        loss.forward(pred, target)
            .into_data()
            .assert_approx_eq::<f32>(&expected, Tolerance::default());
    }
}
