//! Binary cross-entropy on probabilities.
//!
//! Creates a criterion that measures the binary cross-entropy between predicted
//! probabilities and (possibly soft) targets in `[0, 1]`.
//!
//! The unreduced loss is:
//! `L = {l_1, ..., l_N}` where `l_n = -(y_n * ln(x_n) + (1 - y_n) * ln(1 - x_n))`
//!
//! Each logarithm is clamped to be at least `-100`, so saturated predictions
//! (`x_n` equal to 0 or 1) still produce a finite loss.
//!
//! Burn's own `BinaryCrossEntropyLoss` takes integer targets; this one keeps the
//! targets as floats so the same label tensor can feed every aggregated term.

use burn::{
    module::Module,
    nn::loss::Reduction,
    tensor::{backend::Backend, Tensor},
};

use crate::function::LossFunction;

const LOG_CLAMP: f64 = -100.0;

/// Binary cross-entropy on probabilities with float targets.
///
/// Carries no weight of its own; scaling belongs to the aggregating
/// [`MultiLoss`](crate::MultiLoss) term.
#[derive(Module, Clone, Debug, Default)]
pub struct BceLoss;

impl BceLoss {
    /// Create a new BCE loss.
    pub const fn new() -> Self {
        Self
    }

    /// Compute the criterion on the input tensor with reduction.
    ///
    /// # Shapes
    ///
    /// - predictions: `[...dims]` (any shape, values in `[0, 1]`)
    /// - targets: `[...dims]` (same shape as predictions)
    /// - output: `[1]`
    pub fn forward<const D: usize, B: Backend>(
        &self,
        predictions: Tensor<B, D>,
        targets: Tensor<B, D>,
        reduction: Reduction,
    ) -> Tensor<B, 1> {
        let loss = self.forward_no_reduction(predictions, targets);
        match reduction {
            Reduction::Mean | Reduction::Auto => loss.mean(),
            Reduction::Sum => loss.sum(),
        }
    }

    /// Compute the criterion on the input tensor without reduction.
    ///
    /// # Shapes
    ///
    /// - predictions: `[...dims]` (any shape, values in `[0, 1]`)
    /// - targets: `[...dims]` (same shape as predictions)
    /// - output: `[...dims]` (same shape as input)
    pub fn forward_no_reduction<const D: usize, B: Backend>(
        &self,
        predictions: Tensor<B, D>,
        targets: Tensor<B, D>,
    ) -> Tensor<B, D> {
        self.assertions(&predictions, &targets);

        let log_p = predictions.clone().log().clamp_min(LOG_CLAMP);
        let log_not_p = predictions.neg().add_scalar(1.0).log().clamp_min(LOG_CLAMP);
        let not_targets = targets.clone().neg().add_scalar(1.0);

        (targets * log_p + not_targets * log_not_p).neg()
    }

    fn assertions<const D: usize, B: Backend>(
        &self,
        predictions: &Tensor<B, D>,
        targets: &Tensor<B, D>,
    ) {
        let pred_dims = predictions.dims();
        let target_dims = targets.dims();
        assert_eq!(
            pred_dims, target_dims,
            "Shape of predictions ({pred_dims:?}) must match targets ({target_dims:?})"
        );
    }
}

impl<B: Backend> LossFunction<B> for BceLoss {
    fn forward(&self, predictions: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        BceLoss::forward(self, predictions, targets, Reduction::Mean)
    }

    fn to_device(self: Box<Self>, device: &B::Device) -> Box<dyn LossFunction<B>> {
        Box::new(Module::<B>::to_device(*self, device))
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::{cast::ToElement, ops::FloatElem, TensorData, Tolerance, Transaction};

    use super::*;
    use crate::tests::TestBackend;

    type FT = FloatElem<TestBackend>;

    #[test]
    fn bce_loss_matches_hand_computed_values() {
        let device = Default::default();
        let loss = BceLoss::new();

        let pred = Tensor::<TestBackend, 1>::from_data(TensorData::from([0.8, 0.4]), &device);
        let target = Tensor::<TestBackend, 1>::from_data(TensorData::from([1.0, 0.0]), &device);

        let result_mean = loss.forward(pred.clone(), target.clone(), Reduction::Mean);
        let result_sum = loss.forward(pred.clone(), target.clone(), Reduction::Sum);
        let result_no_reduction = loss.forward_no_reduction(pred, target);

        let [mean_data, sum_data, no_reduction_data] = Transaction::default()
            .register(result_mean)
            .register(result_sum)
            .register(result_no_reduction)
            .execute()
            .try_into()
            .expect("Correct amount of tensor data");

        let l0 = -(0.8f64).ln();
        let l1 = -(0.6f64).ln();

        no_reduction_data.assert_approx_eq::<FT>(
            &TensorData::from([l0 as f32, l1 as f32]),
            Tolerance::relative(1e-5),
        );
        mean_data.assert_approx_eq::<FT>(
            &TensorData::from([((l0 + l1) / 2.0) as f32]),
            Tolerance::relative(1e-5),
        );
        sum_data.assert_approx_eq::<FT>(
            &TensorData::from([(l0 + l1) as f32]),
            Tolerance::relative(1e-5),
        );
    }

    #[test]
    fn bce_loss_accepts_soft_targets() {
        let device = Default::default();
        let loss = BceLoss::new();

        let pred = Tensor::<TestBackend, 1>::from_floats([0.5], &device);
        let target = Tensor::<TestBackend, 1>::from_floats([0.5], &device);

        // -(0.5 ln 0.5 + 0.5 ln 0.5) = ln 2
        let expected = TensorData::from([std::f32::consts::LN_2]);
        loss.forward(pred, target, Reduction::Mean)
            .into_data()
            .assert_approx_eq::<FT>(&expected, Tolerance::relative(1e-5));
    }

    #[test]
    fn bce_loss_clamps_saturated_predictions() {
        let device = Default::default();
        let loss = BceLoss::new();

        let pred = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0], &device);
        let target = Tensor::<TestBackend, 1>::from_floats([1.0, 0.0], &device);

        let value = loss
            .forward(pred, target, Reduction::Mean)
            .into_scalar()
            .to_f64();

        assert!(value.is_finite());
        assert!((value - 100.0).abs() < 1e-3, "expected clamped loss, got {value}");
    }

    #[test]
    fn bce_loss_auto_reduction_equals_mean_reduction() {
        let device = Default::default();
        let loss = BceLoss::new();

        let pred = Tensor::<TestBackend, 1>::from_floats([0.3, 0.9], &device);
        let target = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0], &device);

        let [auto_data, mean_data] = Transaction::default()
            .register(loss.forward(pred.clone(), target.clone(), Reduction::Auto))
            .register(loss.forward(pred, target, Reduction::Mean))
            .execute()
            .try_into()
            .expect("Correct amount of tensor data");

        auto_data.assert_approx_eq::<FT>(&mean_data, Tolerance::default());
    }

    #[test]
    #[should_panic = "Shape of predictions"]
    fn bce_loss_mismatched_shapes_panics() {
        let device = Default::default();
        let loss = BceLoss::new();

        let pred = Tensor::<TestBackend, 1>::zeros([2], &device);
        let target = Tensor::<TestBackend, 1>::zeros([3], &device);

        let _result = loss.forward_no_reduction(pred, target);
    }
}
