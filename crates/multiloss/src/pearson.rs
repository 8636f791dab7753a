//! Correlation-based loss.
//!
//! Rewards predictions whose profile follows the target, independent of scale
//! and offset. For every row the Pearson correlation coefficient is computed:
//! ```text
//! r = Σ(vx * vy) / (sqrt(Σ vx²) * sqrt(Σ vy²) + eps),  vx = x - mean(x), vy = y - mean(y)
//! ```
//! and the loss is `1 - mean(r)`, ranging from 0 (perfect correlation) to 2
//! (perfect anti-correlation).

use burn::{
    config::Config,
    module::{Content, DisplaySettings, Module, ModuleDisplay},
    tensor::{backend::Backend, Tensor},
};

use crate::function::LossFunction;

/// Configuration for creating a [Pearson correlation loss](PearsonLoss).
#[derive(Config, Debug)]
pub struct PearsonLossConfig {
    /// Small value added to the denominator for constant rows. Default: 1e-8
    #[config(default = 1e-8)]
    pub eps: f64,
}

impl PearsonLossConfig {
    /// Initialize [Pearson correlation loss](PearsonLoss).
    pub fn init(&self) -> PearsonLoss {
        self.assertions();
        PearsonLoss { eps: self.eps }
    }

    fn assertions(&self) {
        assert!(
            self.eps >= 0.0,
            "Epsilon for PearsonLoss must be non-negative, got {}",
            self.eps
        );
    }
}

/// Pearson correlation loss over the last axis.
#[derive(Module, Clone, Debug)]
#[module(custom_display)]
pub struct PearsonLoss {
    /// Denominator stabilizer.
    pub eps: f64,
}

impl Default for PearsonLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleDisplay for PearsonLoss {
    fn custom_settings(&self) -> Option<DisplaySettings> {
        DisplaySettings::new()
            .with_new_line_after_attribute(false)
            .optional()
    }

    fn custom_content(&self, content: Content) -> Option<Content> {
        content.add("eps", &self.eps).optional()
    }
}

impl PearsonLoss {
    /// Create a new Pearson loss with default configuration.
    pub fn new() -> Self {
        PearsonLossConfig::new().init()
    }

    /// Compute `1 - mean(r)` over all rows.
    ///
    /// # Shapes
    ///
    /// - predictions: `[rows, features]`
    /// - targets: `[rows, features]`
    /// - output: `[1]`
    pub fn forward<B: Backend>(
        &self,
        predictions: Tensor<B, 2>,
        targets: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        self.correlation(predictions, targets)
            .mean()
            .neg()
            .add_scalar(1.0)
    }

    /// Per-row Pearson correlation coefficient.
    ///
    /// # Shapes
    ///
    /// - predictions: `[rows, features]`
    /// - targets: `[rows, features]`
    /// - output: `[rows]`
    pub fn correlation<B: Backend>(
        &self,
        predictions: Tensor<B, 2>,
        targets: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        self.assertions(&predictions, &targets);
        let [rows, _] = predictions.dims();

        let vx = predictions.clone() - predictions.mean_dim(1);
        let vy = targets.clone() - targets.mean_dim(1);

        let covariance = (vx.clone() * vy.clone()).sum_dim(1);
        let spread = vx.powf_scalar(2.0).sum_dim(1).sqrt() * vy.powf_scalar(2.0).sum_dim(1).sqrt();

        (covariance / spread.add_scalar(self.eps)).reshape([rows])
    }

    fn assertions<B: Backend>(&self, predictions: &Tensor<B, 2>, targets: &Tensor<B, 2>) {
        let pred_dims = predictions.dims();
        let target_dims = targets.dims();
        assert_eq!(
            pred_dims, target_dims,
            "Shape of predictions ({pred_dims:?}) must match targets ({target_dims:?})"
        );
    }
}

impl<B: Backend> LossFunction<B> for PearsonLoss {
    fn forward(&self, predictions: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        PearsonLoss::forward(self, predictions, targets)
    }

    fn to_device(self: Box<Self>, device: &B::Device) -> Box<dyn LossFunction<B>> {
        Box::new(Module::<B>::to_device(*self, device))
    }
}
