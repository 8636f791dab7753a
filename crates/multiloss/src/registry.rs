//! Name → factory lookup for loss functions.

use std::fmt;

use burn::{nn::loss::MseLoss, tensor::backend::Backend};

use crate::{
    bce::BceLoss,
    error::{MultiLossError, MultiLossResult},
    function::LossFunction,
    pearson::PearsonLoss,
};

/// Identifier of the mean-squared-error loss.
pub const MSE: &str = "mse";
/// Identifier of the binary cross-entropy loss.
pub const BCE: &str = "bce";
/// Identifier of the Pearson correlation loss.
pub const PEARSON: &str = "pearsonloss";

/// Zero-argument constructor for a loss function.
pub type LossFactory<B> = Box<dyn Fn() -> Box<dyn LossFunction<B>> + Send + Sync>;

/// Maps loss-type identifiers to the factories that build them.
///
/// Every lookup creates a fresh instance, so aggregators never share loss
/// functions with each other.
pub struct LossRegistry<B: Backend> {
    factories: Vec<(String, LossFactory<B>)>,
}

impl<B: Backend> fmt::Debug for LossRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LossRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl<B: Backend> Default for LossRegistry<B> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<B: Backend> LossRegistry<B> {
    /// A registry with no factories.
    pub const fn empty() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// A registry holding `mse`, `bce` and `pearsonloss`.
    pub fn builtin() -> Self {
        Self::empty()
            .with(MSE, || Box::new(MseLoss::new()))
            .with(BCE, || Box::new(BceLoss::new()))
            .with(PEARSON, || Box::new(PearsonLoss::new()))
    }

    /// Registers `factory` under `name`, replacing any factory already there.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn LossFunction<B>> + Send + Sync + 'static,
    {
        let name = name.into();
        let factory: LossFactory<B> = Box::new(factory);

        match self.factories.iter_mut().find(|(known, _)| *known == name) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((name, factory)),
        }
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn LossFunction<B>> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Returns `true` if `name` has a factory.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.iter().any(|(known, _)| known == name)
    }

    /// Registered identifiers in registration order.
    pub fn names(&self) -> Vec<String> {
        self.factories.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Creates a new instance of the loss registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MultiLossError::UnknownLossType`] if `name` is not registered.
    pub fn create(&self, name: &str) -> MultiLossResult<Box<dyn LossFunction<B>>> {
        self.factories
            .iter()
            .find(|(known, _)| known == name)
            .map(|(_, factory)| factory())
            .ok_or_else(|| MultiLossError::UnknownLossType {
                name: name.to_owned(),
                known: self.names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::{cast::ToElement, Tensor};

    use super::*;
    use crate::{error::ErrorKind, tests::TestBackend};

    #[test]
    fn builtin_registry_knows_all_loss_types() {
        let registry = LossRegistry::<TestBackend>::builtin();

        assert_eq!(registry.names(), vec!["mse", "bce", "pearsonloss"]);
        assert!(registry.contains("bce"));
        assert!(registry.create(PEARSON).is_ok());
    }

    #[test]
    fn unknown_name_is_a_resolution_error() {
        let registry = LossRegistry::<TestBackend>::builtin();

        let err = registry.create("huber").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(err.to_string().contains("huber"));
    }

    #[test]
    fn register_replaces_existing_factory() {
        let device = Default::default();
        let mut registry = LossRegistry::<TestBackend>::builtin();
        registry.register(MSE, || Box::new(BceLoss::new()));

        assert_eq!(registry.names().len(), 3);

        let pred = Tensor::<TestBackend, 2>::from_floats([[0.5]], &device);
        let target = Tensor::<TestBackend, 2>::from_floats([[1.0]], &device);
        let value = registry
            .create(MSE)
            .expect("mse is registered")
            .forward(pred, target)
            .into_scalar()
            .to_f64();

        // BCE of 0.5 against 1.0 rather than MSE (0.25)
        assert!((value - std::f64::consts::LN_2).abs() < 1e-5);
    }
}
