//! Weighted aggregation of named loss functions.
//!
//! A [`MultiLoss`] is built once from a [`MultiLossConfig`] and then evaluated
//! on every training step:
//!
//! ```text
//! total_loss = Σ weight_i * loss_i(pred, label)
//! ```
//!
//! Every evaluation also returns the unweighted value of each term so the
//! training loop can log them next to the total.

use burn::{
    module::Module,
    nn::loss::MseLoss,
    tensor::{backend::Backend, Tensor},
};

use crate::{
    bce::BceLoss,
    config::MultiLossConfig,
    device::Placement,
    error::{MultiLossError, MultiLossResult},
    function::{into_rows, LossFunction},
    input::LossInput,
    pearson::PearsonLoss,
    registry::LossRegistry,
    values::{LossValues, TOTAL_LOSS},
};

#[derive(Debug)]
struct Term<B: Backend> {
    name: String,
    loss: Box<dyn LossFunction<B>>,
    weight: f64,
}

#[derive(Debug)]
enum Terms<B: Backend> {
    /// Built without loss types; only the individual constructors are usable.
    Bare,
    Configured(Vec<Term<B>>),
}

/// Weighted sum of named loss functions.
///
/// The resolved terms are fixed at construction; evaluation never mutates the
/// aggregator.
#[derive(Debug)]
pub struct MultiLoss<B: Backend> {
    terms: Terms<B>,
    loss_types: Vec<(String, f64)>,
    registry: LossRegistry<B>,
    placement: Placement<B>,
}

impl MultiLossConfig {
    /// Initialize a [`MultiLoss`] resolving names against the built-in losses.
    ///
    /// # Errors
    ///
    /// See [`init_with_registry`](Self::init_with_registry).
    pub fn init<B: Backend>(&self, placement: &Placement<B>) -> MultiLossResult<MultiLoss<B>> {
        self.init_with_registry(LossRegistry::builtin(), placement)
    }

    /// Initialize a [`MultiLoss`] resolving names against `registry`.
    ///
    /// Names missing from the registry are logged and dropped, unless
    /// [`strict`](Self::strict) is set.
    ///
    /// # Errors
    ///
    /// Returns [`MultiLossError::WeightCountMismatch`] if weights and loss
    /// types differ in length, and [`MultiLossError::UnknownLossType`] for an
    /// unknown name in strict mode.
    pub fn init_with_registry<B: Backend>(
        &self,
        registry: LossRegistry<B>,
        placement: &Placement<B>,
    ) -> MultiLossResult<MultiLoss<B>> {
        let Some(loss_types) = self.terms()? else {
            tracing::debug!("multi-loss created in bare mode");
            return Ok(MultiLoss {
                terms: Terms::Bare,
                loss_types: Vec::new(),
                registry,
                placement: placement.clone(),
            });
        };

        let mut terms: Vec<Term<B>> = Vec::with_capacity(loss_types.len());
        for (name, weight) in &loss_types {
            let loss = match registry.create(name) {
                Ok(loss) => placement.place(loss),
                Err(err) if !self.is_strict() => {
                    tracing::warn!(name = %name, known = ?registry.names(), "unknown loss type, term dropped");
                    tracing::debug!(error = %err, "loss resolution failed");
                    continue;
                }
                Err(err) => return Err(err),
            };

            // A repeated name keeps its first position and takes the latest weight.
            match terms.iter_mut().find(|term| term.name == *name) {
                Some(term) => {
                    term.loss = loss;
                    term.weight = *weight;
                }
                None => terms.push(Term {
                    name: name.clone(),
                    loss,
                    weight: *weight,
                }),
            }
        }

        tracing::debug!(
            terms = ?terms.iter().map(|term| (term.name.as_str(), term.weight)).collect::<Vec<_>>(),
            device = ?placement.device(),
            "multi-loss configured",
        );

        Ok(MultiLoss {
            terms: Terms::Configured(terms),
            loss_types,
            registry,
            placement: placement.clone(),
        })
    }
}

impl<B: Backend> MultiLoss<B> {
    /// Build a [`MultiLoss`] with the built-in losses and no device placement.
    ///
    /// # Errors
    ///
    /// See [`MultiLossConfig::init`].
    pub fn new(config: &MultiLossConfig) -> MultiLossResult<Self> {
        config.init(&Placement::Unplaced)
    }

    /// The configured `(name, weight)` pairs, including names that failed to
    /// resolve. Empty in bare mode.
    pub fn loss_types(&self) -> &[(String, f64)] {
        &self.loss_types
    }

    /// Names of the resolved terms in evaluation order.
    pub fn resolved_names(&self) -> Vec<&str> {
        match &self.terms {
            Terms::Bare => Vec::new(),
            Terms::Configured(terms) => terms.iter().map(|term| term.name.as_str()).collect(),
        }
    }

    /// Returns `true` if the aggregator was built with loss types.
    pub const fn is_configured(&self) -> bool {
        matches!(self.terms, Terms::Configured(_))
    }

    /// The placement applied to every loss function this aggregator creates.
    pub const fn placement(&self) -> &Placement<B> {
        &self.placement
    }

    /// Creates a fresh, placed instance of the loss registered as `name`.
    ///
    /// Available in bare mode.
    ///
    /// # Errors
    ///
    /// Returns [`MultiLossError::UnknownLossType`] if `name` is not registered.
    pub fn build(&self, name: &str) -> MultiLossResult<Box<dyn LossFunction<B>>> {
        self.registry
            .create(name)
            .map(|loss| self.placement.place(loss))
    }

    /// A mean-squared-error loss on the configured device.
    pub fn mse(&self) -> MseLoss {
        self.place_module(MseLoss::new())
    }

    /// A binary cross-entropy loss on the configured device.
    pub fn bce(&self) -> BceLoss {
        self.place_module(BceLoss::new())
    }

    /// A Pearson correlation loss on the configured device.
    pub fn pearson(&self) -> PearsonLoss {
        self.place_module(PearsonLoss::new())
    }

    fn place_module<M: Module<B>>(&self, module: M) -> M {
        match self.placement.device() {
            Some(device) => module.to_device(device),
            None => module,
        }
    }

    fn configured_terms(&self) -> MultiLossResult<&[Term<B>]> {
        match &self.terms {
            Terms::Bare => Err(MultiLossError::Unconfigured),
            Terms::Configured(terms) => Ok(terms),
        }
    }

    /// Evaluates the aggregated loss.
    ///
    /// # Errors
    ///
    /// - [`MultiLossError::Unconfigured`] in bare mode.
    /// - [`MultiLossError::TypeMismatch`] if `pred` is a tensor and `label` is not.
    /// - [`MultiLossError::UnsupportedInput`] if `pred` is not a tensor.
    /// - [`MultiLossError::ShapeMismatch`] if the shapes differ.
    pub fn forward<const D: usize, const L: usize>(
        &self,
        pred: impl Into<LossInput<B, D>>,
        label: impl Into<LossInput<B, L>>,
    ) -> MultiLossResult<(Tensor<B, 1>, LossValues<B>)> {
        self.configured_terms()?;

        match (pred.into(), label.into()) {
            (LossInput::Tensor(pred), LossInput::Tensor(label)) => {
                self.single_output_loss(pred, label)
            }
            (pred @ LossInput::Tensor(_), label) => Err(MultiLossError::TypeMismatch {
                pred: pred.type_name(),
                label: label.type_name(),
            }),
            (pred, _) => Err(MultiLossError::UnsupportedInput {
                found: pred.type_name(),
            }),
        }
    }

    /// Evaluates every term on one `(pred, label)` pair.
    ///
    /// Returns the weighted total and the unweighted value of each term, with
    /// the total repeated under [`TOTAL_LOSS`].
    ///
    /// # Shapes
    ///
    /// - pred: `[...dims]`
    /// - label: `[...dims]` (same shape as pred)
    /// - output: `[1]`
    ///
    /// # Errors
    ///
    /// Returns [`MultiLossError::ShapeMismatch`] if the shapes differ and
    /// [`MultiLossError::Unconfigured`] in bare mode.
    pub fn single_output_loss<const D: usize, const L: usize>(
        &self,
        pred: Tensor<B, D>,
        label: Tensor<B, L>,
    ) -> MultiLossResult<(Tensor<B, 1>, LossValues<B>)> {
        let terms = self.configured_terms()?;

        if pred.shape() != label.shape() {
            return Err(MultiLossError::ShapeMismatch {
                pred: pred.dims().to_vec(),
                label: label.dims().to_vec(),
            });
        }

        let device = pred.device();
        let label: Tensor<B, D> = label.reshape(pred.dims());
        let pred = into_rows(pred);
        let label = into_rows(label);

        let mut values = LossValues::new();
        let mut total: Option<Tensor<B, 1>> = None;

        for term in terms {
            let value = term.loss.forward(pred.clone(), label.clone());
            let weighted = value.clone().mul_scalar(term.weight);
            total = Some(match total {
                Some(t) => t + weighted,
                None => weighted,
            });
            values.insert(term.name.clone(), value);
        }

        let total = total.unwrap_or_else(|| Tensor::zeros([1], &device));
        values.insert(TOTAL_LOSS, total.clone());

        Ok((total, values))
    }

    /// Evaluates every term on several `(pred, label)` pairs, e.g. the outputs
    /// of a multi-head or multi-scale model.
    ///
    /// The total is the sum of the per-output totals; each per-term entry is
    /// that term's mean across outputs.
    ///
    /// # Errors
    ///
    /// Returns [`MultiLossError::EmptyOutputs`] for an empty list, and any
    /// error [`single_output_loss`](Self::single_output_loss) returns.
    pub fn multi_output_loss<const D: usize, const L: usize>(
        &self,
        outputs: Vec<(Tensor<B, D>, Tensor<B, L>)>,
    ) -> MultiLossResult<(Tensor<B, 1>, LossValues<B>)> {
        self.configured_terms()?;
        if outputs.is_empty() {
            return Err(MultiLossError::EmptyOutputs);
        }

        let count = outputs.len() as f64;
        let mut total: Option<Tensor<B, 1>> = None;
        let mut sums: Vec<(String, Tensor<B, 1>)> = Vec::new();

        for (pred, label) in outputs {
            let (output_total, output_values) = self.single_output_loss(pred, label)?;
            total = Some(match total {
                Some(t) => t + output_total,
                None => output_total,
            });

            for (name, value) in output_values {
                if name == TOTAL_LOSS {
                    continue;
                }
                match sums.iter_mut().find(|(known, _)| *known == name) {
                    Some(entry) => entry.1 = entry.1.clone() + value,
                    None => sums.push((name, value)),
                }
            }
        }

        let mut values = LossValues::new();
        for (name, sum) in sums {
            values.insert(name, sum.div_scalar(count));
        }

        let total = total.ok_or(MultiLossError::EmptyOutputs)?;
        values.insert(TOTAL_LOSS, total.clone());

        Ok((total, values))
    }
}
