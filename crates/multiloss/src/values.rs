//! Per-term breakdown returned by every evaluation.

use burn::tensor::{backend::Backend, cast::ToElement, Tensor};

/// Key of the synthetic entry holding the weighted sum.
pub const TOTAL_LOSS: &str = "total_loss";

/// Unweighted value of every term, in evaluation order, followed by
/// [`TOTAL_LOSS`].
#[derive(Debug, Clone)]
pub struct LossValues<B: Backend> {
    entries: Vec<(String, Tensor<B, 1>)>,
}

impl<B: Backend> LossValues<B> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Tensor<B, 1>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(known, _)| *known == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// The value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&Tensor<B, 1>> {
        self.entries
            .iter()
            .find(|(known, _)| known == name)
            .map(|(_, value)| value)
    }

    /// The weighted sum of all terms.
    pub fn total(&self) -> Option<&Tensor<B, 1>> {
        self.get(TOTAL_LOSS)
    }

    /// Returns `true` if a value is recorded under `name`.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Recorded names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor<B, 1>)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of entries, including [`TOTAL_LOSS`].
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads every value back to the host, e.g. for logging.
    ///
    /// This synchronizes with the device once per entry.
    pub fn scalars(&self) -> Vec<(String, f64)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), value.clone().into_scalar().to_f64()))
            .collect()
    }
}

impl<B: Backend> IntoIterator for LossValues<B> {
    type Item = (String, Tensor<B, 1>);
    type IntoIter = std::vec::IntoIter<(String, Tensor<B, 1>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestBackend;

    #[test]
    fn loss_values_keep_insertion_order() {
        let device = Default::default();
        let mut values = LossValues::<TestBackend>::new();
        values.insert("mse", Tensor::from_floats([0.5], &device));
        values.insert("bce", Tensor::from_floats([0.25], &device));
        values.insert(TOTAL_LOSS, Tensor::from_floats([0.75], &device));

        assert_eq!(values.keys().collect::<Vec<_>>(), ["mse", "bce", "total_loss"]);
        assert_eq!(
            values.scalars(),
            vec![
                ("mse".to_owned(), 0.5),
                ("bce".to_owned(), 0.25),
                ("total_loss".to_owned(), 0.75),
            ]
        );
    }

    #[test]
    fn inserting_an_existing_name_replaces_the_value() {
        let device = Default::default();
        let mut values = LossValues::<TestBackend>::new();
        values.insert("mse", Tensor::from_floats([0.5], &device));
        values.insert("mse", Tensor::from_floats([1.5], &device));

        assert_eq!(values.len(), 1);
        assert_eq!(values.scalars(), vec![("mse".to_owned(), 1.5)]);
    }
}
