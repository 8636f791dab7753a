//! Device placement for loss functions.

use burn::tensor::backend::Backend;

use crate::function::LossFunction;

/// Where freshly created loss functions are placed.
///
/// `Unplaced` leaves every loss function exactly as its factory built it,
/// which for stateless losses means on the backend's default device.
#[derive(Debug, Clone)]
pub enum Placement<B: Backend> {
    /// Keep loss functions where their factory created them.
    Unplaced,
    /// Move loss functions onto the given device.
    Device(B::Device),
}

impl<B: Backend> Default for Placement<B> {
    fn default() -> Self {
        Self::Unplaced
    }
}

impl<B: Backend> Placement<B> {
    /// Places on `device`.
    pub const fn on(device: B::Device) -> Self {
        Self::Device(device)
    }

    /// The target device, if any.
    pub const fn device(&self) -> Option<&B::Device> {
        match self {
            Self::Unplaced => None,
            Self::Device(device) => Some(device),
        }
    }

    /// Moves `loss` to the configured device, or returns it unchanged.
    pub fn place(&self, loss: Box<dyn LossFunction<B>>) -> Box<dyn LossFunction<B>> {
        match self {
            Self::Unplaced => loss,
            Self::Device(device) => loss.to_device(device),
        }
    }
}

impl<B: Backend> From<Option<B::Device>> for Placement<B> {
    fn from(device: Option<B::Device>) -> Self {
        device.map_or(Self::Unplaced, Self::Device)
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::ndarray::NdArrayDevice;

    use super::*;
    use crate::tests::TestBackend;

    #[test]
    fn placement_from_none_is_unplaced() {
        let placement = Placement::<TestBackend>::from(None);

        assert!(placement.device().is_none());
    }

    #[test]
    fn placement_keeps_requested_device() {
        let placement = Placement::<TestBackend>::on(NdArrayDevice::Cpu);

        assert_eq!(placement.device(), Some(&NdArrayDevice::Cpu));
    }
}
