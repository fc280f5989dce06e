//! Epoch to slot window arithmetic.

use crate::ConfigurationError;

/// An inclusive range of global slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    /// First slot of the window.
    pub min: u64,
    /// Last slot of the window.
    pub max: u64,
}

impl SlotWindow {
    /// Returns `true` if `slot` lies within the window.
    pub const fn contains(&self, slot: u64) -> bool {
        self.min <= slot && slot <= self.max
    }
}

/// Maps epochs to their [`SlotWindow`].
///
/// The slots-per-epoch setting is kept as configured and only validated when a window is
/// requested, so a provider can be built without it as long as no epoch query is made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochWindow {
    slots_per_epoch: Option<String>,
}

impl EpochWindow {
    /// Creates a new [`EpochWindow`] from the raw configured value.
    pub const fn new(slots_per_epoch: Option<String>) -> Self {
        Self { slots_per_epoch }
    }

    /// Creates a new [`EpochWindow`] with a known number of slots per epoch.
    pub fn with_slots(slots_per_epoch: u64) -> Self {
        Self::new(Some(slots_per_epoch.to_string()))
    }

    /// Parses the configured number of slots per epoch.
    pub fn slots_per_epoch(&self) -> Result<u64, ConfigurationError> {
        let raw = self.slots_per_epoch.as_deref().ok_or(ConfigurationError::MissingSlotsPerEpoch)?;

        match raw.trim().parse::<u64>() {
            Ok(slots) if slots > 0 => Ok(slots),
            _ => Err(ConfigurationError::InvalidSlotsPerEpoch(raw.to_string())),
        }
    }

    /// Returns the slot window of `epoch`.
    ///
    /// `min = slots_per_epoch * epoch` and `max = slots_per_epoch * (epoch + 1) - 1`.
    pub fn slot_window(&self, epoch: u64) -> Result<SlotWindow, ConfigurationError> {
        let slots_per_epoch = self.slots_per_epoch()?;
        let overflow = || ConfigurationError::EpochOverflow { epoch, slots_per_epoch };

        let min = slots_per_epoch.checked_mul(epoch).ok_or_else(overflow)?;
        let max = min.checked_add(slots_per_epoch - 1).ok_or_else(overflow)?;

        Ok(SlotWindow { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(7140, 0, 0, 7139)]
    #[case(7140, 1, 7140, 14279)]
    #[case(7140, 10, 71400, 78539)]
    #[case(1, 5, 5, 5)]
    fn test_slot_window(
        #[case] slots: u64,
        #[case] epoch: u64,
        #[case] min: u64,
        #[case] max: u64,
    ) {
        let window = EpochWindow::with_slots(slots).slot_window(epoch).unwrap();
        assert_eq!(window, SlotWindow { min, max });
    }

    #[test]
    fn test_missing_slots_per_epoch() {
        let err = EpochWindow::default().slot_window(0).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingSlotsPerEpoch);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("-7140")]
    #[case("0")]
    #[case("71.4")]
    fn test_invalid_slots_per_epoch(#[case] raw: &str) {
        let err = EpochWindow::new(Some(raw.to_string())).slot_window(1).unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidSlotsPerEpoch(raw.to_string()));
    }

    #[test]
    fn test_surrounding_whitespace_is_accepted() {
        let window = EpochWindow::new(Some(" 7140\n".to_string())).slot_window(1).unwrap();
        assert_eq!(window, SlotWindow { min: 7140, max: 14279 });
    }

    #[test]
    fn test_epoch_overflow() {
        let err = EpochWindow::with_slots(7140).slot_window(u64::MAX).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::EpochOverflow { epoch: u64::MAX, slots_per_epoch: 7140 }
        );
    }

    #[test]
    fn test_window_contains() {
        let window = SlotWindow { min: 10, max: 19 };
        assert!(window.contains(10));
        assert!(window.contains(19));
        assert!(!window.contains(9));
        assert!(!window.contains(20));
    }
}
