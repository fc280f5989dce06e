//! Completeness and continuity checks of a height range.

use crate::{ArchiveError, CanonicalChain};
use tracing::warn;

/// Heights at which the genesis boundary may legitimately look irregular.
///
/// Both only apply when a range starts at height 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisTolerance {
    /// The single height allowed to be missing.
    pub missing_height: u64,
    /// The single height allowed to hold a parentless block.
    pub null_parent_height: u64,
}

impl GenesisTolerance {
    /// Default [`GenesisTolerance::missing_height`]; the chain is numbered from 1.
    pub const DEFAULT_MISSING_HEIGHT: u64 = 0;
    /// Default [`GenesisTolerance::null_parent_height`], the genesis block.
    pub const DEFAULT_NULL_PARENT_HEIGHT: u64 = 1;
}

impl Default for GenesisTolerance {
    fn default() -> Self {
        Self {
            missing_height: Self::DEFAULT_MISSING_HEIGHT,
            null_parent_height: Self::DEFAULT_NULL_PARENT_HEIGHT,
        }
    }
}

/// Checks that a height range of the canonical chain is fully and correctly imported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeValidator {
    tolerance: GenesisTolerance,
}

impl RangeValidator {
    /// Creates a new [`RangeValidator`].
    pub const fn new(tolerance: GenesisTolerance) -> Self {
        Self { tolerance }
    }

    /// Returns the genesis tolerance in use.
    pub const fn tolerance(&self) -> GenesisTolerance {
        self.tolerance
    }

    /// Validates `[min, max]` against `chain`.
    ///
    /// Missing heights are checked first and fail with [`ArchiveError::ArchiveIncomplete`];
    /// parentless blocks fail with [`ArchiveError::ArchiveCorrupt`].
    ///
    /// A range starting at 0 may miss [`GenesisTolerance::missing_height`] and must hold
    /// exactly one parentless block, at [`GenesisTolerance::null_parent_height`]. Any other
    /// range must have no missing heights and no parentless blocks.
    pub fn validate(&self, min: u64, max: u64, chain: &CanonicalChain) -> Result<(), ArchiveError> {
        if min > max {
            return Err(ArchiveError::InvalidRange { min, max });
        }

        let missing = Self::missing_heights(min, max, chain);
        if !Self::missing_tolerated(min, &missing, self.tolerance.missing_height) {
            warn!(
                target: "range_validator",
                min,
                max,
                missing = missing.len(),
                first_missing = missing.first(),
                "Archive is missing blocks"
            );
            return Err(ArchiveError::ArchiveIncomplete { missing });
        }

        let null_parents = chain.null_parent_heights_in(min, max);
        if !Self::null_parents_tolerated(min, &null_parents, self.tolerance.null_parent_height) {
            warn!(
                target: "range_validator",
                min,
                max,
                ?null_parents,
                "Archive has blocks with null parents"
            );
            return Err(ArchiveError::ArchiveCorrupt { null_parents });
        }

        Ok(())
    }

    fn missing_heights(min: u64, max: u64, chain: &CanonicalChain) -> Vec<u64> {
        let present = chain.heights_in(min, max);
        (min..=max).filter(|height| !present.contains(height)).collect()
    }

    const fn missing_tolerated(min: u64, missing: &[u64], allowed: u64) -> bool {
        match missing {
            [] => true,
            [only] => min == 0 && *only == allowed,
            _ => false,
        }
    }

    const fn null_parents_tolerated(min: u64, null_parents: &[u64], genesis: u64) -> bool {
        match null_parents {
            [] => min > 0,
            [only] => min == 0 && *only == genesis,
            _ => false,
        }
    }
}
