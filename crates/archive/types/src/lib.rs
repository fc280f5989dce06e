//! Core types shared across the archive data provider.
//!
//! This crate defines the block rows read from the archive, the lightweight
//! links used to walk the chain, exclusion log records and staking entries.

mod block;
pub use block::{Block, BlockId, BlockLink, HeightBounds};

mod exclusion;
pub use exclusion::ExclusionRecord;

mod stake;
pub use stake::{Stake, Stakes};
