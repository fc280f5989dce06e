//! Storage backends for the archive data provider.
//!
//! The provider never writes to the archive. This crate only describes the read side of
//! the collaborators it depends on:
//!
//! - [`BlockStoreReader`]: block rows and parent links, backed by [`PgArchiveStore`] or
//!   [`MemoryBlockStore`].
//! - [`StakeReader`]: staking ledger lookups.
//! - [`ExclusionSource`]: the append-only log of already settled blocks, backed by
//!   [`FileExclusionLog`] or [`MemoryExclusionLog`].

mod error;
pub use error::StorageError;

mod traits;
pub use traits::{BlockStoreReader, ExclusionSource, ExclusionStream, StakeReader};

mod memory;
pub use memory::{MemoryBlockStore, MemoryExclusionLog};

mod exclusion_log;
pub use exclusion_log::{EXCLUSION_LOG_DELIMITER, FileExclusionLog};

mod postgres;
pub use postgres::PgArchiveStore;
