//! Metrics for the archive data provider.

use crate::ArchiveError;

#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    pub(crate) const ARCHIVE_PROVIDER_REQUESTS_TOTAL: &'static str =
        "archive_provider_requests_total";
    pub(crate) const ARCHIVE_PROVIDER_ERRORS_TOTAL: &'static str = "archive_provider_errors_total";
    pub(crate) const ARCHIVE_PROVIDER_EXCLUDED_BLOCKS_TOTAL: &'static str =
        "archive_provider_excluded_blocks_total";
    pub(crate) const ARCHIVE_PROVIDER_CANONICAL_CHAIN_LENGTH: &'static str =
        "archive_provider_canonical_chain_length";

    pub(crate) fn init() {
        Self::describe();
        Self::zero();
    }

    fn describe() {
        metrics::describe_counter!(
            Self::ARCHIVE_PROVIDER_REQUESTS_TOTAL,
            metrics::Unit::Count,
            "Total number of archive provider requests",
        );

        metrics::describe_counter!(
            Self::ARCHIVE_PROVIDER_ERRORS_TOTAL,
            metrics::Unit::Count,
            "Total number of failed archive provider requests",
        );

        metrics::describe_counter!(
            Self::ARCHIVE_PROVIDER_EXCLUDED_BLOCKS_TOTAL,
            metrics::Unit::Count,
            "Total number of blocks dropped because they were already settled",
        );

        metrics::describe_histogram!(
            Self::ARCHIVE_PROVIDER_CANONICAL_CHAIN_LENGTH,
            metrics::Unit::Count,
            "Number of blocks in the resolved canonical chain",
        );
    }

    fn zero() {
        metrics::counter!(Self::ARCHIVE_PROVIDER_EXCLUDED_BLOCKS_TOTAL).increment(0);

        metrics::histogram!(Self::ARCHIVE_PROVIDER_CANONICAL_CHAIN_LENGTH).record(0.0);
    }

    pub(crate) fn record_call<T>(method: &'static str, result: &Result<T, ArchiveError>) {
        metrics::counter!(Self::ARCHIVE_PROVIDER_REQUESTS_TOTAL, "method" => method).increment(1);

        if let Err(err) = result {
            let kind = match err {
                ArchiveError::ChainCorrupt(_) => "chain_corrupt",
                ArchiveError::ArchiveIncomplete { .. } => "archive_incomplete",
                ArchiveError::ArchiveCorrupt { .. } => "archive_corrupt",
                ArchiveError::Configuration(_) => "configuration",
                ArchiveError::InvalidRange { .. } => "invalid_range",
                ArchiveError::Storage(_) => "storage",
            };
            metrics::counter!(
                Self::ARCHIVE_PROVIDER_ERRORS_TOTAL,
                "method" => method,
                "kind" => kind,
            )
            .increment(1);
        }
    }

    pub(crate) fn record_excluded(count: usize) {
        metrics::counter!(Self::ARCHIVE_PROVIDER_EXCLUDED_BLOCKS_TOTAL).increment(count as u64);
    }

    pub(crate) fn record_chain_length(length: usize) {
        metrics::histogram!(Self::ARCHIVE_PROVIDER_CANONICAL_CHAIN_LENGTH).record(length as f64);
    }
}
