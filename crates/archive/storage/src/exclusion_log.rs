//! Flat-file exclusion log.
//!
//! The log holds one `height|state_hash` record per line. It is appended to by the settlement
//! process once a block's proceeds have been paid out and is only ever read here.

use crate::{ExclusionSource, ExclusionStream, StorageError};
use archive_types::ExclusionRecord;
use async_stream::try_stream;
use futures::StreamExt;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};
use tracing::{debug, error};

/// Field delimiter of the exclusion log.
pub const EXCLUSION_LOG_DELIMITER: u8 = b'|';

/// An [`ExclusionSource`] reading a `|`-delimited file.
///
/// The file is re-read from the start on every call to [`ExclusionSource::records`], one line
/// at a time. A missing file is not an error and yields no records.
#[derive(Debug, Clone)]
pub struct FileExclusionLog {
    path: PathBuf,
}

impl FileExclusionLog {
    /// Creates a new [`FileExclusionLog`] for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<Option<File>, StorageError> {
        match File::open(&self.path).await {
            Ok(file) => Ok(Some(file)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    target: "archive_storage",
                    path = %self.path.display(),
                    "Exclusion log not found, nothing to exclude"
                );
                Ok(None)
            }
            Err(err) => {
                error!(
                    target: "archive_storage",
                    path = %self.path.display(),
                    %err,
                    "Failed to open exclusion log"
                );
                Err(err.into())
            }
        }
    }
}

fn line_reader() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(EXCLUSION_LOG_DELIMITER).has_headers(false).flexible(true).quoting(false);
    builder
}

fn split_line(
    builder: &csv::ReaderBuilder,
    text: &str,
    line: u64,
) -> Result<csv::StringRecord, StorageError> {
    let mut record = csv::StringRecord::new();
    builder
        .from_reader(text.as_bytes())
        .read_record(&mut record)
        .map_err(|err| StorageError::MalformedRecord { line, reason: err.to_string() })?;
    Ok(record)
}

fn parse_record(record: &csv::StringRecord, line: u64) -> Result<ExclusionRecord, StorageError> {
    let malformed = |reason: String| StorageError::MalformedRecord { line, reason };

    let height = record
        .get(0)
        .map(str::trim)
        .ok_or_else(|| malformed("missing height".to_string()))?;
    let height = height
        .parse::<u64>()
        .map_err(|err| malformed(format!("invalid height {height:?}: {err}")))?;

    let state_hash = record
        .get(1)
        .map(str::trim)
        .filter(|hash| !hash.is_empty())
        .ok_or_else(|| malformed("missing state hash".to_string()))?;

    Ok(ExclusionRecord::new(height, state_hash))
}

impl ExclusionSource for FileExclusionLog {
    fn records(&self) -> ExclusionStream<'_> {
        try_stream! {
            if let Some(file) = self.open().await? {
                let builder = line_reader();
                let mut lines = BufReader::new(file).lines();
                let mut line = 0u64;

                while let Some(text) = lines.next_line().await.map_err(StorageError::from)? {
                    line += 1;
                    if text.trim().is_empty() {
                        continue;
                    }
                    let record = split_line(&builder, &text, line)?;
                    yield parse_record(&record, line)?;
                }
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_missing_file_yields_no_records() {
        let dir = TempDir::new().expect("create temp dir");
        let log = FileExclusionLog::new(dir.path().join(".paidblocks"));

        let records: Vec<_> = log.records().try_collect().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_reads_pipe_delimited_records() {
        let mut file = NamedTempFile::new().expect("create temp file");
        writeln!(file, "5|3NKhash5").unwrap();
        writeln!(file).unwrap();
        writeln!(file, " 7 | 3NKhash7 ").unwrap();
        file.flush().unwrap();

        let log = FileExclusionLog::new(file.path());
        let records: Vec<_> = log.records().try_collect().await.unwrap();
        assert_eq!(
            records,
            vec![ExclusionRecord::new(5, "3NKhash5"), ExclusionRecord::new(7, "3NKhash7")]
        );

        // Reading again starts from the top of the file.
        let again: Vec<_> = log.records().try_collect().await.unwrap();
        assert_eq!(again, records);
    }

    #[tokio::test]
    async fn test_malformed_height_is_reported_with_line() {
        let mut file = NamedTempFile::new().expect("create temp file");
        writeln!(file, "5|3NKhash5").unwrap();
        writeln!(file, "five|3NKhash").unwrap();
        file.flush().unwrap();

        let log = FileExclusionLog::new(file.path());
        let err = log.records().try_collect::<Vec<_>>().await.unwrap_err();
        assert!(matches!(err, StorageError::MalformedRecord { line: 2, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_records_yielded_before_rest_of_file_is_read() {
        let mut file = NamedTempFile::new().expect("create temp file");
        writeln!(file, "5|3NKhash5").unwrap();
        writeln!(file, "|").unwrap();
        file.flush().unwrap();

        let log = FileExclusionLog::new(file.path());
        let mut records = log.records();

        let first = records.try_next().await.unwrap();
        assert_eq!(first, Some(ExclusionRecord::new(5, "3NKhash5")));
        let err = records.try_next().await.unwrap_err();
        assert!(matches!(err, StorageError::MalformedRecord { line: 2, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_missing_state_hash_is_malformed() {
        let mut file = NamedTempFile::new().expect("create temp file");
        writeln!(file, "5").unwrap();
        file.flush().unwrap();

        let log = FileExclusionLog::new(file.path());
        let err = log.records().try_collect::<Vec<_>>().await.unwrap_err();
        assert!(matches!(err, StorageError::MalformedRecord { line: 1, .. }), "got {err:?}");
    }
}
