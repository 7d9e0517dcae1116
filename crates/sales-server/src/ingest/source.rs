//! CSV record source
//!
//! The `csv` reader is synchronous, so it runs on a blocking thread and hands
//! records to the async pipeline over a bounded channel. The bound keeps the
//! reader at most [`RECORD_BUFFER`] lines ahead of the coordinator, which in
//! turn stalls at every commit.

use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

use super::parser::RawRecord;

/// Lines buffered between the reader thread and the pipeline
pub const RECORD_BUFFER: usize = 1024;

/// Where a run reads its CSV from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Path(PathBuf),
    /// In-memory CSV content
    Bytes(Vec<u8>),
}

impl SourceLocator {
    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            SourceLocator::Path(path) => path.display().to_string(),
            SourceLocator::Bytes(bytes) => format!("<{} in-memory bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for SourceLocator {
    fn from(path: PathBuf) -> Self {
        SourceLocator::Path(path)
    }
}

impl From<&std::path::Path> for SourceLocator {
    fn from(path: &std::path::Path) -> Self {
        SourceLocator::Path(path.to_path_buf())
    }
}

impl From<&str> for SourceLocator {
    fn from(path: &str) -> Self {
        SourceLocator::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for SourceLocator {
    fn from(bytes: Vec<u8>) -> Self {
        SourceLocator::Bytes(bytes)
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open CSV file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV record: {0}")]
    Read(#[from] csv::Error),

    #[error("CSV source has no header line")]
    MissingHeader,

    #[error("CSV reader task failed: {0}")]
    Reader(String),
}

/// Sequential supplier of raw lines
#[async_trait]
pub trait RecordSource: Send {
    /// Next data line, `None` at end of source
    async fn next_record(&mut self) -> Result<Option<RawRecord>, SourceError>;
}

/// CSV file or buffer with its header line already consumed
pub struct CsvSource {
    records: mpsc::Receiver<Result<RawRecord, SourceError>>,
}

impl CsvSource {
    /// Open the source and discard the header line
    ///
    /// Fails if the source cannot be opened or holds no lines at all.
    pub async fn open(locator: impl Into<SourceLocator>) -> Result<Self, SourceError> {
        let locator = locator.into();
        let reader = tokio::task::spawn_blocking(move || open_reader(locator))
            .await
            .map_err(|e| SourceError::Reader(e.to_string()))??;

        let (tx, rx) = mpsc::channel(RECORD_BUFFER);
        tokio::task::spawn_blocking(move || pump(reader, tx));

        Ok(Self { records: rx })
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn next_record(&mut self) -> Result<Option<RawRecord>, SourceError> {
        self.records.recv().await.transpose()
    }
}

type CsvReader = csv::Reader<Box<dyn Read + Send>>;

fn open_reader(locator: SourceLocator) -> Result<CsvReader, SourceError> {
    let input: Box<dyn Read + Send> = match locator {
        SourceLocator::Path(path) => match File::open(&path) {
            Ok(file) => Box::new(file),
            Err(source) => return Err(SourceError::Open { path, source }),
        },
        SourceLocator::Bytes(bytes) => Box::new(Cursor::new(bytes)),
    };

    // Headers are handled here rather than by the reader so that an empty
    // source is detected up front. Short rows are left to the parser.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut header = StringRecord::new();
    if !reader.read_record(&mut header)? {
        return Err(SourceError::MissingHeader);
    }

    Ok(reader)
}

fn pump(mut reader: CsvReader, tx: mpsc::Sender<Result<RawRecord, SourceError>>) {
    let mut record = StringRecord::new();
    loop {
        let item = match reader.read_record(&mut record) {
            Ok(true) => Ok(record.iter().collect::<RawRecord>()),
            Ok(false) => return,
            Err(e) => Err(SourceError::Read(e)),
        };
        let failed = item.is_err();

        // A closed channel means the run ended early.
        if tx.blocking_send(item).is_err() || failed {
            return;
        }
    }
}
