//! Writing ranks back, in batches.
//!
//! Each batch succeeds or fails as a unit; a failed batch is counted and the
//! remaining batches are still attempted.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use fieldrank_core::RankResult;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{CliError, Result};

/// A pending write: set `fields[target] = rank` on record `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordUpdate {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl RecordUpdate {
    /// The rank is written as a JSON number, not a string.
    pub fn from_rank(result: &RankResult, target_field: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(target_field.to_string(), Value::from(result.rank));
        RecordUpdate {
            id: result.record_id.clone(),
            fields,
        }
    }
}

/// Where rank updates go.
pub trait RecordSink {
    fn write_batch(&mut self, batch: &[RecordUpdate]) -> Result<()>;
}

/// Writes updates as JSON Lines, one `write_all` and flush per batch.
///
/// A batch that fails mid-write may leave a truncated line; the next batch
/// starts on a fresh line so later records stay readable.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    dirty: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer, dirty: false }
    }
}

impl JsonLinesSink<File> {
    /// Unbuffered: each batch is already a single write.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| CliError::Write {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(JsonLinesSink::new(file))
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn write_batch(&mut self, batch: &[RecordUpdate]) -> Result<()> {
        // A serialization error writes nothing.
        let mut buf = Vec::new();
        if self.dirty {
            buf.push(b'\n');
        }
        for update in batch {
            serde_json::to_writer(&mut buf, update).map_err(CliError::Serialize)?;
            buf.push(b'\n');
        }
        let written = self.writer.write_all(&buf).and_then(|()| self.writer.flush());
        self.dirty = written.is_err();
        written?;
        Ok(())
    }
}

/// Outcome of writing all updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub succeeded: usize,
    pub failed: usize,
    pub batches: usize,
    pub failed_batches: usize,
}

impl WriteReport {
    pub fn is_partial(&self) -> bool {
        self.failed > 0
    }
}

/// Split updates into batches of `batch_size` and write each through the sink.
pub fn write_in_batches(sink: &mut dyn RecordSink, updates: &[RecordUpdate], batch_size: usize) -> Result<WriteReport> {
    if batch_size == 0 {
        return Err(CliError::InvalidBatchSize);
    }

    let mut report = WriteReport::default();
    for (i, batch) in updates.chunks(batch_size).enumerate() {
        report.batches += 1;
        match sink.write_batch(batch) {
            Ok(()) => {
                report.succeeded += batch.len();
                debug!(batch = i + 1, records = batch.len(), "batch written");
            }
            Err(e) => {
                report.failed += batch.len();
                report.failed_batches += 1;
                warn!(batch = i + 1, records = batch.len(), error = %e, "failed to write batch");
            }
        }
    }
    Ok(report)
}
