//! Persisting extracted records as JSON Lines

use crate::{crawl::ContractRecord, error::Result};
use std::{fs::File,
          io::{BufWriter, Write},
          path::{Path, PathBuf}};

/// Destination for the records of a finished crawl
pub trait RecordSink {
    /// Write `records` in order and return how many were written
    fn write_records(&mut self, records: &[ContractRecord]) -> Result<usize>;
}

/// One compact JSON object per line: `{"contract": ..., "amount": ...}`
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn write_records(&mut self, records: &[ContractRecord]) -> Result<usize> {
        for record in records {
            serde_json::to_writer(&mut self.writer, record)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(records.len())
    }
}

/// JSON Lines file that is only created once there is something to flush
#[derive(Debug, Clone)]
pub struct JsonLinesFile {
    path: PathBuf,
}

impl JsonLinesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonLinesFile {
    fn write_records(&mut self, records: &[ContractRecord]) -> Result<usize> {
        let file = File::create(&self.path)?;
        JsonLinesSink::new(BufWriter::new(file)).write_records(records)
    }
}
