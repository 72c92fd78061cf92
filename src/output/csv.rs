// src/output/csv.rs
// =============================================================================
// Appends classified links to a CSV file, one page-sized batch at a time.
//
// The header row is written once, when the file is first created (or found
// empty). After that every batch is appended as-is, so a run that crashes
// keeps everything flushed before the crash.
// =============================================================================

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::links::ClassifiedLink;

/// Column names, in order.
pub const HEADER: [&str; 6] = ["repo", "pr_link", "pr_title", "link", "media_type", "isGithub"];

/// Append-only CSV output.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Opens the table at `path`, writing the header row if the file does
    /// not exist yet or is empty. An existing header is left alone.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let sink = Self { path: path.into() };

        let needs_header = match std::fs::metadata(&sink.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to inspect output file {}", sink.path.display())
                })
            }
        };

        if needs_header {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink.open_for_append()?);
            writer.write_record(HEADER)?;
            writer.flush()?;
        }

        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one batch and flushes it. Returns how many rows were written.
    pub fn append(&self, rows: &[ClassifiedLink]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(self.open_for_append()?);
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to write row for {}", row.link))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;

        Ok(rows.len())
    }

    fn open_for_append(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open output file {}", self.path.display()))
    }
}
