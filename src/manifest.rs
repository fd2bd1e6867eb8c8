//! Line-delimited JSON manifests.
//!
//! One manifest per repository/version pair, truncated at the start of each
//! run. Every record is serialized on a single line and flushed before the
//! next one is written.

use anyhow::{Context, Result};
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::{ManifestRecord, SectionRecord};

pub const MANIFEST_FILE: &str = "manifest.jsonl";
pub const SECTIONS_FILE: &str = "sections.jsonl";

/// Length of the path hash in record identifiers.
const PATH_HASH_LEN: usize = 10;

/// Stable identifier for a document: `{repo}:{version}:{hash10}`.
///
/// The hash is the SHA-1 of the relative original path only, so the
/// identifier survives content changes between runs and matches corpora
/// built with the same `sha1(path)[:10]` scheme.
pub fn record_id(repo: &str, version: &str, relative_path: &str) -> String {
    format!("{}:{}:{}", repo, version, short_hash(relative_path))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())[..PATH_HASH_LEN].to_string()
}

/// Append-only JSON-lines writer.
pub struct JsonlWriter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Serialize `record` as one line and flush it.
    pub fn append<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Manifest of [`ManifestRecord`]s backed by a file.
pub struct ManifestWriter {
    path: PathBuf,
    inner: JsonlWriter<BufWriter<File>>,
}

impl ManifestWriter {
    /// Create (or truncate) the manifest at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create manifest: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: JsonlWriter::new(BufWriter::new(file)),
        })
    }

    pub fn append(&mut self, record: &ManifestRecord) -> Result<()> {
        self.inner
            .append(record)
            .with_context(|| format!("Failed to write manifest: {}", self.path.display()))
    }

    pub fn written(&self) -> u64 {
        self.inner.written()
    }
}

/// Section records for one repository/version pair.
pub struct SectionWriter {
    path: PathBuf,
    inner: JsonlWriter<BufWriter<File>>,
}

impl SectionWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create section file: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: JsonlWriter::new(BufWriter::new(file)),
        })
    }

    pub fn append(&mut self, record: &SectionRecord) -> Result<()> {
        self.inner
            .append(record)
            .with_context(|| format!("Failed to write section file: {}", self.path.display()))
    }
}
