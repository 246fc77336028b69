//! ZIP container reader
//!
//! IPA, ZIP, APPX and APPXBUNDLE files are all ZIP archives. This module wraps
//! `zip::ZipArchive` with the lookups the extractor needs:
//!
//! - exact and case-insensitive entry lookup
//! - pattern lookup (see [`pattern`])
//! - streaming decompression of one entry into an owned buffer
//!
//! ## ZIP Format Layout
//! ```text
//! [Local File Header 1][File Data 1] ... [Central Directory][EOCD]
//! ```
//! Entry names, sizes and the directory flag come from the Central Directory.
//! A missing or unreadable Central Directory fails the open with
//! `CorruptArchive`; a truncated or CRC-mismatched entry stream fails the read.
//!
//! The reader is generic over `Read + Seek`, so a nested package held in
//! memory (`Cursor<Vec<u8>>`) goes through the same code as a file on disk.
//! Dropping a `Container` releases the archive handle and every buffer it
//! holds; [`Container::close`] is the explicit form.

pub mod pattern;

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use tracing::{debug, trace};
use zip::ZipArchive;

use crate::error::{ExtractError, ExtractResult};

/// Upper bound on the up-front allocation for one entry
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Central Directory record for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Position in the Central Directory
    pub index: usize,
    /// Entry name with `\` separators normalized to `/`
    pub name: String,
    /// Uncompressed size as declared by the Central Directory
    pub size: u64,
    pub is_dir: bool,
}

impl EntryInfo {
    /// Last path segment of the entry name
    pub fn file_name(&self) -> &str {
        let trimmed = self.name.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Number of `/`-separated segments above the file
    pub fn depth(&self) -> usize {
        self.name.trim_end_matches('/').matches('/').count()
    }
}

/// An open ZIP container
pub struct Container<R: Read + Seek> {
    label: String,
    archive: ZipArchive<R>,
    entries: Vec<EntryInfo>,
}

/// Container over a nested package held in memory
pub type MemoryContainer = Container<Cursor<Vec<u8>>>;

impl Container<BufReader<File>> {
    /// Open a package file on disk
    pub fn open(path: &Path) -> ExtractResult<Self> {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)
            .map_err(|e| ExtractError::file_not_found(path, format!("failed to open: {e}")))?;
        Self::from_reader(label, BufReader::new(file))
    }
}

impl MemoryContainer {
    /// Open a nested package from its decompressed bytes
    pub fn from_bytes(label: impl Into<String>, data: Vec<u8>) -> ExtractResult<Self> {
        Self::from_reader(label, Cursor::new(data))
    }
}

impl<R: Read + Seek> Container<R> {
    /// Read the Central Directory of any seekable source
    pub fn from_reader(label: impl Into<String>, reader: R) -> ExtractResult<Self> {
        let label = label.into();
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| ExtractError::corrupt(&label, format!("failed to read ZIP structure: {e}")))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| ExtractError::corrupt(&label, format!("unreadable entry #{index}: {e}")))?;
            entries.push(EntryInfo {
                index,
                name: entry.name().replace('\\', "/"),
                size: entry.size(),
                is_dir: entry.is_dir(),
            });
        }

        debug!(container = %label, entries = entries.len(), "Container opened");

        Ok(Self { label, archive, entries })
    }

    /// Name used in logs and error messages
    pub fn label(&self) -> &str {
        &self.label
    }

    /// All entries in Central Directory order
    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    /// File entries only (directories skipped)
    pub fn files(&self) -> impl Iterator<Item = &EntryInfo> {
        self.entries.iter().filter(|entry| !entry.is_dir)
    }

    /// Exact-name lookup
    pub fn find(&self, name: &str) -> Option<&EntryInfo> {
        self.files().find(|entry| entry.name == name)
    }

    /// ASCII case-insensitive lookup; an exact match wins if present
    pub fn find_ignore_case(&self, name: &str) -> Option<&EntryInfo> {
        self.find(name)
            .or_else(|| self.files().find(|entry| entry.name.eq_ignore_ascii_case(name)))
    }

    /// File entries matching a glob or prefix pattern, in Central Directory order
    pub fn find_matching(&self, pattern: &str) -> Vec<&EntryInfo> {
        let found: Vec<&EntryInfo> = self
            .files()
            .filter(|entry| pattern::matches(pattern, &entry.name))
            .collect();
        trace!(container = %self.label, pattern, matches = found.len(), "Pattern lookup");
        found
    }

    /// Decompress a whole entry into an owned buffer
    ///
    /// Reading to the end also verifies the entry CRC.
    pub fn read_index(&mut self, index: usize) -> ExtractResult<Vec<u8>> {
        let mut entry = self
            .archive
            .by_index(index)
            .map_err(|e| ExtractError::corrupt(&self.label, format!("failed to open entry #{index}: {e}")))?;

        let mut data = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| ExtractError::corrupt(&self.label, format!("failed to decompress {}: {e}", entry.name())))?;

        trace!(container = %self.label, entry = %entry.name(), bytes = data.len(), "Entry read");
        Ok(data)
    }

    /// Decompress at most `len` leading bytes of an entry (headers only, no CRC check)
    pub fn read_prefix(&mut self, index: usize, len: usize) -> ExtractResult<Vec<u8>> {
        let entry = self
            .archive
            .by_index(index)
            .map_err(|e| ExtractError::corrupt(&self.label, format!("failed to open entry #{index}: {e}")))?;
        let name = entry.name().to_string();

        let mut data = Vec::with_capacity(len);
        entry
            .take(len as u64)
            .read_to_end(&mut data)
            .map_err(|e| ExtractError::corrupt(&self.label, format!("failed to decompress {name}: {e}")))?;
        Ok(data)
    }

    /// Release the archive and its buffers
    pub fn close(self) {
        debug!(container = %self.label, "Container closed");
    }
}
