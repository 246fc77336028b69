// Content fingerprinting for package files
//
// The fingerprint is a digest over the raw package bytes only. Path, file name
// and timestamps never enter the hash.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use md5::Md5;
use sha1::{Sha1, Digest};
use sha2::Sha256;
use serde::Serialize;
use tracing::{debug, instrument};

use super::BUFFER_SIZE;
use crate::error::{ExtractError, ExtractResult};

// =============================================================================
// Hash Algorithm Enum
// =============================================================================

/// Supported fingerprint algorithms
/// - MD5: default, matches the 32-hex-digit fingerprints of existing catalogs
/// - SHA1/SHA256: longer digests for callers that want them
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Parse algorithm name from string (case-insensitive)
    pub fn from_str(algorithm: &str) -> Result<Self, String> {
        match algorithm.trim().to_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            _ => Err(format!(
                "Unsupported hash algorithm: '{}'. Supported: md5, sha1, sha256",
                algorithm
            )),
        }
    }

    /// Get the canonical algorithm name
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
        }
    }
}

// =============================================================================
// Streaming Hasher - Unified interface for incremental hashing
// =============================================================================

/// A streaming hasher over the supported fingerprint algorithms
pub enum StreamingHasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
}

impl StreamingHasher {
    /// Create a new streaming hasher for the specified algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => StreamingHasher::Md5(Md5::new()),
            HashAlgorithm::Sha1 => StreamingHasher::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => StreamingHasher::Sha256(Sha256::new()),
        }
    }

    /// Update the hash with more data
    pub fn update(&mut self, data: &[u8]) {
        match self {
            StreamingHasher::Md5(h) => Digest::update(h, data),
            StreamingHasher::Sha1(h) => Digest::update(h, data),
            StreamingHasher::Sha256(h) => Digest::update(h, data),
        }
    }

    /// Finalize and return the hash as a lowercase hex string
    pub fn finalize(self) -> String {
        match self {
            StreamingHasher::Md5(h) => hex::encode(h.finalize()),
            StreamingHasher::Sha1(h) => hex::encode(h.finalize()),
            StreamingHasher::Sha256(h) => hex::encode(h.finalize()),
        }
    }
}

/// Compute hash of data using specified algorithm (one-shot, for small data)
pub fn compute_hash(data: &[u8], algorithm: HashAlgorithm) -> String {
    let mut hasher = StreamingHasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

// =============================================================================
// File Fingerprint
// =============================================================================

/// Stream a whole file through the hasher exactly once
///
/// Open and read failures surface as `FileNotFound`: at this point the file
/// is no longer readable.
#[instrument(fields(path = %path.display()))]
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> ExtractResult<String> {
    let file = File::open(path)
        .map_err(|e| ExtractError::file_not_found(path, format!("failed to open for hashing: {e}")))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut hasher = StreamingHasher::new(algorithm);
    let mut total = 0u64;

    loop {
        let buf = reader.fill_buf()
            .map_err(|e| ExtractError::file_not_found(path, format!("read error while hashing: {e}")))?;
        let len = buf.len();
        if len == 0 {
            break;
        }

        hasher.update(buf);
        reader.consume(len);
        total += len as u64;
    }

    let hash = hasher.finalize();
    debug!(algorithm = algorithm.name(), bytes = total, hash = %hash, "File fingerprint complete");
    Ok(hash)
}
