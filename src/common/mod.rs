// Common utilities shared across package parsers

pub mod hash;
pub mod binary;
pub mod magic;

// Re-exports for convenience
pub use hash::{HashAlgorithm, StreamingHasher, compute_hash, hash_file};
pub use magic::{is_binary_plist, is_png, png_dimensions};

// Shared constants
pub const BUFFER_SIZE: usize = 1024 * 1024; // 1MB read buffer for fingerprinting
