//! Content hashing for lockfiles.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Hex SHA-256 of a file's contents, or `None` if it cannot be read.
pub fn hash_file(path: &Path) -> Option<String> {
    let content = fs::read(path).ok()?;
    let digest = Sha256::digest(&content);
    Some(hex::encode(digest))
}
