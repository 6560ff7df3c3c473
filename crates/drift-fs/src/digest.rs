//! Merkle digest primitives
//!
//! Provides the content fingerprints used throughout the workspace for
//! integrity verification and drift detection: streamed file digests,
//! link-target digests, and the deterministic combinator that derives a
//! directory's fingerprint from its children's fingerprints.
//!
//! The digest is chosen for speed and stability, not for collision
//! resistance against an adversary. All digests are fixed-width lowercase
//! hex; comparisons go through [`hashes_equal`], which is case-insensitive
//! so fingerprints survive round-trips through backends that fold case.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::Read;

use crate::{Error, NormalizedPath, Result};

/// Fixed read size for streamed file hashing.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Selectable digest function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    #[default]
    Sha256,
    Sha512,
}

/// Streaming digest state for the selected function.
pub struct Hasher {
    inner: Inner,
}

enum Inner {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Hasher {
    pub fn new(kind: DigestKind) -> Self {
        let inner = match kind {
            DigestKind::Sha256 => Inner::Sha256(Sha256::new()),
            DigestKind::Sha512 => Inner::Sha512(Sha512::new()),
        };
        Self { inner }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        match &mut self.inner {
            Inner::Sha256(h) => h.update(bytes),
            Inner::Sha512(h) => h.update(bytes),
        }
    }

    /// Finish the digest as lowercase hex.
    pub fn finish(self) -> String {
        match self.inner {
            Inner::Sha256(h) => format!("{:x}", h.finalize()),
            Inner::Sha512(h) => format!("{:x}", h.finalize()),
        }
    }
}

/// Case-insensitive fingerprint comparison.
pub fn hashes_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Digest of an in-memory string.
pub fn hash_content(kind: DigestKind, content: &str) -> String {
    let mut hasher = Hasher::new(kind);
    hasher.update(content.as_bytes());
    hasher.finish()
}

/// Digest of a file's contents, streamed in fixed-size chunks.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be opened or read; the caller
/// is responsible for isolating the failure to this one path.
pub fn hash_file(kind: DigestKind, path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let mut file = File::open(&native).map_err(|e| Error::io(&native, e))?;
    let mut hasher = Hasher::new(kind);
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|e| Error::io(&native, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish())
}

/// Digest of a symbolic link.
///
/// Hashes the formatted string `"<path> -> <target>"` built from the raw,
/// unresolved link target. A dangling target still produces a stable
/// fingerprint; it is never an error.
pub fn hash_link(kind: DigestKind, path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let target = std::fs::read_link(&native).map_err(|e| Error::io(&native, e))?;
    let formatted = format!("{} -> {}", path, NormalizedPath::new(target));
    Ok(hash_content(kind, &formatted))
}

/// Derive a directory's fingerprint from its children's fingerprints.
///
/// `dir_hashes`, `file_hashes` and `link_hashes` must be in the same order
/// as the names in `listing` (sorted by name within each category). The
/// digest input is each category's hashes concatenated in the fixed order
/// dirs, files, links; an empty category contributes a sentinel token so
/// that two directories differing only in which category is empty never
/// collide.
pub fn combine_directory(
    kind: DigestKind,
    path: &NormalizedPath,
    dir_hashes: &[String],
    file_hashes: &[String],
    link_hashes: &[String],
) -> String {
    let mut hasher = Hasher::new(kind);
    for (category, hashes) in [
        ("dirs", dir_hashes),
        ("files", file_hashes),
        ("links", link_hashes),
    ] {
        if hashes.is_empty() {
            hasher.update(format!("{path}/{category}: EMPTY ").as_bytes());
        } else {
            for h in hashes {
                hasher.update(h.to_ascii_lowercase().as_bytes());
            }
        }
    }
    hasher.finish()
}
