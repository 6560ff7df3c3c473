//! Filesystem primitives for the drift monitor
//!
//! Provides normalized path handling, monitoring-root scope enforcement,
//! deterministic directory listings, and the Merkle digest primitives the
//! scan engine is built on.

pub mod digest;
pub mod error;
pub mod listing;
pub mod path;
pub mod scope;

pub use digest::{CHUNK_SIZE, DigestKind, Hasher, hashes_equal};
pub use error::{Error, Result};
pub use listing::Listing;
pub use path::NormalizedPath;
pub use scope::ScanScope;
