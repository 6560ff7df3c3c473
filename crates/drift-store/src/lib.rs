//! State records and storage contract for the drift monitor
//!
//! Defines the persisted shapes (path records, baseline snapshots, site
//! statuses), the `StateStore` trait the engine consumes, the in-memory
//! reference store, and the bounded retry policy wrapped around every
//! storage call.

pub mod error;
pub mod record;
pub mod retry;
pub mod store;

pub use error::{Error, Result};
pub use record::{ChildLists, PathRecord, SiteStatus, StateSnapshot, path_key};
pub use retry::{RetryConfig, with_retry};
pub use store::{MemoryStore, StateStore, StoredState};
