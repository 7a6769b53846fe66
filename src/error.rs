//! Error types for the reservation service.
//!
//! Allocation outcomes (`Exhausted`, `OutOfRange`, `AlreadyFree`) and lookup
//! or auth failures are ordinary return values the caller is expected to
//! handle; the process keeps serving after any of them. Only [`SetupError`]
//! is fatal, and only during startup, before the server accepts traffic.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from [`IndexPool`](crate::pool::IndexPool) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No free index at the moment of the call. A normal outcome, not a
    /// fault; a capacity-zero pool returns this on every allocate.
    #[error("no free index available")]
    Exhausted,

    #[error("index {index} is outside [0, {capacity})")]
    OutOfRange { index: i64, capacity: u32 },

    /// The index is already in the free queue. Releasing a never-allocated
    /// or already-released index is rejected, not silently accepted.
    #[error("index {index} is already free")]
    AlreadyFree { index: u32 },
}

/// Errors surfaced to the boundary layer for reserve/release requests.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("unknown resource: {name}")]
    UnknownResource { name: String },

    #[error("invalid auth token for resource: {name}")]
    Unauthorized { name: String },

    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The snapshot write failed after the in-memory mutation. The mutation
    /// is rolled back before this is returned, so the durable store and the
    /// free queues never diverge.
    #[error("snapshot write failed: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Errors from the snapshot store itself.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Fatal startup errors. These abort initialization before the network
/// interface is accepting requests; nothing here is returned once serving.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate resource name in configuration: {name}")]
    DuplicateResource { name: String },

    #[error("failed to load saved snapshot: {0}")]
    LoadSnapshot(#[from] SnapshotError),
}

/// Result type aliases for convenience
pub type PoolResult<T> = Result<T, PoolError>;
pub type ServiceResult<T> = Result<T, ServiceError>;
