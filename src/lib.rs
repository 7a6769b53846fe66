//! respool: named, fixed-capacity pools of integer-indexed resource units.
//!
//! Clients reserve and release indices over HTTP, each pool guarded by a
//! shared auth token. Every successful mutation is durably snapshotted
//! before it is acknowledged, so pool state survives process restarts.
//!
//! ## Architecture
//!
//! Request → [`PoolRegistry`] lookup → auth check → [`IndexPool`]
//! allocate/release → [`SnapshotStore`] commit, all inside one
//! [`ReservationService`] critical section. The HTTP routing, CLI parsing,
//! and signal handling are thin adapters around that service object.

// Core error handling
pub mod error;

// Per-pool FIFO allocation
pub mod pool;

// Name → pool lookup, immutable after startup
pub mod registry;

// Resource configuration loading
pub mod config;

// Durable snapshot store and startup recovery
pub mod persist;

// Shared-secret check
pub mod auth;

// The mutate+persist transaction
pub mod service;

// REST API boundary (when enabled)
#[cfg(feature = "server")]
pub mod api;

// Public re-exports
pub use config::{ResourceConfig, ServiceConfig};
pub use error::{PoolError, ServiceError, SetupError, SnapshotError};
pub use persist::{recover, SavedPool, SavedSnapshot, SnapshotStore};
pub use pool::IndexPool;
pub use registry::PoolRegistry;
pub use service::ReservationService;
