//! Execution result persistence.
//!
//! [`ResultStore`] is the persistence seam: Postgres in deployments, an
//! in-memory store for tests and database-less boots. [`ResultSink`] wraps a
//! store with the engine's tolerance rules — saves never fail the caller,
//! reads re-apply output extraction to wrapped raw-text payloads.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod sink;
pub mod store;

pub use error::ResultStoreError;
pub use memory::MemoryResultStore;
pub use postgres::PgResultStore;
pub use sink::ResultSink;
pub use store::ResultStore;
