//! Module checkout lifecycle: materialization, caching, locking, cleanup.
//!
//! A "checkout" is a local directory holding ready-to-run module code. The
//! [`Materializer`] produces checkouts on demand (clone + dependency install +
//! optional subfolder extraction), the [`CheckoutCache`] remembers them, the
//! [`KeyedLocks`] serialize concurrent materializations of the same key, and
//! the [`CheckoutSweeper`] reclaims disk space from checkouts nobody uses.

pub mod cache;
pub mod error;
pub mod keylock;
pub mod materializer;
pub mod reporef;
pub mod sweeper;

pub use cache::{CachedCheckout, CheckoutCache};
pub use error::MaterializeError;
pub use keylock::KeyedLocks;
pub use materializer::Materializer;
pub use reporef::RepoRef;
pub use sweeper::CheckoutSweeper;
