//! HTTP clients for the collaborator registries.
//!
//! The engine consumes three read-only services: the module registry (module
//! descriptors), the site service (site identity), and the plugin service
//! (plugins attached to a site). All calls carry a short-lived
//! service-to-service bearer token from the auth service.

pub mod client;
pub mod error;
pub mod token;

pub use client::RegistryClient;
pub use error::RegistryError;
pub use token::ServiceTokenProvider;
