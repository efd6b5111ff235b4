//! Module execution: input assembly, entrypoint discovery, subprocess run.
//!
//! The runner materializes a module's code, builds its input document
//! (defaults + caller fields + best-effort site/plugin enrichment), spawns
//! the entrypoint as a child process on a JSON-over-stdio contract, parses
//! whatever lands on stdout, and hands the result to the sink.

pub mod entrypoint;
pub mod error;
pub mod input;
pub mod process;
pub mod runner;

pub use entrypoint::{find_entrypoint, Ecosystem, Entrypoint};
pub use error::ExecuteError;
pub use runner::ModuleRunner;
