pub mod config;
pub mod extract;
pub mod types;

pub use config::Config;
pub use types::*;
