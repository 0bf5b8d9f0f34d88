//! # solace-config
//!
//! Configuration system for the Solace memory engine. Reads from `solace.toml`
//! and environment variables — in that precedence order.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{ConfigWarning, LoggingConfig, MemoryConfig, SolaceConfig, WarningSeverity};
