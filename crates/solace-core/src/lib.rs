//! # solace-core
//!
//! Core types and primitives for the Solace memory engine.
//! This crate defines the shared vocabulary used by every other crate in the workspace.

pub mod error;

pub use error::{Result, SolaceError};
