//! Core domain types for the specification registry.
//!
//! This crate defines the entities of the registry (specifications and
//! their child collections, the shared invoice/extension reference
//! models, users and user groups), the repository traits the database
//! layer implements, and the error taxonomy shared across all crates.

pub mod context;
pub mod error;
pub mod models;
pub mod repository;

pub use context::CurrentUser;
pub use error::{RegistryError, RegistryResult};
