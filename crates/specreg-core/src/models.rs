//! Domain models for the specification registry.
//!
//! These are the core types shared across all crates.

pub mod additional_requirement;
pub mod core_element;
pub mod extension_element;
pub mod extension_model;
pub mod invoice_model;
pub mod specification;
pub mod user;
pub mod user_group;
