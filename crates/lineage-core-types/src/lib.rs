//! Core types shared across the lineage crates
//!
//! This crate provides foundational types used by both error handling
//! and logging:
//!
//! - **Correlation types**: RequestId, attached to every engine operation
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
