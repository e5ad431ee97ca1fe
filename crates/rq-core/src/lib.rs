//! rusty-qa/crates/rq-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-QA:
//! content validation, vote tracking, answer ranking, and the test harness.

pub mod error;
pub mod harness;
pub mod models;
pub mod ranking;
pub mod service;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use service::QaService;
pub use traits::*;
pub use validation::{validate_answer, validate_question, ValidationResult};
