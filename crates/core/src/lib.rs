//! Shared domain types for the aidex catalog service.

pub mod error;
pub mod rating;
pub mod types;
