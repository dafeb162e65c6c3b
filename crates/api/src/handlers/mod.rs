//! HTTP request handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod devices;
pub mod reviews;
