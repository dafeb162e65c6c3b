//! Request guards implemented as Axum extractors.
//!
//! - [`auth`] -- bearer-token authentication ([`auth::AuthUser`]).
//! - [`rbac`] -- role gating on top of it ([`rbac::RequireAdmin`]).

pub mod auth;
pub mod rbac;
