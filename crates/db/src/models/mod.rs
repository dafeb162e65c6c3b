//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A safe `Serialize` response DTO where the row carries secrets
//! - Create/update DTOs for inserts and patches

pub mod device;
pub mod review;
pub mod user;
