//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod device_repo;
pub mod review_repo;
pub mod revoked_token_repo;
pub mod user_repo;

pub use device_repo::DeviceRepo;
pub use review_repo::ReviewRepo;
pub use revoked_token_repo::RevokedTokenRepo;
pub use user_repo::UserRepo;
