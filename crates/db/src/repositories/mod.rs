//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod api_log_repo;
pub mod setting_repo;
pub mod splat_repo;

pub use api_log_repo::ApiLogRepo;
pub use setting_repo::SettingRepo;
pub use splat_repo::SplatRepo;
