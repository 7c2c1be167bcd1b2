//! Row structs for the service tables.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row. Insert inputs live in `greenview_core` because the
//! gateway and synchronizer build them.

pub mod api_log;
pub mod setting;
pub mod splat;
