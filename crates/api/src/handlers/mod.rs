pub mod cache;
pub mod config;
pub mod logs;
pub mod splats;
pub mod sync;
