//! Domain types shared by every GreenView crate.
//!
//! Holds the explicit service configuration, the error taxonomy, splat
//! payload normalization, remote envelope helpers, and the diagnostic log
//! entry shape. Nothing in here performs I/O.

pub mod config;
pub mod diagnostics;
pub mod envelope;
pub mod error;
pub mod splat;
pub mod types;
