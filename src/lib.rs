//! Local account store: registration, login, session and profile editing,
//! persisted on the local filesystem.
//!
//! ## Modules
//! - `cli` — Command-line handlers
//! - `core` — Credential store, session persistence, account flow, audit
//! - `models` — Data structures
//! - `util` — Filesystem and journald helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod util;
