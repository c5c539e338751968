//! Data structures.

pub mod account;
pub mod policy;
pub mod session;
pub mod store_config;
