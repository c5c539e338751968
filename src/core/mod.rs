//! Core business logic: credential store, session persistence, account flow.

pub mod account_service;
pub mod audit_log;
pub mod config;
pub mod credential_store;
pub mod error;
pub mod file_lock;
pub mod local_storage;
pub mod password;
pub mod paths;
pub mod session_store;
pub mod validation;
