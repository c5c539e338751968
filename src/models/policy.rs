//! Policy configuration for account operations.

use crate::constants;
use argon2::Params;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySection {
    /// Minimum password length accepted at registration.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Argon2id memory cost in KiB for newly hashed passwords.
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2id pass count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2id lanes.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Re-check email and contact number when a profile edit is saved.
    #[serde(default = "default_true")]
    pub validate_profile_updates: bool,

    /// Forward audit entries to journald.
    #[serde(default)]
    pub journald_audit: bool,
}

impl PolicySection {
    /// Argon2 cost from the policy. Out-of-range values are rejected here
    /// rather than at the first registration.
    pub fn argon2_params(&self) -> Result<Params, argon2::Error> {
        Params::new(
            self.argon2_memory_kib,
            self.argon2_iterations,
            self.argon2_parallelism,
            None,
        )
    }
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            validate_profile_updates: true,
            journald_audit: false,
        }
    }
}

fn default_min_password_length() -> usize {
    constants::DEFAULT_MIN_PASSWORD_LENGTH
}

fn default_argon2_memory_kib() -> u32 {
    Params::DEFAULT_M_COST
}

fn default_argon2_iterations() -> u32 {
    Params::DEFAULT_T_COST
}

fn default_argon2_parallelism() -> u32 {
    Params::DEFAULT_P_COST
}

fn default_true() -> bool {
    true
}
