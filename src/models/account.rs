//! Account and profile records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-visible profile. Serialized with the camelCase keys the session cache uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub profile_picture: String,
}

impl Profile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Argon2id hash in PHC string form (algorithm, cost, salt and hash in one
/// field). Never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRecord {
    pub phc: String,
}

/// A persisted account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub username: String,
    pub secret: PasswordRecord,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The whole account collection, keyed by username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub accounts: BTreeMap<String, UserAccount>,
}

impl Default for AccountsFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            accounts: BTreeMap::new(),
        }
    }
}

fn default_version() -> u32 {
    1
}
