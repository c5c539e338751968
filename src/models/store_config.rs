//! store.toml model.

use crate::models::policy::PolicySection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub policy: PolicySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_version")]
    pub version: u32,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            version: default_version(),
        }
    }
}

fn default_version() -> u32 {
    1
}
