//! Credential reference configuration.
//!
//! Only opaque reference names live here. Resolution to real secrets is an
//! external collaborator's job; this crate never reads or logs secret values.

use serde::{Deserialize, Serialize};

/// Named handles for exchange credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRefs {
    /// Reference name for the API key (e.g. an environment variable name).
    #[serde(default = "default_api_key_ref")]
    pub api_key_ref: String,
    /// Reference name for the API secret.
    #[serde(default = "default_api_secret_ref")]
    pub api_secret_ref: String,
}

impl Default for CredentialRefs {
    fn default() -> Self {
        Self {
            api_key_ref: default_api_key_ref(),
            api_secret_ref: default_api_secret_ref(),
        }
    }
}

fn default_api_key_ref() -> String {
    "EXCHANGE_API_KEY".to_string()
}

fn default_api_secret_ref() -> String {
    "EXCHANGE_API_SECRET".to_string()
}
