//! Service-account credential resolution.

use std::fmt;
use std::path::PathBuf;

use bookclub_kernel::settings::CredentialSettings;
use serde::Deserialize;

use crate::error::StoreError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service-account key file this crate uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        let key: ServiceAccountKey = serde_json::from_str(raw)
            .map_err(|e| StoreError::InvalidCredentials(e.to_string()))?;
        if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
            return Err(StoreError::InvalidCredentials(
                "client_email and private_key must be set".to_string(),
            ));
        }
        Ok(key)
    }
}

/// Where the key was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    File(PathBuf),
    Configuration,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::File(path) => write!(f, "file {}", path.display()),
            CredentialSource::Configuration => f.write_str("credentials.gcp_json"),
        }
    }
}

/// Resolve the key: the local file when it exists, otherwise the configured JSON blob.
pub async fn resolve(
    settings: &CredentialSettings,
) -> Result<(ServiceAccountKey, CredentialSource), StoreError> {
    let path = PathBuf::from(&settings.file);
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            StoreError::InvalidCredentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        let key = ServiceAccountKey::from_json(&raw)?;
        return Ok((key, CredentialSource::File(path)));
    }

    match settings.gcp_json.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            let key = ServiceAccountKey::from_json(raw)?;
            Ok((key, CredentialSource::Configuration))
        }
        _ => Err(StoreError::MissingCredentials {
            file: settings.file.clone(),
        }),
    }
}
