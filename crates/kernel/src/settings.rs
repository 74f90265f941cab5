use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKCLUB_ENV";
const CONFIG_DIR_ENV: &str = "BOOKCLUB_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKCLUB";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub sheet: SheetSettings,
    #[serde(default)]
    pub credentials: CredentialSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// the optional secrets file and finally `BOOKCLUB_*` variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));
        let secrets_path = config_dir.join("secrets.toml");

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(config::File::from(secrets_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parse_environment(&environment)?;

        Ok(settings)
    }
}

fn parse_environment(name: &str) -> anyhow::Result<Environment> {
    match name {
        "local" => Ok(Environment::Local),
        "staging" => Ok(Environment::Staging),
        "production" => Ok(Environment::Production),
        other => Err(anyhow!(
            "unsupported environment '{}'; expected local/staging/production",
            other
        )),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Which store implementation backs the shelf.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Google,
    Memory,
}

/// Location of the spreadsheet used as the book table.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Spreadsheet looked up by name when no id is configured.
    #[serde(default = "SheetSettings::default_spreadsheet_name")]
    pub spreadsheet_name: String,
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default = "SheetSettings::default_sheets_api_base")]
    pub sheets_api_base: String,
    #[serde(default = "SheetSettings::default_drive_api_base")]
    pub drive_api_base: String,
    /// Seconds a fetched snapshot may be served before refetching. Zero disables caching.
    #[serde(default)]
    pub cache_ttl_secs: u64,
}

impl SheetSettings {
    fn default_spreadsheet_name() -> String {
        "BookClubDB".to_string()
    }

    fn default_sheets_api_base() -> String {
        "https://sheets.googleapis.com".to_string()
    }

    fn default_drive_api_base() -> String {
        "https://www.googleapis.com".to_string()
    }
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            spreadsheet_name: Self::default_spreadsheet_name(),
            spreadsheet_id: None,
            sheets_api_base: Self::default_sheets_api_base(),
            drive_api_base: Self::default_drive_api_base(),
            cache_ttl_secs: 0,
        }
    }
}

/// Service-account credential sources, consulted file first.
#[derive(Clone, Deserialize)]
pub struct CredentialSettings {
    #[serde(default = "CredentialSettings::default_file")]
    pub file: String,
    /// Raw service-account JSON, usually injected through the environment.
    #[serde(default)]
    pub gcp_json: Option<String>,
}

impl CredentialSettings {
    fn default_file() -> String {
        "service_account.json".to_string()
    }
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            file: Self::default_file(),
            gcp_json: None,
        }
    }
}

impl fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("file", &self.file)
            .field("gcp_json", &self.gcp_json.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Fallback filter directive used when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: Self::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_sheet_targets_google_by_name() {
        let settings = Settings::default();
        assert_eq!(settings.sheet.backend, StoreBackend::Google);
        assert_eq!(settings.sheet.spreadsheet_name, "BookClubDB");
        assert!(settings.sheet.spreadsheet_id.is_none());
        assert_eq!(settings.sheet.cache_ttl_secs, 0);
    }

    #[test]
    fn default_credential_file_is_local_json() {
        let settings = Settings::default();
        assert_eq!(settings.credentials.file, "service_account.json");
        assert!(settings.credentials.gcp_json.is_none());
    }

    #[test]
    fn credential_blob_is_redacted_in_debug_output() {
        let credentials = CredentialSettings {
            file: "key.json".to_string(),
            gcp_json: Some("{\"private_key\":\"secret\"}".to_string()),
        };
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert_eq!(parse_environment("staging").unwrap(), Environment::Staging);
        assert!(parse_environment("qa").is_err());
    }

    #[test]
    fn sections_deserialize_from_toml() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 9090

                [sheet]
                backend = "memory"
                spreadsheet_id = "abc123"
                cache_ttl_secs = 5

                [telemetry]
                log_format = "json"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let settings: Settings = cfg.try_deserialize().unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.sheet.backend, StoreBackend::Memory);
        assert_eq!(settings.sheet.spreadsheet_id.as_deref(), Some("abc123"));
        assert_eq!(settings.sheet.cache_ttl_secs, 5);
        assert_eq!(settings.telemetry.log_format, LogFormat::Json);
    }
}
