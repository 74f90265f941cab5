use std::sync::Arc;

use async_trait::async_trait;
use bookclub_kernel::{InitCtx, Module};

use crate::connection::Connection;

/// Core module owning the store connection lifecycle.
pub struct SheetsModule {
    connection: Arc<Connection>,
}

impl SheetsModule {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl Module for SheetsModule {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            backend = ?ctx.settings.sheet.backend,
            spreadsheet = %ctx.settings.sheet.spreadsheet_name,
            "sheets module initialized"
        );
        Ok(())
    }

    /// Warm the connection. Failure is logged only; pages report it on the next load.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        match self.connection.connect().await {
            Ok(store) => {
                tracing::info!(module = self.name(), store = %store.describe(), "store connected")
            }
            Err(err) => {
                tracing::warn!(module = self.name(), error = %err, "store unavailable at startup")
            }
        }
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "sheets module stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookclub_kernel::settings::{CredentialSettings, SheetSettings, Settings};

    #[tokio::test]
    async fn start_never_fails_on_missing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = CredentialSettings {
            file: dir.path().join("absent.json").to_string_lossy().to_string(),
            gcp_json: None,
        };
        let connection = Arc::new(Connection::new(SheetSettings::default(), credentials));
        let module = SheetsModule::new(Arc::clone(&connection));

        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };
        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        assert!(!connection.is_connected());
    }
}
