use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Handed to every lifecycle hook.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A unit of the application: lifecycle hooks plus the routes it contributes.
///
/// The registry calls `init` on every module before any `start`, and `stop`
/// in reverse registration order on shutdown.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also the mount point of [`Module::routes`].
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// JSON routes, nested under `/api/{name}`.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// HTML pages, merged at the site root.
    fn pages(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` relative to `/api/{name}`, plus `components`).
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
