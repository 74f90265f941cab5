use std::sync::Arc;

use anyhow::Context;
use bookclub_kernel::settings::Settings;
use bookclub_kernel::{InitCtx, ModuleRegistry};
use bookclub_sheets::Connection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load bookclub settings")?;
    bookclub_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.sheet.backend,
        spreadsheet = %settings.sheet.spreadsheet_name,
        "bookclub-app bootstrap starting"
    );

    let connection = Arc::new(Connection::new(
        settings.sheet.clone(),
        settings.credentials.clone(),
    ));

    let mut registry = ModuleRegistry::new();
    bookclub_app::register_all(&mut registry, &settings, connection);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("bookclub-app bootstrap complete");
    let served = bookclub_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}
