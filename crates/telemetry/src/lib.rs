//! Logging and tracing bootstrap for the shelf binaries.

use anyhow::Context;
use bookclub_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `telemetry.log_level`. Calling this twice is an error,
/// which callers that may race (tests) can ignore.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = build_filter(&settings.log_level)?;

    let result = match settings.log_format {
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(true).try_init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init(),
    };

    result
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("failed to install tracing subscriber")?;

    tracing::info!(
        target: "bookclub-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

fn build_filter(fallback: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(fallback)
            .with_context(|| format!("invalid log level directive '{}'", fallback)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_directive_is_validated() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert!(build_filter("info,bookclub_sheets=debug").is_ok());
        assert!(build_filter("info=notalevel").is_err());
    }

    #[test]
    fn second_init_reports_an_error() {
        let settings = TelemetrySettings::default();
        let _ = init(&settings);
        assert!(init(&settings).is_err());
    }
}
