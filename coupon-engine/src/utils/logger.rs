//! Logging Infrastructure
//!
//! Console logging plus optional daily rolling files:
//! - `app/`: everything except usage accounting
//! - `usage/`: coupon usage increments and decrements (target `usage`)

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log target for usage ledger changes
pub const USAGE_TARGET: &str = "usage";

/// Initialize console logging at `info`
pub fn init_logger() -> anyhow::Result<()> {
    init_logger_with_file("info", None)
}

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `level`. Returns an error when a global
/// subscriber is already installed.
///
/// ```no_run
/// coupon_engine::init_logger_with_file("debug", Some("./work_dir/logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(level: &str, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    match log_dir {
        Some(dir) => {
            let log_dir = Path::new(dir);
            let app_log_dir = log_dir.join("app");
            let usage_log_dir = log_dir.join("usage");
            fs::create_dir_all(&app_log_dir)?;
            fs::create_dir_all(&usage_log_dir)?;

            let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
            let app_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != USAGE_TARGET
                }));

            let usage_log = RollingFileAppender::new(Rotation::DAILY, usage_log_dir, "usage");
            let usage_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(usage_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == USAGE_TARGET
                }));

            registry.with(app_layer).with(usage_layer).try_init()?;
        }
        None => registry.try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        init_logger_with_file("info", log_dir.to_str()).unwrap();
        tracing::info!(target: USAGE_TARGET, rule_id = 1, "usage line");

        assert!(log_dir.join("app").is_dir());
        assert!(log_dir.join("usage").is_dir());

        // A second global subscriber is refused
        assert!(init_logger().is_err());
    }
}
