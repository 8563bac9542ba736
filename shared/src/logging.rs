//! Shared logging utilities for consistent tracing across the runner crates

use chrono::{DateTime, Utc};

/// Default log level when neither the caller nor `RUST_LOG` picks one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the per-crate filter directive for the given base level
pub fn default_filter(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or(DEFAULT_LOG_LEVEL);
    format!("jar_runner={base_level},war_runner={base_level},shared={base_level},reqwest=warn")
}

fn env_filter(log_level: Option<&str>) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)))
}

/// Initialize the global stdout subscriber.
///
/// `RUST_LOG` wins over `log_level` when it is set. Panics if a global
/// subscriber is already installed, so binaries call this exactly once.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::fmt;

    fmt()
        .with_env_filter(env_filter(log_level))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Like [`init_tracing`] but tolerates an already installed subscriber.
///
/// Returns `true` when this call installed it. Meant for tests, where many
/// cases race to set up logging.
pub fn try_init_tracing(log_level: Option<&str>) -> bool {
    use tracing_subscriber::fmt;

    fmt()
        .with_env_filter(env_filter(log_level))
        .with_target(true)
        .with_test_writer()
        .try_init()
        .is_ok()
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for tag-aware info logging
#[macro_export]
macro_rules! runner_info {
    ($tag:expr, $($arg:tt)*) => {
        tracing::info!(
            tag = %$tag,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for tag-aware warning logging
#[macro_export]
macro_rules! runner_warn {
    ($tag:expr, $($arg:tt)*) => {
        tracing::warn!(
            tag = %$tag,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for tag-aware error logging
#[macro_export]
macro_rules! runner_error {
    ($tag:expr, $($arg:tt)*) => {
        tracing::error!(
            tag = %$tag,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for tag-aware debug logging
#[macro_export]
macro_rules! runner_debug {
    ($tag:expr, $($arg:tt)*) => {
        tracing::debug!(
            tag = %$tag,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_level() {
        let filter = default_filter(Some("debug"));
        assert!(filter.starts_with("jar_runner=debug"));
        assert!(filter.contains("war_runner=debug"));
        assert!(filter.ends_with("reqwest=warn"));
    }

    #[test]
    fn test_default_filter_falls_back_to_info() {
        assert!(default_filter(None).contains("shared=info"));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = format_timestamp();
        // HH:MM:SS.mmm
        assert_eq!(ts.len(), 12);
        assert_eq!(&ts[2..3], ":");
        assert_eq!(&ts[8..9], ".");
    }

    #[test]
    fn test_macros_expand() {
        let _ = try_init_tracing(Some("debug"));
        runner_info!("process-key_test", "info {}", 1);
        runner_warn!("process-key_test", "warn");
        runner_error!("process-key_test", "error");
        runner_debug!("process-key_test", pid = 7, "debug");
    }
}
