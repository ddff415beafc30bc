//! Tracing subscriber setup for the binary.

use std::str::FromStr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the filter: `RUST_LOG` when set, otherwise `level`.
///
/// A bare level such as `debug` quiets the HTTP stack; a directive string
/// containing `,` or `=` is used as-is.
pub fn build_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::from_str(&filter_spec(level)).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn filter_spec(level: &str) -> String {
    let normalized = level.trim();
    if normalized.contains(',') || normalized.contains('=') {
        normalized.to_string()
    } else {
        format!("{},hyper=info,hyper_util=info,reqwest=info,rustls=info", normalized)
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean.
pub fn setup_logging(level: &str, json_format: bool) {
    let subscriber = tracing_subscriber::registry().with(build_filter(level));

    if json_format {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_current_span(false);
        subscriber.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact();
        subscriber.with(fmt_layer).init();
    }

    tracing::debug!(level, format = if json_format { "json" } else { "compact" }, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_gets_http_overrides() {
        let spec = filter_spec(" debug ");
        assert!(spec.starts_with("debug,"));
        assert!(spec.contains("reqwest=info"));
    }

    #[test]
    fn test_directives_kept_as_is() {
        assert_eq!(filter_spec("warn,ipo_feed=debug"), "warn,ipo_feed=debug");
        assert_eq!(filter_spec("ipo_feed=trace"), "ipo_feed=trace");
    }
}
