//! Logging integration for listq.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-listing spans.
//!
//! The listing engine emits composed SQL under the [`TRACE_TARGET`] target.
//! With query tracing switched on for a call those events are emitted at
//! `INFO`, otherwise at `DEBUG`.

use crate::settings::Settings;

/// The `tracing` target used for per-call SQL traces.
pub const TRACE_TARGET: &str = "listq::trace";

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level` (e.g. "debug", "info",
/// "listq=trace"). In debug mode a pretty, human-readable format is used;
/// otherwise a structured JSON format is used.
///
/// Installing a subscriber twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one listing call.
///
/// # Examples
///
/// ```
/// use listq_core::logging::list_span;
///
/// let span = list_span("blog_article");
/// let _guard = span.enter();
/// tracing::info!("listing");
/// ```
pub fn list_span(table: &str) -> tracing::Span {
    tracing::info_span!("list", table = table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let settings = Settings::default();
        setup_logging(&settings);
        setup_logging(&settings);
    }

    #[test]
    fn test_setup_logging_bad_filter_falls_back() {
        let settings = Settings {
            log_level: "[[not a filter".into(),
            debug: true,
            ..Settings::default()
        };
        setup_logging(&settings);
    }

    #[test]
    fn test_list_span_enters() {
        let span = list_span("blog_article");
        let _guard = span.enter();
        tracing::debug!(target: TRACE_TARGET, "inside");
    }
}
