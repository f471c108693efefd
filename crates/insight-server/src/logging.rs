//! Structured logging for the insight server
//!
//! Console output is pretty, JSON or compact; file output rolls daily.
//! Library crates only emit events, the subscriber lives here.

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "insight-server.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl LogFormat {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("json") => LogFormat::Json,
            Some("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_FORMAT").ok().as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    File,
    Both,
}

impl LogOutput {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("file") => LogOutput::File,
            Some("both") => LogOutput::Both,
            _ => LogOutput::Stdout,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_OUTPUT").ok().as_deref())
    }
}

/// Install the global subscriber.
///
/// Environment variables:
/// - `RUST_LOG`: filter directives (e.g. "info", "insight_parser=trace")
/// - `LOG_FORMAT`: "pretty", "json" or "compact"
/// - `LOG_OUTPUT`: "stdout", "file" or "both"
/// - `LOG_DIR`: directory for rolling log files (default "./logs")
pub fn init() {
    let format = LogFormat::from_env();
    let output = LogOutput::from_env();

    // Noisy transport crates stay at warn unless RUST_LOG names them.
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::new(format!("hyper=warn,tower=warn,tokio=warn,{}", level));

    let console_layer = || match format {
        LogFormat::Pretty => fmt::layer().pretty().with_target(true).boxed(),
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    let file_layer = || {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
        std::fs::create_dir_all(&log_dir).ok();
        let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
        fmt::layer().with_writer(appender).with_ansi(false).boxed()
    };

    let layers = match output {
        LogOutput::Stdout => vec![console_layer()],
        LogOutput::File => vec![file_layer()],
        LogOutput::Both => vec![console_layer(), file_layer()],
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .init();

    tracing::info!(format = ?format, output = ?output, "logging initialized");
}

/// Emit an event with a name and structured fields.
///
/// ```ignore
/// log_event!(
///     level: tracing::Level::INFO,
///     event: "query_executed",
///     request_id: id,
///     rows: 12
/// );
/// ```
#[macro_export]
macro_rules! log_event {
    (level: $level:expr, event: $event:expr $(, $key:ident: $value:expr)* $(,)?) => {
        tracing::event!(
            $level,
            event = $event
            $(, $key = ?$value)*
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("compact")), LogFormat::Compact);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
    }

    #[test]
    fn test_log_output_parse() {
        assert_eq!(LogOutput::parse(Some("file")), LogOutput::File);
        assert_eq!(LogOutput::parse(Some("both")), LogOutput::Both);
        assert_eq!(LogOutput::parse(Some("syslog")), LogOutput::Stdout);
        assert_eq!(LogOutput::parse(None), LogOutput::Stdout);
    }
}
