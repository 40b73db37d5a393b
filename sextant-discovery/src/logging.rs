//! Logging for discovery
//!
//! The adapter reports rejected registry entries through an injected
//! [`DiscoveryLogger`] rather than a global logger, so callers decide where
//! the warnings go. [`TracingLogger`] is the production sink.
//!
//! # Environment Variables
//!
//! - `SEXTANT_LOG_LEVEL` - env-filter directive, e.g. `debug` or
//!   `sextant::discovery=debug,info` (default `info`)
//! - `SEXTANT_LOG_FORMAT=json|pretty|compact` - output format (default `json`)

use std::env;
use std::sync::{Arc, Mutex, PoisonError};

/// Target used for all discovery log lines.
pub const LOG_TARGET: &str = "sextant::discovery";

/// Sink for operator-facing discovery warnings
pub trait DiscoveryLogger: Send + Sync {
    fn warn(&self, message: &str);
}

impl<L: DiscoveryLogger + ?Sized> DiscoveryLogger for Arc<L> {
    fn warn(&self, message: &str) {
        (**self).warn(message)
    }
}

/// Forwards warnings to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl DiscoveryLogger for TracingLogger {
    fn warn(&self, message: &str) {
        tracing::warn!(target: LOG_TARGET, "{}", message);
    }
}

/// Keeps every warning in memory, for tests and diagnostics
#[derive(Debug, Clone, Default)]
pub struct CapturingLogger {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CapturingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All warnings received so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DiscoveryLogger for CapturingLogger {
    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human readable output
    Pretty,
    /// Single-line text
    Compact,
    /// JSON, one object per line
    Json,
}

impl Format {
    /// Get format from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Install a global `tracing` subscriber configured from the environment.
///
/// Returns `false` if a subscriber was already installed; the existing one
/// is left untouched.
pub fn init() -> bool {
    let level = env::var("SEXTANT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let format = env::var("SEXTANT_LOG_FORMAT")
        .ok()
        .and_then(|s| Format::parse(&s))
        .unwrap_or(Format::Json);

    init_with(&level, format)
}

/// Install a global `tracing` subscriber with an explicit filter and format.
pub fn init_with(level: &str, format: Format) -> bool {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        Format::Json => registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init(),
        Format::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        Format::Compact => registry.with(fmt::layer().compact()).try_init(),
    };

    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capturing_logger() {
        let logger = CapturingLogger::new();
        let shared = logger.clone();

        shared.warn("first");
        shared.warn("second");

        assert_eq!(logger.count(), 2);
        assert_eq!(logger.messages(), vec!["first", "second"]);

        logger.clear();
        assert_eq!(shared.count(), 0);
    }

    #[test]
    fn test_arc_logger() {
        let logger = Arc::new(CapturingLogger::new());
        let dynamic: Arc<dyn DiscoveryLogger> = logger.clone();

        dynamic.warn("through arc");
        assert_eq!(logger.messages(), vec!["through arc"]);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("JSON"), Some(Format::Json));
        assert_eq!(Format::parse("pretty"), Some(Format::Pretty));
        assert_eq!(Format::parse("compact"), Some(Format::Compact));
        assert_eq!(Format::parse("xml"), None);
    }

    #[test]
    fn test_init_is_idempotent() {
        init_with("warn", Format::Compact);
        assert!(!init_with("debug", Format::Json));
        TracingLogger.warn("emitted after init");
    }
}
