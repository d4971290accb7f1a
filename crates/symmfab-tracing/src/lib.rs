//! Shared tracing setup for the symmfab workspace.
//!
//! Test harnesses, benches, and tools all install their `tracing`
//! subscriber through this crate, so filter resolution and output format
//! stay consistent across the workspace instead of being copy-pasted per
//! binary.

use std::env;
use std::error::Error;
use std::fmt;

pub use tracing::{debug, error, info, trace, warn};

use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Registry};

/// Directive applied when neither explicit directives nor `RUST_LOG` are set.
const FALLBACK_DIRECTIVE: &str = "info";

/// Output format for the formatter layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Single-line output for terminals
    Compact,
    /// Multi-line human-oriented output
    Pretty,
    /// Machine-readable output for CI log collection (implies no ANSI)
    Json,
}

impl TracingFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// How the shared subscriber should behave.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Tracing directives (e.g. `symmfab_device=debug,info`). When absent,
    /// `RUST_LOG` applies, then [`FALLBACK_DIRECTIVE`].
    pub directives: Option<String>,
    /// Output format for the formatter layer.
    pub format: TracingFormat,
    /// ANSI colour; forced off for JSON output.
    pub ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            directives: None,
            format: TracingFormat::Compact,
            ansi: true,
        }
    }
}

impl TracingConfig {
    /// Build a configuration from environment hints.
    ///
    /// # Environment Variables
    ///
    /// - `SYMMFAB_LOG` - tracing directives (falls back to `RUST_LOG`)
    /// - `SYMMFAB_LOG_FORMAT` - `compact` (default), `pretty`, or `json`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(directives) = env::var("SYMMFAB_LOG") {
            if !directives.trim().is_empty() {
                config.directives = Some(directives);
            }
        }

        if let Some(format) = env::var("SYMMFAB_LOG_FORMAT")
            .ok()
            .and_then(|value| TracingFormat::parse(&value))
        {
            config.format = format;
        }

        if config.format == TracingFormat::Json {
            config.ansi = false;
        }

        config
    }

    fn resolve_filter(&self) -> Result<EnvFilter, TracingInitError> {
        match &self.directives {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|err| TracingInitError::InvalidFilter(err.to_string()))
            }
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))),
        }
    }
}

/// Errors surfaced when installing the shared subscriber fails.
#[derive(Debug)]
pub enum TracingInitError {
    /// The directive string could not be parsed.
    InvalidFilter(String),
    /// A global subscriber is already installed.
    AlreadyInstalled(tracing_subscriber::util::TryInitError),
}

impl fmt::Display for TracingInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TracingInitError::InvalidFilter(msg) => write!(f, "invalid tracing directive: {msg}"),
            TracingInitError::AlreadyInstalled(err) => write!(f, "tracing subscriber already installed: {err}"),
        }
    }
}

impl Error for TracingInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TracingInitError::AlreadyInstalled(err) => Some(err),
            _ => None,
        }
    }
}

/// Build a subscriber without installing it (for per-test scoping).
pub fn build_subscriber(config: &TracingConfig) -> Result<impl Subscriber + Send + Sync, TracingInitError> {
    let filter = config.resolve_filter()?;
    let base = tracing_fmt::layer().with_ansi(config.ansi);
    let layer: Box<dyn tracing_subscriber::Layer<Registry> + Send + Sync> = match config.format {
        TracingFormat::Compact => Box::new(base.compact()),
        TracingFormat::Pretty => Box::new(base.pretty()),
        TracingFormat::Json => Box::new(base.json().with_ansi(false)),
    };
    Ok(Registry::default().with(layer).with(filter))
}

/// Install the configured subscriber as the process-wide default.
pub fn init_global_tracing(config: &TracingConfig) -> Result<(), TracingInitError> {
    build_subscriber(config)?
        .try_init()
        .map_err(TracingInitError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that touch process environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn rejects_invalid_directive() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("RUST_LOG");
        let config = TracingConfig {
            directives: Some("=::invalid".to_string()),
            ..TracingConfig::default()
        };
        assert!(matches!(
            build_subscriber(&config),
            Err(TracingInitError::InvalidFilter(_))
        ));
    }

    #[test]
    fn builds_with_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        assert!(build_subscriber(&TracingConfig::default()).is_ok());
    }

    #[test]
    fn from_env_reads_directives_and_format() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("SYMMFAB_LOG", "symmfab_device=debug");
        env::set_var("SYMMFAB_LOG_FORMAT", "json");

        let config = TracingConfig::from_env();
        assert_eq!(config.directives.as_deref(), Some("symmfab_device=debug"));
        assert_eq!(config.format, TracingFormat::Json);
        assert!(!config.ansi, "json output must not carry colour codes");

        env::remove_var("SYMMFAB_LOG");
        env::remove_var("SYMMFAB_LOG_FORMAT");
    }

    #[test]
    fn unknown_format_keeps_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("SYMMFAB_LOG_FORMAT", "yaml");
        let config = TracingConfig::from_env();
        assert_eq!(config.format, TracingFormat::Compact);
        env::remove_var("SYMMFAB_LOG_FORMAT");
    }
}
