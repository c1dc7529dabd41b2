use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_TARGETS: [&str; 2] = ["referral_service", "tower_http"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`
    pub level: String,
    /// Emit one JSON object per line instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Raises the level by one step per `-v`, stopping at `trace`.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        if verbose > 0 {
            let levels = ["error", "warn", "info", "debug", "trace"];
            let current = levels
                .iter()
                .position(|l| l.eq_ignore_ascii_case(&self.level))
                .unwrap_or(2);
            let raised = (current + verbose as usize).min(levels.len() - 1);
            self.level = levels[raised].to_string();
        }
        self
    }
}

fn filter_directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.level)));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let fmt_layer = if config.json {
        fmt_layer.json().flatten_event(true).boxed()
    } else {
        fmt_layer.boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_service_and_http_layer() {
        assert_eq!(
            filter_directives("debug"),
            "referral_service=debug,tower_http=debug"
        );
    }

    #[test]
    fn verbosity_raises_level() {
        let base = LoggingConfig::default();
        assert_eq!(base.clone().with_verbosity(0).level, "info");
        assert_eq!(base.clone().with_verbosity(1).level, "debug");
        assert_eq!(base.with_verbosity(5).level, "trace");
    }

    #[test]
    fn unknown_level_is_treated_as_info() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            json: false,
        };
        assert_eq!(config.with_verbosity(1).level, "debug");
    }
}
