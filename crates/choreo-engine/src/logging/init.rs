use std::io::Write;
use std::sync::Once;

use log::LevelFilter;

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "CHOREO_LOG";

/// Logger setup.
///
/// The filter is taken from the first of: [`filter`](Self::filter),
/// `CHOREO_LOG`, `RUST_LOG`, then `level` for everything.
/// Filters use the `env_logger` syntax, e.g.
/// `"choreo_machine=debug,choreo_engine=warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Drop the timestamp and module path; the studio prints next to stdout.
    pub compact: bool,
    /// Route output through the test harness capture.
    pub is_test: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            compact: false,
            is_test: false,
        }
    }
}

impl LoggingConfig {
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn compact(mut self) -> Self {
        self.compact = true;
        self
    }

    pub fn for_tests(mut self) -> Self {
        self.is_test = true;
        self
    }

    /// The filter string to install, given a lookup for environment variables.
    fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.env_filter
            .clone()
            .or_else(|| env(LOG_ENV))
            .or_else(|| env("RUST_LOG"))
            .filter(|f| !f.trim().is_empty())
    }
}

static INIT: Once = Once::new();

/// Install the global logger. Only the first call has any effect, and an
/// already installed logger from the embedding program is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.resolve(|key| std::env::var(key).ok()) {
            Some(filter) => builder.parse_filters(&filter),
            None => builder.filter_level(config.level),
        };
        builder.write_style(config.write_style).is_test(config.is_test);
        if config.compact {
            builder.format(|buf, record| writeln!(buf, "[{:<5}] {}", record.level(), record.args()));
        }

        match builder.try_init() {
            Ok(()) => log::debug!("logging initialized"),
            Err(_) => log::debug!("a logger was already installed"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig::default().filter("choreo_machine=trace");
        let got = config.resolve(env(&[(LOG_ENV, "warn"), ("RUST_LOG", "error")]));
        assert_eq!(got.as_deref(), Some("choreo_machine=trace"));
    }

    #[test]
    fn own_variable_before_rust_log() {
        let config = LoggingConfig::default();
        assert_eq!(config.resolve(env(&[(LOG_ENV, "debug"), ("RUST_LOG", "error")])).as_deref(), Some("debug"));
        assert_eq!(config.resolve(env(&[("RUST_LOG", "error")])).as_deref(), Some("error"));
    }

    #[test]
    fn blank_filter_falls_back_to_level() {
        let config = LoggingConfig::default().level(LevelFilter::Warn);
        assert_eq!(config.resolve(env(&[(LOG_ENV, "  ")])), None);
        assert_eq!(config.level, LevelFilter::Warn);
    }
}
