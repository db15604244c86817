use std::sync::Once;

use log::LevelFilter;

/// Backend settings for the `log` facade.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` directives such as `"goray_engine=trace,wgpu_core=warn"`.
    /// Takes precedence over `RUST_LOG` when set.
    pub env_filter: Option<String>,

    /// Level used when neither `env_filter` nor `RUST_LOG` is present.
    pub default_level: LevelFilter,

    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// GPU-stack crates that flood `info`; held at `warn` under the default level.
const QUIET_TARGETS: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

#[derive(Debug, PartialEq, Eq)]
enum Filter {
    Directives(String),
    Level(LevelFilter),
}

fn resolve_filter(config: &LoggingConfig, rust_log: Option<String>) -> Filter {
    config
        .env_filter
        .clone()
        .or(rust_log)
        .filter(|directives| !directives.trim().is_empty())
        .map_or(Filter::Level(config.default_level), Filter::Directives)
}

fn build_logger(config: &LoggingConfig, rust_log: Option<String>) -> env_logger::Logger {
    let mut builder = env_logger::Builder::new();

    match resolve_filter(config, rust_log) {
        Filter::Directives(directives) => {
            builder.parse_filters(&directives);
        }
        Filter::Level(level) => {
            builder.filter_level(level);
            for target in QUIET_TARGETS {
                builder.filter_module(target, level.min(LevelFilter::Warn));
            }
        }
    }

    builder
        .write_style(config.write_style)
        .format_timestamp_millis()
        .format_target(true)
        .build()
}

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call has any effect.
///
/// If some other logger was installed first (a test harness, an embedding
/// application) it is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let logger = build_logger(&config, std::env::var("RUST_LOG").ok());
        let max_level = logger.filter();

        match log::set_boxed_logger(Box::new(logger)) {
            Ok(()) => {
                log::set_max_level(max_level);
                log::debug!("logging initialized at {max_level}");
            }
            Err(_) => log::debug!("a logger is already installed; keeping it"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_beats_rust_log() {
        let config = LoggingConfig {
            env_filter: Some("goray_engine=trace".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(
            resolve_filter(&config, Some("error".into())),
            Filter::Directives("goray_engine=trace".into())
        );
    }

    #[test]
    fn rust_log_used_when_config_is_silent() {
        let config = LoggingConfig::default();
        assert_eq!(
            resolve_filter(&config, Some("debug".into())),
            Filter::Directives("debug".into())
        );
    }

    #[test]
    fn blank_directives_fall_back_to_default_level() {
        let config = LoggingConfig {
            default_level: LevelFilter::Warn,
            ..LoggingConfig::default()
        };
        assert_eq!(resolve_filter(&config, Some("  ".into())), Filter::Level(LevelFilter::Warn));
        assert_eq!(resolve_filter(&config, None), Filter::Level(LevelFilter::Warn));
    }

    #[test]
    fn built_logger_reports_its_max_level() {
        let config = LoggingConfig {
            env_filter: Some("debug".into()),
            ..LoggingConfig::default()
        };
        assert_eq!(build_logger(&config, None).filter(), LevelFilter::Debug);

        let quiet = build_logger(&LoggingConfig::default(), None);
        assert_eq!(quiet.filter(), LevelFilter::Info);
    }
}
