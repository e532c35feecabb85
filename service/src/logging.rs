use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Crates whose output drowns the request and pipeline logs. They are silenced unless
/// the level is Trace. Provider traffic (reqwest, rustls) is polled every few seconds
/// while a transcription is queued.
const NOISY_DEPENDENCIES: &[&str] = &[
    "sqlx",
    "sea_orm",
    "sea_orm_migration",
    "tower",
    "tower_sessions",
    "tracing",
    "hyper",
    "hyper_util",
    "axum",
    "reqwest",
    "rustls",
];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger at the level configured by `LOG_LEVEL_FILTER`.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;
        TermLogger::init(
            level,
            Self::build_log_config(Self::ignored_modules(level)),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )
    }

    fn ignored_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            NOISY_DEPENDENCIES
        }
    }

    fn build_log_config(ignored_modules: &[&'static str]) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder
            .set_time_format_rfc3339()
            .set_target_level(LevelFilter::Error)
            .set_thread_level(LevelFilter::Off);

        for module in ignored_modules {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }
}
