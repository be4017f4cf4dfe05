use crate::config::{Config, RustEnv};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Dependency modules whose output is suppressed unless running at Trace.
const NOISY_MODULES: &[&str] = &[
    "sqlx",
    "sea_orm",
    "tower",
    "tracing",
    "hyper",
    "axum",
    "tungstenite",
    "reqwest",
];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger.
    ///
    /// Trace shows everything, including dependency output. Every other level
    /// hides the modules listed in `NOISY_MODULES`. Production disables colors
    /// so log collectors receive plain text.
    pub fn init_logger(config: &Config) {
        let level = Self::to_simplelog_level(config.log_level_filter);
        let log_config = Self::build_log_config(Self::hides_dependencies(config.log_level_filter));

        TermLogger::init(
            level,
            log_config,
            TerminalMode::Mixed,
            Self::color_choice(&config.runtime_env),
        )
        .expect("Failed to start simplelog");
    }

    fn to_simplelog_level(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    fn hides_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn color_choice(runtime_env: &RustEnv) -> ColorChoice {
        match runtime_env {
            RustEnv::Production => ColorChoice::Never,
            RustEnv::Development | RustEnv::Staging => ColorChoice::Auto,
        }
    }

    fn build_log_config(hide_dependencies: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if hide_dependencies {
            for module in NOISY_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
