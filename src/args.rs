use std::path::PathBuf;
use std::str::FromStr;

/// outpin-blink - drive a repeating LED and an auto-off LED over GPIO
#[derive(argh::FromArgs, Debug)]
pub struct Args {
    /// path to config file (default: config.toml)
    #[argh(option, default = "PathBuf::from(\"config.toml\")")]
    pub config: PathBuf,
    /// run against an in-memory GPIO backend instead of real hardware
    #[argh(switch)]
    pub dry_run: bool,
    /// log level (error, warn, info, debug, trace) (default: info)
    #[argh(option, default = "LogLevel(log::LevelFilter::Info)")]
    pub log_level: LogLevel,
}

/// Wrapper around [`log::LevelFilter`] to facilitate argument parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel(pub log::LevelFilter);

impl FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(input: &str) -> Result<LogLevel, Self::Err> {
        match input.to_lowercase().as_str() {
            "error" => Ok(LogLevel(log::LevelFilter::Error)),
            "warn" => Ok(LogLevel(log::LevelFilter::Warn)),
            "info" => Ok(LogLevel(log::LevelFilter::Info)),
            "debug" => Ok(LogLevel(log::LevelFilter::Debug)),
            "trace" => Ok(LogLevel(log::LevelFilter::Trace)),
            _ => Err("invalid log level"),
        }
    }
}
