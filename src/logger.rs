use chrono::Local;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fs;
use std::path::Path;

use crate::domain::utils::statistics::ANALYTICS_TARGET;

const LOG_FILE: &str = "composer.log";
const ANALYTICS_FILE: &str = "analytics.log";

/// Initializes the global logger.
///
/// Call once at the start of `main`. Log level is controlled by the `RUST_LOG` environment
/// variable and defaults to `info`. Engine logs go to stderr and to `composer.log` inside
/// `log_dir`; allocation events logged under the analytics target go to `analytics.log` only.
pub fn init(log_dir: &Path) {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("Failed to create log directory at '{}': {}", log_dir.display(), e);
    }

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_level_filter = log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    let mut engine = Dispatch::new().filter(|metadata| metadata.target() != ANALYTICS_TARGET).chain(
        Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!("[{} {} {}] {}", Local::now().format("%H:%M:%S"), colors.color(record.level()), record.target(), message))
            })
            .chain(std::io::stderr()),
    );

    let log_file_path = log_dir.join(LOG_FILE);
    match fern::log_file(&log_file_path) {
        Ok(file) => engine = engine.chain(Dispatch::new().format(plain_format).chain(file)),
        Err(e) => eprintln!("Failed to open log file '{}': {}", log_file_path.display(), e),
    }

    let mut root = Dispatch::new().level(log_level_filter).level_for("serde", LevelFilter::Warn).chain(engine);

    let analytics_path = log_dir.join(ANALYTICS_FILE);
    match fern::log_file(&analytics_path) {
        Ok(file) => {
            root = root.chain(Dispatch::new().filter(|metadata| metadata.target() == ANALYTICS_TARGET).format(plain_format).chain(file));
        }
        Err(e) => eprintln!("Failed to open analytics file '{}': {}", analytics_path.display(), e),
    }

    if let Err(e) = root.apply() {
        eprintln!("Failed to apply logger configuration: {}", e);
        return;
    }

    log::info!("Logger initialized. Logging to console and '{}'.", log_file_path.display());
}

fn plain_format(out: fern::FormatCallback, message: &std::fmt::Arguments, record: &log::Record) {
    out.finish(format_args!("[{} {} {}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), record.level(), record.target(), message))
}
