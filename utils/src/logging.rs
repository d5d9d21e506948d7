use chrono::Local;
use log::LevelFilter;

/// Maps a `LOG_LEVEL`-style name to a filter, defaulting to `Warn`.
pub fn parse_log_level(name: Option<&str>) -> LevelFilter {
    match name {
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        Some("off") => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}

pub fn setup_logging(level: LevelFilter) -> Result<(), fern::InitError> {
    let base_config = fern::Dispatch::new();

    // Report output owns stdout.
    let stderr_config = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}] {}: {}",
                Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    base_config.chain(stderr_config).apply()?;

    Ok(())
}
