// src/logger.rs

use log::LevelFilter;

/// Plain timestamped lines on stdout. `RYOKAN_LOG=debug` surfaces the
/// per-field extraction fallbacks and per-strategy geocoding traffic.
pub fn setup_logger() -> Result<(), fern::InitError> {
    let level = match std::env::var("RYOKAN_LOG").as_deref() {
        Ok("debug") => LevelFilter::Debug,
        Ok("warn") => LevelFilter::Warn,
        _ => LevelFilter::Info,
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // The HTML5 parser stack is chatty at debug level.
        .level_for("html5ever", LevelFilter::Warn)
        .level_for("selectors", LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}
