use anyhow::{Context, Result};

use crate::config::Config;

/// Install the global logger.
///
/// stdout carries the MCP transport, so records go to stderr and, when a
/// log file is configured, are appended there as well.
pub fn init(config: &Config) -> Result<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(config.log_level)
        .chain(std::io::stderr());

    if let Some(path) = &config.log_file {
        let file = fern::log_file(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch = dispatch.chain(file);
    }

    dispatch.apply().context("Failed to install logger")?;

    for warning in &config.warnings {
        log::warn!("{}", warning);
    }

    Ok(())
}
