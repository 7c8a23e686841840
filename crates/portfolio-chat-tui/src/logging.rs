use anyhow::Result;
use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Log target prefix of this binary; follows the `[[bin]]` name, not the package.
const HOST_TARGET: &str = env!("CARGO_CRATE_NAME");

pub struct Logger;

impl Logger {
    /// Route logs to `path`; the terminal belongs to the UI.
    pub fn init(level: Option<&str>, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Builder::new()
            .filter(Some("portfolio_chat_core"), parse_level(level))
            .filter(Some(HOST_TARGET), parse_level(level))
            .filter(Some("reqwest"), LevelFilter::Warn)
            .filter(Some("hyper"), LevelFilter::Warn)
            .target(Target::Pipe(Box::new(file)))
            .write_style(WriteStyle::Never)
            .try_init()?;

        Ok(())
    }
}

fn parse_level(level: Option<&str>) -> LevelFilter {
    level
        .and_then(|l| l.parse().ok())
        .unwrap_or(LevelFilter::Info)
}
