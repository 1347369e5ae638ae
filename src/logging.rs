//! Process-wide logging setup
//!
//! Writes timestamped log lines to a fresh `logs/execution.log` per run and
//! mirrors them to the terminal. Initialized once per process.

use std::fs::File;
use std::io;
use std::path::Path;

pub fn init(log_file: &Path) -> io::Result<()> {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();

    // File::create truncates: every run starts with a fresh log
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        File::create(log_file)?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
    Ok(())
}
