//! Logging setup.
//!
//! `log4rs.yml` in the working directory wins; otherwise logs go to stderr at
//! the level named by `TF_LOG` (default `WARN`), keeping stdout for state.

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::path::Path;

pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

const PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%S%.3f)} {h({l:5})} {t} - {m}{n}";

/// Map a `TF_LOG` value to a level filter.
pub fn level_from_tf_log(value: Option<&str>) -> LevelFilter {
    match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
        Some("TRACE") | Some("JSON") => LevelFilter::Trace,
        Some("DEBUG") => LevelFilter::Debug,
        Some("INFO") => LevelFilter::Info,
        Some("ERROR") => LevelFilter::Error,
        Some("OFF") => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}

pub fn init() -> Result<(), Box<dyn Error>> {
    if Path::new(LOG_CONFIG_FILE).exists() {
        log4rs::init_file(LOG_CONFIG_FILE, Default::default())
            .map_err(|e| format!("Error initializing log4rs from {LOG_CONFIG_FILE}: {e}"))?;
        return Ok(());
    }

    let level = level_from_tf_log(std::env::var("TF_LOG").ok().as_deref());
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| format!("Error building log config: {e}"))?;
    log4rs::init_config(config).map_err(|e| format!("Error initializing log4rs: {e}"))?;
    Ok(())
}
