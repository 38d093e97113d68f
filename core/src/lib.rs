//! Engine-core: the data model, constants, error taxonomy, and PRNG
//! discipline shared by the world engine. Contains no network, disk, or
//! rendering code — those are the perimeter's job.

use log::{LevelFilter, SetLoggerError};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

pub mod catalog;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod rng;
pub mod types;

/// Configure the process-wide logger.
///
/// Mirrors the teacher server's logging setup: a stderr appender thresholded
/// at `log_level`, plus an optional file appender that always receives
/// everything. Safe to call once at process start.
pub fn initialize_logger(
    log_level: LevelFilter,
    file_path: Option<&str>,
) -> Result<(), SetLoggerError> {
    let stderr = ConsoleAppender::builder().target(Target::Stderr).build();

    let mut config_builder = Config::builder();

    if let Some(path) = file_path {
        if let Ok(logfile) = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d} {l} - {m}\n")))
            .build(path)
        {
            config_builder =
                config_builder.appender(Appender::builder().build("logfile", Box::new(logfile)));
        }
    }

    let mut root_builder = Root::builder();
    if file_path.is_some() {
        root_builder = root_builder.appender("logfile");
    }

    let config = config_builder
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("stderr", Box::new(stderr)),
        )
        .build(root_builder.appender("stderr").build(LevelFilter::Trace))
        .expect("logger configuration is always valid");

    log4rs::init_config(config)?;
    Ok(())
}
