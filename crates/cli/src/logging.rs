use crate::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;

/// Install the global subscriber. With a log file, output is appended to it
/// and the file is owned by the subscriber for the rest of the process.
pub fn init(level: LevelFilter, logfile: Option<&Path>) -> Result<(), Error> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_level(true)
        .with_file(true)
        .with_line_number(true);

    match logfile {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| Error::LogFile {
                    path: path.to_owned(),
                    source,
                })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}
