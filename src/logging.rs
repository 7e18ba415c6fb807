use crate::error::Error;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

///
/// Where the diagnostic log goes.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Console,
    File(PathBuf),
}

impl Destination {
    /// `-` stands for the console, anything else is a file path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Destination::Console
        } else {
            Destination::File(PathBuf::from(arg))
        }
    }
}

/// Parse a log level name, case insensitive.
pub fn parse_level(level: &str) -> Result<LevelFilter, Error> {
    match level.to_ascii_uppercase().as_str() {
        "NOTSET" | "TRACE" => Ok(LevelFilter::Trace),
        "DEBUG" => Ok(LevelFilter::Debug),
        "INFO" => Ok(LevelFilter::Info),
        "WARN" | "WARNING" => Ok(LevelFilter::Warn),
        "ERROR" | "CRITICAL" => Ok(LevelFilter::Error),
        "OFF" => Ok(LevelFilter::Off),
        _ => Err(Error::InvalidLevel(level.to_string())),
    }
}

/// Install the global logger. A log file is truncated first.
pub fn init(level: LevelFilter, destination: &Destination) -> Result<(), Error> {
    let target = match destination {
        Destination::Console => Target::Stderr,
        Destination::File(path) => Target::Pipe(Box::new(File::create(path)?)),
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .target(target)
        .try_init()
        .map_err(|err| Error::Logger(err.to_string()))
}

/// Records every log message in memory, for tests asserting on diagnostics.
#[cfg(test)]
pub(crate) mod capture {
    use lazy_static::lazy_static;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::{Mutex, Once};

    lazy_static! {
        static ref RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(vec![]);
    }

    static INSTALL: Once = Once::new();

    struct Capture;

    impl Log for Capture {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    /// Install the capturing logger, once per test binary
    pub fn install() {
        INSTALL.call_once(|| {
            if log::set_boxed_logger(Box::new(Capture)).is_ok() {
                log::set_max_level(LevelFilter::Trace);
            }
        });
    }

    /// Whether a message at `level` containing every one of `parts` was logged.
    /// Tests run concurrently, so `parts` should be unique to the calling test.
    pub fn logged(level: Level, parts: &[&str]) -> bool {
        let records = RECORDS.lock().expect("capture lock");
        records
            .iter()
            .any(|(l, message)| *l == level && parts.iter().all(|part| message.contains(part)))
    }
}
