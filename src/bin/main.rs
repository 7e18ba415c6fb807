use clap::Parser as ClapParser;
use ioprofiler::logging::{self, Destination};
use ioprofiler::{Driver, Error, FileTable, FilenamePattern, Parser, Tracer};
use log::{error, LevelFilter};
use std::path::{Path, PathBuf};
use std::process;

/// Exit code for an unknown `--log_level`
const INVALID_LEVEL: i32 = 2;

/// Performs I/O profiling based on strace
#[derive(ClapParser, Debug)]
#[clap(author, version, about, long_about = None, trailing_var_arg = true)]
struct Args {
    /// log level [INFO]
    #[clap(short = 'l', long = "log_level", default_value = "INFO")]
    log_level: String,

    /// log file [<program>.log], `-` logs to the console
    #[clap(short = 'f', long = "log_file")]
    log_file: Option<String>,

    /// profile only files with this filename pattern
    #[clap(short = 'p', long = "pattern")]
    pattern: Option<String>,

    /// the tracer executable
    #[clap(short = 's', long = "strace", default_value = "strace")]
    strace: String,

    /// profile an existing strace log instead of running a command
    #[clap(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// the command to profile, with its arguments
    #[clap(
        required_unless_present = "input",
        conflicts_with = "input",
        multiple_values = true
    )]
    command: Vec<String>,
}

// <program>.log, next to where the program was invoked from
fn default_log_file() -> String {
    let program = std::env::args().next().unwrap_or_else(|| "ioprofiler".to_string());
    let stem = Path::new(&program).with_extension("");
    format!("{}.log", stem.display())
}

// reported to the user directly, logging is not set up yet
fn log_level(level: &str) -> Result<LevelFilter, i32> {
    logging::parse_level(level).map_err(|err| {
        println!("ERROR: {}", err);
        INVALID_LEVEL
    })
}

fn run(args: Args) -> Result<i32, Error> {
    let filter = args
        .pattern
        .as_deref()
        .map(FilenamePattern::new)
        .transpose()?;
    let mut table = FileTable::new(filter);
    let mut stdout = std::io::stdout();

    match args.input {
        Some(log_path) => {
            Parser::new(&mut table).parse_file(log_path)?;
            table.report_all(&mut stdout)?;
            Ok(0)
        }
        None => {
            let driver = Driver::new(Tracer::new(args.strace));
            let outcome = driver.run(&args.command, &mut table, &mut stdout)?;
            Ok(outcome.exit_code())
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = match log_level(&args.log_level) {
        Ok(level) => level,
        Err(code) => process::exit(code),
    };

    let log_file = args.log_file.clone().unwrap_or_else(default_log_file);
    if let Err(err) = logging::init(level, &Destination::from_arg(&log_file)) {
        eprintln!("ERROR: {}", err);
        process::exit(1);
    }

    let code = match run(args) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            eprintln!("ERROR: {}", err);
            1
        }
    };

    process::exit(code);
}
