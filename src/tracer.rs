use crate::error::Error;
use crate::parser::Parser;
use crate::table::FileTable;
use log::{error, info};
use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, Stdio};

/// Exit code returned when the tracer itself ended abnormally
pub const TRACER_FAILED: i32 = 3;

/// The syscalls requested from strace
const TRACED_SYSCALLS: &str = "trace=open,close,read,write";

///
/// How to invoke the external tracer.
///
#[derive(Debug, Clone)]
pub struct Tracer {
    program: OsString,
    args: Vec<OsString>, // passed before the traced command
}

///
/// The captured result of one tracer run.
///
#[derive(Debug)]
pub struct Trace {
    /// exit code of the tracer, `None` if it was killed by a signal
    pub status: Option<i32>,
    pub stderr: String,
}

impl Trace {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

impl Tracer {
    /// strace following forks and threads, with the time spent in each call.
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Tracer {
            program: program.into(),
            args: vec!["-ffT".into(), "-e".into(), TRACED_SYSCALLS.into()],
        }
    }

    /// The full command line used to trace `command`
    pub fn command_line(&self, command: &[String]) -> Vec<String> {
        let mut params = vec![self.program.to_string_lossy().into_owned()];
        params.extend(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()));
        params.extend(command.iter().cloned());
        params
    }

    /// Run `command` under the tracer and wait for it to finish.
    ///
    /// The output of the traced program is discarded, the tracer's diagnostic
    /// stream is buffered entirely. There is no timeout.
    pub fn trace(&self, command: &[String]) -> Result<Trace, Error> {
        info!("Running \"{}\"", self.command_line(command).join(" "));

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;

        Ok(Trace {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Tracer::new("strace")
    }
}

///
/// How a trace session ended.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    TracerFailed(Option<i32>),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Succeeded => 0,
            Outcome::TracerFailed(_) => TRACER_FAILED,
        }
    }
}

///
/// Drives one trace session: trace, parse, report.
///
pub struct Driver {
    tracer: Tracer,
}

impl Driver {
    pub fn new(tracer: Tracer) -> Self {
        Driver { tracer }
    }

    pub fn run<W: Write>(
        &self,
        command: &[String],
        table: &mut FileTable,
        out: &mut W,
    ) -> Result<Outcome, Error> {
        let trace = self.tracer.trace(command)?;
        if !trace.success() {
            match trace.status {
                Some(code) => error!(
                    "strace ended abnormally with return code {}: {}",
                    code,
                    trace.stderr.trim()
                ),
                None => error!(
                    "strace was terminated by a signal: {}",
                    trace.stderr.trim()
                ),
            }
            return Ok(Outcome::TracerFailed(trace.status));
        }

        Parser::new(table).parse(&trace.stderr)?;
        table.report_all(out)?;

        Ok(Outcome::Succeeded)
    }
}

#[cfg(test)]
mod test {
    use crate::error::Error;
    use crate::logging::capture;
    use crate::table::FileTable;
    use crate::tracer::{Driver, Outcome, Tracer, TRACER_FAILED};
    use log::Level;

    // a stand-in tracer printing a canned trace on stderr
    fn fake_tracer(trace: &str, code: i32) -> Tracer {
        Tracer {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                format!("printf '%s' \"$1\" >&2; echo noise; exit {}", code).into(),
                "fake-strace".into(),
                trace.into(),
            ],
        }
    }

    #[test]
    fn command_line() {
        let tracer = Tracer::default();
        assert_eq!(
            tracer.command_line(&["ls".to_string(), "-l".to_string()]),
            vec!["strace", "-ffT", "-e", "trace=open,close,read,write", "ls", "-l"]
        );
    }

    #[test]
    fn tracer_failure() -> Result<(), Error> {
        let driver = Driver::new(Tracer::new("false"));
        let mut table = FileTable::new(None);
        let mut out = vec![];

        let outcome = driver.run(&["true".to_string()], &mut table, &mut out)?;
        assert_eq!(outcome, Outcome::TracerFailed(Some(1)));
        assert_eq!(outcome.exit_code(), TRACER_FAILED);
        assert!(out.is_empty());

        Ok(())
    }

    #[test]
    fn tracer_failure_is_logged() -> Result<(), Error> {
        capture::install();
        let mut table = FileTable::new(None);
        let mut out = vec![];

        let tracer = fake_tracer("boom: tracer could not attach", 1);
        let outcome = Driver::new(tracer).run(&[], &mut table, &mut out)?;
        assert_eq!(outcome, Outcome::TracerFailed(Some(1)));
        assert!(out.is_empty());
        assert!(capture::logged(
            Level::Error,
            &["strace ended abnormally", "return code 1", "boom: tracer could not attach"]
        ));

        Ok(())
    }

    #[test]
    fn partial_output_is_not_parsed() -> Result<(), Error> {
        let tracer = fake_tracer("open(\"/a\", O_RDONLY) = 3 <0.000010>\nread(3, \"x\", 1) = 1 <0.000010>\n", 1);
        let mut table = FileTable::new(None);
        let mut out = vec![];

        let outcome = Driver::new(tracer).run(&[], &mut table, &mut out)?;
        assert_eq!(outcome.exit_code(), 3);
        assert!(table.active(3).is_none());
        assert!(out.is_empty());

        Ok(())
    }

    #[test]
    fn success() -> Result<(), Error> {
        let tracer = fake_tracer(
            concat!(
                "open(\"/a/x.txt\", O_RDONLY) = 3 <0.000010>\n",
                "read(3, \"x\", 1) = 1 <0.000010>\n",
                "close(3) = 0 <0.000010>\n",
                "+++ exited with 0 +++\n",
            ),
            0,
        );
        let mut table = FileTable::new(None);
        let mut out = vec![];

        let outcome = Driver::new(tracer).run(&[], &mut table, &mut out)?;
        assert_eq!(outcome, Outcome::Succeeded);
        assert_eq!(outcome.exit_code(), 0);

        let report = String::from_utf8(out).expect("report is utf-8");
        assert_eq!(report, "Filename: /a/x.txt\nRead log (total time 0.01ms):\n1 read of 1 bytes\n\n");

        Ok(())
    }

    #[test]
    fn inconsistent_trace() {
        let tracer = fake_tracer("write(9, \"x\", 1) = 1 <0.000010>\n", 0);
        let mut table = FileTable::new(None);
        let mut out = vec![];

        let result = Driver::new(tracer).run(&[], &mut table, &mut out);
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn missing_tracer() {
        let driver = Driver::new(Tracer::new("/nonexistent/ioprofiler-strace"));
        let mut table = FileTable::new(None);
        let mut out = vec![];

        assert!(matches!(
            driver.run(&["true".to_string()], &mut table, &mut out),
            Err(Error::Io(_))
        ));
    }
}
