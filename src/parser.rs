use crate::error::Error;
use crate::event::Syscall;
use crate::table::FileTable;
use lazy_static::lazy_static;
use log::{debug, error};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

lazy_static! {
    // <syscall>(<args>, optionally prefixed by the pid strace adds when following forks
    static ref LINE: Regex = Regex::new(r"^(?:\[pid\s+\d+\] )?(?P<syscall>[^(]+)(?P<args>\(.+)").unwrap();
}

///
/// Feeds strace output lines into a descriptor table.
///
pub struct Parser<'t> {
    table: &'t mut FileTable,
}

impl<'t> Parser<'t> {
    pub fn new(table: &'t mut FileTable) -> Self {
        Parser { table }
    }

    /// Parse a fully captured strace output.
    pub fn parse(&mut self, text: &str) -> Result<(), Error> {
        for line in text.lines() {
            self.parse_line(line)?;
        }

        Ok(())
    }

    /// Parse a strace log written to a file (`strace -o`).
    pub fn parse_file<P: AsRef<Path>>(&mut self, log_file: P) -> Result<(), Error> {
        let file = File::open(log_file.as_ref())?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line?;
            self.parse_line(&line)?;
        }

        Ok(())
    }

    /// Parse a single line of strace output.
    ///
    /// Lines which are not syscalls (signals, exits) are skipped, unmatched or unknown
    /// syscalls are logged and skipped. Only an event referring to a descriptor which
    /// is not open is an error.
    pub fn parse_line(&mut self, line: &str) -> Result<(), Error> {
        let caps = match LINE.captures(line) {
            Some(caps) => caps,
            None => return Ok(()), // not a syscall
        };

        let name = &caps["syscall"];
        let args = &caps["args"];

        let syscall = match Syscall::from_name(name) {
            Some(syscall) => syscall,
            None => {
                error!("Invalid line: {}", line);
                return Ok(());
            }
        };

        match syscall.matches(args) {
            Ok(Some(event)) => event.apply(self.table),
            Ok(None) => {
                debug!("Unable to match {}", args);
                Ok(())
            }
            Err(err) => {
                debug!("Unable to match {}: {}", args, err);
                Ok(())
            }
        }
    }
}
