use crate::error::Error;
use crate::table::FileTable;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // ("a-path", O_WRONLY|O_CREAT|O_TRUNC, 0666) = 3 <0.000021>
    // flags strace has no name for are printed as hex bits, O_RDONLY|0x200000
    // a failed open returns -1 followed by the errno name and description
    static ref OPEN: Regex = Regex::new(
        r#"^\("(?P<path>[^"]+)", (?P<flags>[_|A-Z0-9x]+)(?:, (?P<mode>\d+))?\)\s+= (?P<fd>-?\d+)[^<]*<(?P<elapsed>[.\d]+)>"#
    )
    .unwrap();

    // (3, "a-buf"..., 4096) = 4096 <0.000012>
    // the payload is usually elided, only the numeric fields are trusted
    static ref IO: Regex = Regex::new(
        r#"^\((?P<fd>\d+), "(?P<data>.*)"(?:\.\.\.)?(?:, (?P<len>\d+))?\)\s+= (?P<bytes>\d+)[^<]*<(?P<elapsed>[.\d]+)>"#
    )
    .unwrap();

    // (3) = 0 <0.000009>
    static ref CLOSE: Regex = Regex::new(r"^\((?P<fd>\d+)\)").unwrap();
}

///
/// The system calls the profiler knows how to account for.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    Open,
    Read,
    Write,
    Close,
}

///
/// A successfully matched trace event.
///
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Open { path: String, fd: i32, elapsed: f64 },
    Read { fd: i32, bytes: usize, elapsed: f64 },
    Write { fd: i32, bytes: usize, elapsed: f64 },
    Close { fd: i32 },
}

impl Syscall {
    /// Resolve a syscall name, `None` for anything outside of the traced set.
    pub fn from_name(name: &str) -> Option<Syscall> {
        match name {
            "open" => Some(Syscall::Open),
            "read" => Some(Syscall::Read),
            "write" => Some(Syscall::Write),
            "close" => Some(Syscall::Close),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Syscall::Open => "open",
            Syscall::Read => "read",
            Syscall::Write => "write",
            Syscall::Close => "close",
        }
    }

    /// Match the argument part of a trace line (starting at the opening parenthesis).
    ///
    /// Returns `Ok(None)` when the arguments do not have the shape expected for this syscall.
    pub fn matches(&self, args: &str) -> Result<Option<Event>, Error> {
        match self {
            Syscall::Open => match OPEN.captures(args) {
                Some(caps) => Ok(Some(Event::Open {
                    path: caps["path"].to_string(),
                    fd: caps["fd"].parse::<i32>()?,
                    elapsed: caps["elapsed"].parse::<f64>()?,
                })),
                None => Ok(None),
            },
            Syscall::Read => Ok(IO
                .captures(args)
                .map(|caps| io_fields(&caps))
                .transpose()?
                .map(|(fd, bytes, elapsed)| Event::Read { fd, bytes, elapsed })),
            Syscall::Write => Ok(IO
                .captures(args)
                .map(|caps| io_fields(&caps))
                .transpose()?
                .map(|(fd, bytes, elapsed)| Event::Write { fd, bytes, elapsed })),
            Syscall::Close => match CLOSE.captures(args) {
                Some(caps) => Ok(Some(Event::Close {
                    fd: caps["fd"].parse::<i32>()?,
                })),
                None => Ok(None),
            },
        }
    }
}

// fields shared by read and write: fd, transferred bytes, elapsed seconds
fn io_fields(caps: &Captures) -> Result<(i32, usize, f64), Error> {
    Ok((
        caps["fd"].parse::<i32>()?,
        caps["bytes"].parse::<usize>()?,
        caps["elapsed"].parse::<f64>()?,
    ))
}

impl Event {
    /// Account for this event in the descriptor table.
    pub fn apply(self, table: &mut FileTable) -> Result<(), Error> {
        match self {
            // an error in the open, nothing was registered
            Event::Open { fd, .. } if fd < 0 => Ok(()),
            Event::Open { path, fd, .. } => {
                table.open(&path, fd);
                Ok(())
            }
            Event::Read { fd, bytes, elapsed } => table.read(fd, bytes, elapsed),
            Event::Write { fd, bytes, elapsed } => table.write(fd, bytes, elapsed),
            Event::Close { fd } => table.close(fd),
        }
    }
}
