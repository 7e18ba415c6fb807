use crate::error::Error;
use crate::file::File;
use crate::pattern::FilenamePattern;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::Write;

///
/// The descriptor table of one trace session.
///
/// Maps every active descriptor to the statistics of the file behind it and
/// keeps the files of closed descriptors, in close order, for the final report.
///
#[derive(Debug)]
pub struct FileTable {
    active: BTreeMap<i32, File>,
    closed: Vec<File>,
    filter: Option<FilenamePattern>,
}

impl FileTable {
    pub fn new(filter: Option<FilenamePattern>) -> Self {
        let mut active = BTreeMap::new();
        active.insert(0, File::new("<stdin>"));
        active.insert(1, File::new("<stdout>"));
        active.insert(2, File::new("<stderr>"));

        FileTable {
            active,
            closed: vec![],
            filter,
        }
    }

    pub fn open(&mut self, filename: &str, fd: i32) {
        debug!("Opened \"{}\" as fd {}", filename, fd);

        // a second open without a close in between: keep what was gathered so far
        if let Some(previous) = self.active.insert(fd, File::new(filename)) {
            warn!(
                "fd {} reopened as \"{}\" while \"{}\" was still open",
                fd,
                filename,
                previous.filename()
            );
            self.closed.push(previous);
        }
    }

    pub fn write(&mut self, fd: i32, amount: usize, time: f64) -> Result<(), Error> {
        debug!("Wrote {} bytes to fd {}", amount, fd);
        self.active_mut(fd)?.write(amount, time);
        Ok(())
    }

    pub fn read(&mut self, fd: i32, amount: usize, time: f64) -> Result<(), Error> {
        debug!("Read {} bytes from fd {}", amount, fd);
        self.active_mut(fd)?.read(amount, time);
        Ok(())
    }

    pub fn close(&mut self, fd: i32) -> Result<(), Error> {
        debug!("Closed fd {}", fd);
        let file = self
            .active
            .remove(&fd)
            .ok_or_else(|| Error::NotFound(format!("file descriptor {}", fd)))?;
        self.closed.push(file);
        Ok(())
    }

    pub fn active(&self, fd: i32) -> Option<&File> {
        self.active.get(&fd)
    }

    pub fn closed(&self) -> &[File] {
        &self.closed
    }

    /// Write the report block of every file passing the filter, closed files first.
    pub fn report_all<W: Write>(&self, out: &mut W) -> Result<(), Error> {
        for file in self.closed.iter().chain(self.active.values()) {
            if !self.selected(file) {
                continue;
            }
            if let Some(report) = file.render() {
                writeln!(out, "{}", report)?;
            }
        }

        Ok(())
    }

    fn selected(&self, file: &File) -> bool {
        match &self.filter {
            Some(pattern) => pattern.matches(file.filename()),
            None => true,
        }
    }

    fn active_mut(&mut self, fd: i32) -> Result<&mut File, Error> {
        self.active
            .get_mut(&fd)
            .ok_or_else(|| Error::NotFound(format!("file descriptor {}", fd)))
    }
}
