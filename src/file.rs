use std::collections::BTreeMap;
use std::fmt::Formatter;

///
/// The read/write statistics gathered for one file descriptor lifetime.
///
/// Calls are bucketed by their exact transfer size, and the time spent in each
/// direction is accumulated in seconds.
///
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    filename: String,
    write_log: BTreeMap<usize, usize>, // bytes per call -> number of calls
    write_time: f64,
    read_log: BTreeMap<usize, usize>,
    read_time: f64,
}

impl File {
    pub fn new<S: Into<String>>(filename: S) -> Self {
        Self {
            filename: filename.into(),
            write_log: BTreeMap::new(),
            write_time: 0.0,
            read_log: BTreeMap::new(),
            read_time: 0.0,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn write(&mut self, amount: usize, time: f64) {
        *self.write_log.entry(amount).or_insert(0) += 1;
        self.write_time += time;
    }

    pub fn read(&mut self, amount: usize, time: f64) {
        *self.read_log.entry(amount).or_insert(0) += 1;
        self.read_time += time;
    }

    pub fn write_log(&self) -> &BTreeMap<usize, usize> {
        &self.write_log
    }

    pub fn read_log(&self) -> &BTreeMap<usize, usize> {
        &self.read_log
    }

    /// Total time spent in write calls, in seconds
    pub fn write_time(&self) -> f64 {
        self.write_time
    }

    /// Total time spent in read calls, in seconds
    pub fn read_time(&self) -> f64 {
        self.read_time
    }

    pub fn has_activity(&self) -> bool {
        !self.write_log.is_empty() || !self.read_log.is_empty()
    }

    /// Render the report block of this file, or `None` if nothing was read or written.
    pub fn render(&self) -> Option<String> {
        if !self.has_activity() {
            return None;
        }

        let mut report = format!("Filename: {}", self.filename);
        if !self.write_log.is_empty() {
            report.push_str(&section("Write", "write", self.write_time, &self.write_log));
        }
        if !self.read_log.is_empty() {
            report.push_str(&section("Read", "read", self.read_time, &self.read_log));
        }

        Some(report)
    }
}

// one "<Title> log" section, introduced by an empty line
fn section(title: &str, noun: &str, time: f64, log: &BTreeMap<usize, usize>) -> String {
    let lines: Vec<String> = log
        .iter()
        .map(|(bytes, qty)| {
            let plural = if *qty != 1 { "s" } else { "" };
            format!("{} {}{} of {} bytes", qty, noun, plural, bytes)
        })
        .collect();

    format!(
        "\n{} log (total time {:.2}ms):\n{}\n",
        title,
        time * 1000.0,
        lines.join("\n")
    )
}

impl std::fmt::Display for File {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render().unwrap_or_default())
    }
}
