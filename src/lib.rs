mod error;
mod event;
mod file;
mod parser;
mod pattern;
mod table;
mod tracer;
pub mod logging;

// re-export the required modules
pub use error::Error;
pub use event::{Event, Syscall};
pub use file::File;
pub use parser::Parser;
pub use pattern::FilenamePattern;
pub use table::FileTable;
pub use tracer::{Driver, Outcome, Trace, Tracer, TRACER_FAILED};
