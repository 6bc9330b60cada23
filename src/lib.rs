//! A thread-safe handle on a single file that can be read and written as
//! lines of text, as a sequence of typed values decoded through a
//! persistent cursor, or as serialized objects.
//!
//! ```no_run
//! use managed_file::{FileOptions, ManagedFile, TextWrite, WriteMode};
//!
//! let file = ManagedFile::new(
//!     "notes.txt",
//!     FileOptions::default().with_create_if_missing(true),
//! );
//! file.write("hello", TextWrite::truncate()).unwrap();
//! file.write_line("world").unwrap();
//! assert_eq!(file.read_all().unwrap(), "hello\nworld\n");
//!
//! file.write_typed(42, WriteMode::Truncate).unwrap();
//! file.terminate();
//! ```

pub mod binding;
mod cursor;
pub mod diagnostics;
mod errors;
mod managed;
pub mod options;
pub mod value;

pub use cursor::CursorState;
pub use diagnostics::{LogSink, NullSink, StderrSink, WarningSink};
pub use errors::{ManagedFileError, Result};
pub use managed::{ManagedFile, Terminator, TextWrite, WriteMode};
pub use options::FileOptions;
pub use value::{TypedValue, ValueKind};
