//! Synchronous line reader with iterator interface
//!
//! Provides a streaming iterator over the lines of a legacy export, each
//! paired with its 1-based line number. Decoding is left to the caller so a
//! rejected line can still be reported at the right position.
//!
//! ```no_run
//! use legacy_order_engine::io::sync_reader::SyncLineReader;
//! use std::path::Path;
//!
//! let reader = SyncLineReader::open(Path::new("orders.txt"), false).unwrap();
//! for result in reader {
//!     match result {
//!         Ok((line, text)) => println!("{}: {}", line, text),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Line Numbers
//!
//! Numbering starts at 1 with the first data line. When the input has a
//! header, the header is consumed and not counted.

use crate::types::OrderError;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::Path;

/// Synchronous line reader
///
/// Reads one line at a time; memory usage does not grow with file size.
#[derive(Debug)]
pub struct SyncLineReader<R> {
    lines: Lines<R>,
    skip_header: bool,
    line_num: u64,
}

impl SyncLineReader<BufReader<File>> {
    /// Open a file for line-by-line reading
    ///
    /// # Errors
    ///
    /// * `OrderError::FileNotFound` if the path does not exist
    /// * `OrderError::IoError` for any other open failure
    pub fn open(path: &Path, has_header: bool) -> Result<Self, OrderError> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;

        Ok(Self::new(BufReader::with_capacity(8 * 1024, file), has_header))
    }
}

impl<R: BufRead> SyncLineReader<R> {
    /// Wrap any buffered reader
    pub fn new(reader: R, has_header: bool) -> Self {
        Self {
            lines: reader.lines(),
            skip_header: has_header,
            line_num: 0,
        }
    }
}

impl<R: BufRead> Iterator for SyncLineReader<R> {
    type Item = Result<(u64, String), OrderError>;

    /// Get the next numbered line, without its line terminator
    fn next(&mut self) -> Option<Self::Item> {
        if self.skip_header {
            self.skip_header = false;
            if let Err(e) = self.lines.next()? {
                return Some(Err(e.into()));
            }
        }

        let line = self.lines.next()?;
        self.line_num += 1;
        Some(line.map(|text| (self.line_num, text)).map_err(Into::into))
    }
}

/// Map a failure to open `path` to the matching `OrderError`
pub(crate) fn open_error(path: &Path, error: std::io::Error) -> OrderError {
    match error.kind() {
        ErrorKind::NotFound => OrderError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => OrderError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), error),
        },
    }
}
