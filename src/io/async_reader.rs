//! Asynchronous line reader with batch interface
//!
//! Provides the same numbered-line view as [`SyncLineReader`] over an async
//! source, read in batches.
//!
//! # Architecture
//!
//! ```text
//! tokio::fs::File → compat → AsyncLineReader → batches of (line, text)
//!                                  ↓
//!                       fixed_width::RecordParser
//! ```
//!
//! [`SyncLineReader`]: crate::io::sync_reader::SyncLineReader

use crate::types::OrderError;
use futures::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use futures::stream::StreamExt;

/// Asynchronous line reader
///
/// Line numbering and header handling match the synchronous reader exactly.
pub struct AsyncLineReader<R> {
    lines: Lines<R>,
    skip_header: bool,
    line_num: u64,
}

impl<R: AsyncBufRead + Unpin> AsyncLineReader<R> {
    /// Create a new AsyncLineReader from a buffered async reader
    pub fn new(reader: R, has_header: bool) -> Self {
        Self {
            lines: reader.lines(),
            skip_header: has_header,
            line_num: 0,
        }
    }

    /// Read up to `batch_size` numbered lines
    ///
    /// Returns an empty vector once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::IoError` if the underlying read fails. Lines read
    /// before the failure in the same batch are dropped.
    pub async fn read_batch(
        &mut self,
        batch_size: usize,
    ) -> Result<Vec<(u64, String)>, OrderError> {
        if self.skip_header {
            self.skip_header = false;
            if let Some(header) = self.lines.next().await {
                header?;
            }
        }

        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match self.lines.next().await {
                Some(line) => {
                    self.line_num += 1;
                    batch.push((self.line_num, line?));
                }
                None => break,
            }
        }

        Ok(batch)
    }
}
