//! I/O module
//!
//! Handles legacy file decoding and result output.
//!
//! # Components
//!
//! - `fixed_width` - Fixed-width record slicing and validation
//! - `sync_reader` - Synchronous numbered-line reader with iterator interface
//! - `async_reader` - Asynchronous numbered-line reader with batch reading interface
//! - `output` - JSON and CSV serialization of results

pub mod async_reader;
pub mod fixed_width;
pub mod output;
pub mod sync_reader;

pub use async_reader::AsyncLineReader;
pub use fixed_width::{format_title, round_money, slice_record, RecordParser, RECORD_SIZE};
pub use output::{write_details_csv, write_json};
pub use sync_reader::SyncLineReader;
