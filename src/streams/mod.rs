//! Stream list handling
//!
//! The stream list is a plain-text file with one `video_filename:stream_key`
//! entry per line. Each entry becomes a [`StreamJob`] once the run duration
//! and destination URL are known.

mod job;
mod list;

pub use job::StreamJob;
pub use list::{parse_stream_list, read_stream_list, StreamEntry};
