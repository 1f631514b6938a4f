use std::collections::VecDeque;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

use super::log::SessionLog;

/// Case-insensitive substrings that mark a diagnostic line as a failure
pub const FAILURE_KEYWORDS: &[&str] = &["error", "fail", "disconnect", "broken"];

/// Number of trailing diagnostic lines kept for the exit report
pub const TAIL_LINES: usize = 20;

/// Longest line kept in one piece; longer output is split at this size
pub const MAX_LINE_BYTES: usize = 8 * 1024;

/// What the monitor saw before the stream closed
#[derive(Debug, Clone, Default)]
pub struct MonitorSummary {
    pub lines_read: usize,
    pub lines_flagged: usize,

    /// Last `TAIL_LINES` non-empty lines, flagged or not
    pub tail: Vec<String>,

    /// First log write error, if any; draining continues regardless
    pub log_error: Option<String>,
}

pub fn is_failure_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    FAILURE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Drain `stream` until it closes, persisting failure lines to `log` as warnings.
///
/// Both `\n` and `\r` end a line, since progress output is carriage-return
/// separated. Lines are handled as soon as their terminator arrives.
pub async fn monitor<R>(stream: R, log: SessionLog) -> MonitorSummary
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut summary = MonitorSummary::default();
    let mut tail: VecDeque<String> = VecDeque::with_capacity(TAIL_LINES);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match read_line(&mut reader, &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Encoder output read failed: {}", e);
                break;
            }
        }

        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim_end();
        if line.is_empty() {
            continue;
        }
        summary.lines_read += 1;

        if tail.len() == TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line.to_string());

        if !is_failure_line(line) {
            continue;
        }

        summary.lines_flagged += 1;
        if let Err(e) = log.append(&format!("[!!] {}", line)).await {
            if summary.log_error.is_none() {
                warn!("Failed to persist encoder warning: {:#}", e);
                summary.log_error = Some(format!("{:#}", e));
            }
        }
    }

    debug!(
        "Encoder output closed ({} lines, {} flagged)",
        summary.lines_read, summary.lines_flagged
    );

    summary.tail = tail.into_iter().collect();
    summary
}

/// Read one line ending at `\n` or `\r` (terminator dropped) into `buf`.
///
/// Stops early once `buf` holds `MAX_LINE_BYTES`. Returns the number of bytes
/// consumed, 0 at end of stream.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut consumed = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(consumed);
        }

        let room = MAX_LINE_BYTES.saturating_sub(buf.len());
        let window = &available[..available.len().min(room)];
        match window.iter().position(|b| *b == b'\n' || *b == b'\r') {
            Some(end) => {
                buf.extend_from_slice(&window[..end]);
                reader.consume(end + 1);
                return Ok(consumed + end + 1);
            }
            None => {
                let taken = window.len();
                buf.extend_from_slice(window);
                reader.consume(taken);
                consumed += taken;
                if buf.len() >= MAX_LINE_BYTES {
                    return Ok(consumed);
                }
            }
        }
    }
}
