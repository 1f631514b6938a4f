//! Interactive prompts: run duration and start confirmation.

use std::io::{self, BufRead, Write};

/// Used when the duration input is not a usable number of hours
pub const DEFAULT_DURATION_SECS: u64 = 3600;

/// Parse a duration given in (fractional) hours into whole seconds.
///
/// Returns `None` for anything that is not a finite, non-negative number.
pub fn parse_duration_hours(input: &str) -> Option<u64> {
    let hours: f64 = input.trim().parse().ok()?;
    if !hours.is_finite() || hours < 0.0 {
        return None;
    }
    Some((hours * 3600.0) as u64)
}

/// Duration in seconds for `input`, falling back to one hour with a warning.
pub fn duration_or_default(input: &str, output: &mut impl Write) -> io::Result<u64> {
    match parse_duration_hours(input) {
        Some(secs) => Ok(secs),
        None => {
            writeln!(output, "[!] Invalid duration, defaulting to 1 hour")?;
            Ok(DEFAULT_DURATION_SECS)
        }
    }
}

pub fn is_confirmed(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Ask for the run duration in hours.
pub fn prompt_duration(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<u64> {
    write!(output, "[?] Live duration (hours): ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    duration_or_default(&line, output)
}

/// Ask whether to start; the question depends on how many streams are listed.
pub fn confirm_start(
    stream_count: usize,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    let question = if stream_count == 1 {
        "Start live streaming now?"
    } else {
        "Start all live streams from the list?"
    };
    write!(output, "\n[?] {} (Y/N): ", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(is_confirmed(&line))
}
