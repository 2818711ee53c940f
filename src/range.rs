//! HTTP Range header parsing and stream window computation
//!
//! Implements the `bytes=<start>-<end>` grammar with the permissive
//! defaulting policy the player relies on: a missing or unparseable start
//! falls back to 0, a missing or unparseable end falls back to the last
//! byte, and an over-long end is clamped rather than rejected.

use crate::error::{PhaseServerError, Result};

/// Maximum size of one streamed chunk (1 MiB).
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// The byte window served by one partial-content response.
///
/// Invariant: `start <= end < total_size`. Constructed only through
/// [`parse_range`], which enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamWindow {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

impl StreamWindow {
    /// Number of bytes in the window (`end` is inclusive).
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this window.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Parse a `Range` header value against a file of `file_size` bytes.
///
/// Errors:
/// - `MalformedRange` when the value lacks the `bytes=` prefix or does not
///   split into exactly two dash-separated parts (HTTP 400).
/// - `RangeNotSatisfiable` when the resolved start is at or past the end of
///   the file, or the resolved window is empty (HTTP 416).
pub fn parse_range(header: &str, file_size: u64) -> Result<StreamWindow> {
    let value = header.trim();
    let rest = value
        .get(..6)
        .filter(|prefix| prefix.eq_ignore_ascii_case("bytes="))
        .map(|_| &value[6..])
        .ok_or_else(|| PhaseServerError::MalformedRange(header.to_string()))?;

    let mut parts = rest.splitn(2, '-');
    let start_str = parts.next().unwrap_or("");
    let end_str = parts
        .next()
        .ok_or_else(|| PhaseServerError::MalformedRange(header.to_string()))?;

    // Permissive defaulting: tolerated by policy, not an accident.
    let start: u64 = start_str.trim().parse().unwrap_or(0);
    let end: u64 = end_str
        .trim()
        .parse()
        .unwrap_or_else(|_| file_size.saturating_sub(1));

    if start >= file_size {
        return Err(PhaseServerError::RangeNotSatisfiable { start, file_size });
    }

    let end = end.min(file_size - 1);
    if start > end {
        return Err(PhaseServerError::RangeNotSatisfiable { start, file_size });
    }

    Ok(StreamWindow {
        start,
        end,
        total_size: file_size,
    })
}
