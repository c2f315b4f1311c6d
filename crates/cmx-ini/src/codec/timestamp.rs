//! ISO-8601 "sortable" timestamps.
//!
//! Timestamps are stored without a time zone in the form
//! `YYYY-MM-DDTHH:MM:SS`, which sorts lexically in chronological order.  A
//! fractional second is appended only when it is non-zero so that stored
//! values read back exactly.

use chrono::NaiveDateTime;

use super::CodecError;

const SORTABLE: &str = "%Y-%m-%dT%H:%M:%S%.f";
const SPACE_SEPARATED: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Formats `ts` in sortable form.
pub fn encode_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(SORTABLE).to_string()
}

/// Parses a sortable timestamp.  A space in place of the `T` is tolerated
/// for hand-edited files.
///
/// # Errors
///
/// Returns [`CodecError::InvalidTimestamp`] if neither form matches.
pub fn decode_timestamp(raw: &str) -> Result<NaiveDateTime, CodecError> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, SORTABLE)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, SPACE_SEPARATED))
        .map_err(|_| CodecError::InvalidTimestamp(raw.to_string()))
}
