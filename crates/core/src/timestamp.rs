//! Wire formatting of timestamps.

use chrono::SecondsFormat;

use crate::types::Timestamp;

/// Render a UTC timestamp as ISO 8601 with an explicit `+00:00` offset.
///
/// Fractional seconds are written with microsecond precision and dropped
/// entirely when they are zero: `2025-03-10T11:00:00+00:00`,
/// `2025-03-10T11:00:00.250000+00:00`.
pub fn iso8601(ts: Timestamp) -> String {
    let format = if ts.timestamp_subsec_micros() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    ts.to_rfc3339_opts(format, false)
}
