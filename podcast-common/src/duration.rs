//! Episode duration display
//!
//! Episodes carry their length as whole seconds. Pages show it as
//! `HH:MM:SS`, every field padded to two digits. Hours are not capped
//! and simply render wider past 99.

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Format seconds as `HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use podcast_common::duration::format_duration;
///
/// assert_eq!(format_duration(0), "00:00:00");
/// assert_eq!(format_duration(59), "00:00:59");
/// assert_eq!(format_duration(3661), "01:01:01");
/// assert_eq!(format_duration(360_000), "100:00:00");
/// ```
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let secs = seconds % SECONDS_PER_MINUTE;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Parse an `HH:MM:SS` string back into seconds.
///
/// Minutes and seconds must be below 60. Returns `None` for anything
/// [`format_duration`] would not produce.
pub fn parse_duration(text: &str) -> Option<u64> {
    let mut fields = text.split(':');
    let hours = parse_field(fields.next()?)?;
    let minutes = parse_field(fields.next()?)?;
    let secs = parse_field(fields.next()?)?;
    if fields.next().is_some() || minutes >= 60 || secs >= 60 {
        return None;
    }
    hours
        .checked_mul(SECONDS_PER_HOUR)?
        .checked_add(minutes * SECONDS_PER_MINUTE + secs)
}

fn parse_field(field: &str) -> Option<u64> {
    if field.len() < 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
