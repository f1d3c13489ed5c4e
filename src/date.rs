//! Best-effort parsing of the free-form `date` front-matter field. Every
//! accepted form ends in the four-digit year, which is what groups pages.

use chrono::{NaiveDate, TimeZone, Utc};

/// Formats tried in order by [`parse`].
const FORMATS: &[&str] = &["%m-%d-%Y", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y", "%b %d, %Y", "%B %d %Y"];

/// Parses a calendar date out of `date`, trying each of [`FORMATS`]. Returns
/// `None` if nothing matches.
pub fn parse(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
}

/// Returns the last four characters of `date` if they are ASCII digits and
/// aren't a UTC offset such as `+0100` or ` -0500`.
pub fn year(date: &str) -> Option<&str> {
    let split = date.len().checked_sub(4)?;
    if !date.is_char_boundary(split) {
        return None;
    }
    let (head, year) = date.split_at(split);
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let offset = head.ends_with('+')
        || head
            .strip_suffix('-')
            .map_or(false, |h| h.ends_with(char::is_whitespace));
    match offset {
        true => None,
        false => Some(year),
    }
}

/// Formats `date` at midnight UTC as an RFC 2822 timestamp.
pub fn to_rfc2822(date: NaiveDate) -> Option<String> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).to_rfc2822())
}
