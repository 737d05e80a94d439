use chrono::{DateTime, Datelike, Days, Local, TimeZone};

/// Short relative label for a saved palette's ISO-8601 timestamp.
///
/// `Today, 14:05` and `Yesterday, 09:30` for the last two local days,
/// `Mar 4` earlier in the current year, `Mar 4, 2025` before that, and
/// `Invalid date` when the timestamp doesn't parse.
pub fn format_timestamp<Tz>(timestamp: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return "Invalid date".to_string();
    };
    let tz = now.timezone();
    let date = parsed.with_timezone(&tz);

    let today = now.date_naive();
    let day = date.date_naive();
    let time = date.format("%H:%M");

    if day == today {
        format!("Today, {time}")
    } else if today.checked_sub_days(Days::new(1)) == Some(day) {
        format!("Yesterday, {time}")
    } else if day.year() == today.year() {
        date.format("%b %-d").to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

/// [`format_timestamp`] against the local clock.
pub fn format_timestamp_local(timestamp: &str) -> String {
    format_timestamp(timestamp, &Local::now())
}
