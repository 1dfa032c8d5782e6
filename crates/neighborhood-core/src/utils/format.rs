use chrono::{DateTime, NaiveDate, Utc};

/// Today's date in UTC, the day stamped on new and edited items.
pub fn today() -> NaiveDate {
    date_stamp(Utc::now())
}

/// The UTC calendar day of `now`.
pub fn date_stamp(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Case-insensitive substring check
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format an Indonesian mobile number for display.
/// `08123456789` becomes `0812-3456-789`; `+62` prefixes are folded to `0`.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let international = phone.trim_start().starts_with('+') || digits.len() > 12;
    let local = if international && digits.starts_with("62") {
        format!("0{}", &digits[2..])
    } else {
        digits
    };

    match local.len() {
        10..=13 if local.starts_with('0') => format!(
            "{}-{}-{}",
            &local[0..4],
            &local[4..8],
            &local[8..]
        ),
        _ => phone.to_string(), // Return original if can't format
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a date for display, e.g. `19 Jan 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}
