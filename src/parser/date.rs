//! `Date:` header normalization to `YYYYMMDDhhmmss`.
//!
//! Accepts `[weekday,] day month year hh:mm:ss[.fraction] [zone]`. The zone
//! is ignored: wall-clock fields are kept as written, with no conversion and
//! no calendar check.

use std::borrow::Cow;

use crate::error::DateError;
use crate::model::record::NormalizedDate;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Normalize a raw `Date:` header value.
pub fn normalize_date(raw: &str) -> Result<NormalizedDate, DateError> {
    let mut value = raw.trim();
    if let Some((_, rest)) = value.split_once(',') {
        value = rest.trim();
    }

    let tokens: Vec<&str> = value.split_whitespace().collect();
    let [day, month, year, time, ..] = tokens[..] else {
        return Err(DateError::Incomplete);
    };

    let month = MONTHS
        .iter()
        .position(|m| *m == month)
        .ok_or_else(|| DateError::UnknownMonth(month.to_string()))?;
    let month = format!("{:02}", month + 1);

    let parts: Vec<&str> = time.split(':').take(3).collect();
    let [hour, minute, second] = parts[..] else {
        return Err(DateError::BadTime(time.to_string()));
    };
    let second = second.split('.').next().unwrap_or(second);

    let year = digits(year)?;
    let day = pad(day)?;
    let (hour, minute, second) = (pad(hour)?, pad(minute)?, pad(second)?);
    Ok(NormalizedDate::from_fields([
        year, &month, &day, &hour, &minute, &second,
    ]))
}

/// Zero-pad a numeric field to at least two digits.
fn pad(field: &str) -> Result<Cow<'_, str>, DateError> {
    let field = digits(field)?;
    Ok(match field.len() {
        1 => Cow::Owned(format!("0{field}")),
        _ => Cow::Borrowed(field),
    })
}

fn digits(field: &str) -> Result<&str, DateError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::NotNumeric(field.to_string()));
    }
    Ok(field)
}
