//! Relative date expressions used as `date-time` defaults in the schedule schema, such as
//! `"tomorrow at 9am"`, `"9am in 30 days"`, `"3 days ago"` or a plain `"2024-05-01"`.
//!
//! Everything is evaluated in UTC.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

/// Parses `expr` relative to `now`. `None` when any word is not understood.
pub fn parse(expr: &str, now: OffsetDateTime) -> Option<OffsetDateTime> {
    let expr = expr.trim();
    if expr.is_empty() {
        return None;
    }
    if let Some(dt) = parse_absolute(expr) {
        return Some(dt);
    }

    let lower = expr.to_ascii_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let mut day_offset = Duration::ZERO;
    let mut offset = Duration::ZERO;
    let mut time_of_day: Option<Time> = None;

    let mut i = 0;
    while i < words.len() {
        match words[i] {
            "now" | "today" => {}
            "tomorrow" => day_offset = Duration::days(1),
            "yesterday" => day_offset = Duration::days(-1),
            "at" => {}
            "tonight" => time_of_day = Some(Time::from_hms(20, 0, 0).ok()?),
            "in" => {
                let (amount, consumed) = parse_amount(&words[i + 1..])?;
                offset = offset.checked_add(amount)?;
                i += consumed;
            }
            word => {
                let meridiem = words.get(i + 1).filter(|next| matches!(**next, "am" | "pm"));
                if let Some(next) = meridiem {
                    // `9 am`, `9:30 pm`
                    time_of_day = Some(parse_time_of_day(&format!("{word}{next}"))?);
                    i += 1;
                } else if let Some(t) = parse_time_of_day(word) {
                    time_of_day = Some(t);
                } else {
                    // `<n> <unit> ago` / `<n> <unit> from now`
                    let (amount, consumed) = parse_amount(&words[i..])?;
                    i += consumed;
                    match (words.get(i), words.get(i + 1)) {
                        (Some(&"ago"), _) => offset = offset.checked_sub(amount)?,
                        (Some(&"from"), Some(&"now")) => {
                            offset = offset.checked_add(amount)?;
                            i += 1;
                        }
                        _ => return None,
                    }
                }
            }
        }
        i += 1;
    }

    let mut dt = now.checked_add(day_offset)?.checked_add(offset)?;
    if let Some(t) = time_of_day {
        dt = dt.replace_time(t);
    }
    Some(dt)
}

/// `parse` then render as RFC 3339, the form stored in the schedule payload.
pub fn parse_rfc3339(expr: &str, now: OffsetDateTime) -> Option<String> {
    parse(expr, now).and_then(|dt| dt.format(&Rfc3339).ok())
}

fn parse_absolute(expr: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(expr, &Rfc3339) {
        return Some(dt);
    }
    let with_time = [
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];
    for fmt in with_time {
        if let Ok(dt) = PrimitiveDateTime::parse(expr, fmt) {
            return Some(dt.assume_utc());
        }
    }
    Date::parse(expr, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

/// `<n> <unit>` at the start of `words`, returns the duration and how many words were used.
/// `None` when the amount overflows a `Duration`.
fn parse_amount(words: &[&str]) -> Option<(Duration, usize)> {
    let (n, unit, consumed) = match words {
        [first, ..] if first.chars().next().is_some_and(|c| c.is_ascii_digit()) => {
            let split = first.find(|c: char| !c.is_ascii_digit()).unwrap_or(first.len());
            if split < first.len() {
                // `30days`
                (first[..split].parse::<i64>().ok()?, &first[split..], 1)
            } else {
                (first.parse::<i64>().ok()?, *words.get(1)?, 2)
            }
        }
        ["a" | "an", unit, ..] => (1, *unit, 2),
        _ => return None,
    };
    let unit_secs: i64 = match unit.trim_end_matches('s') {
        "minute" | "min" => 60,
        "hour" | "hr" | "h" => 3_600,
        "day" | "d" => 86_400,
        "week" | "wk" | "w" => 604_800,
        _ => return None,
    };
    let duration = n.checked_mul(unit_secs).map(Duration::seconds)?;
    Some((duration, consumed))
}

/// `9am`, `9:30pm`, `21:00`, `noon`, `midnight`
fn parse_time_of_day(word: &str) -> Option<Time> {
    match word {
        "noon" => return Time::from_hms(12, 0, 0).ok(),
        "midnight" => return Some(Time::MIDNIGHT),
        _ => {}
    }
    let (clock, meridiem) = if let Some(c) = word.strip_suffix("am") {
        (c, Some(false))
    } else if let Some(c) = word.strip_suffix("pm") {
        (c, Some(true))
    } else {
        (word, None)
    };
    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) => (h.parse::<u8>().ok()?, m.parse::<u8>().ok()?),
        // a bare number is only a time with am/pm
        None if meridiem.is_some() => (clock.parse::<u8>().ok()?, 0),
        None => return None,
    };
    let hour = match meridiem {
        Some(_) if hour == 0 || hour > 12 => return None,
        Some(false) => hour % 12,
        Some(true) => hour % 12 + 12,
        None => hour,
    };
    Time::from_hms(hour, minute, 0).ok()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    const NOW: OffsetDateTime = datetime!(2024-03-10 15:42:07 UTC);

    #[test]
    fn test_relative_day() {
        assert_eq!(parse("now", NOW), Some(NOW));
        assert_eq!(parse("today", NOW), Some(NOW));
        assert_eq!(parse("tomorrow", NOW), Some(datetime!(2024-03-11 15:42:07 UTC)));
        assert_eq!(parse("Yesterday", NOW), Some(datetime!(2024-03-09 15:42:07 UTC)));
    }

    #[test]
    fn test_with_time_of_day() {
        assert_eq!(parse("tomorrow at 9am", NOW), Some(datetime!(2024-03-11 09:00 UTC)));
        assert_eq!(parse("9am in 30 days", NOW), Some(datetime!(2024-04-09 09:00 UTC)));
        assert_eq!(parse("today at 9:30 pm", NOW), Some(datetime!(2024-03-10 21:30 UTC)));
        assert_eq!(parse("tomorrow noon", NOW), Some(datetime!(2024-03-11 12:00 UTC)));
        assert_eq!(parse("today 12am", NOW), Some(datetime!(2024-03-10 00:00 UTC)));
        assert_eq!(parse("at 18:05", NOW), Some(datetime!(2024-03-10 18:05 UTC)));
    }

    #[test]
    fn test_offsets() {
        assert_eq!(parse("in 2 weeks", NOW), Some(datetime!(2024-03-24 15:42:07 UTC)));
        assert_eq!(parse("in an hour", NOW), Some(datetime!(2024-03-10 16:42:07 UTC)));
        assert_eq!(parse("3 days ago", NOW), Some(datetime!(2024-03-07 15:42:07 UTC)));
        assert_eq!(parse("10 minutes from now", NOW), Some(datetime!(2024-03-10 15:52:07 UTC)));
        assert_eq!(parse("in 30days", NOW), Some(datetime!(2024-04-09 15:42:07 UTC)));
    }

    #[test]
    fn test_absolute() {
        assert_eq!(parse("2021-01-01", NOW), Some(datetime!(2021-01-01 00:00 UTC)));
        assert_eq!(parse("2021-01-01 08:15", NOW), Some(datetime!(2021-01-01 08:15 UTC)));
        assert_eq!(
            parse("2021-01-01T08:15:00+02:00", NOW),
            Some(datetime!(2021-01-01 08:15 +2))
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse("", NOW), None);
        assert_eq!(parse("whenever", NOW), None);
        assert_eq!(parse("in 3 fortnights", NOW), None);
        assert_eq!(parse("13pm", NOW), None);
        assert_eq!(parse("3 days", NOW), None);
        assert_eq!(parse("in", NOW), None);
    }

    #[test]
    fn test_huge_amounts_are_rejected() {
        assert_eq!(parse("in 200000000000000 days", NOW), None);
        assert_eq!(parse("in 9999999999999999 weeks", NOW), None);
        assert_eq!(parse("9999999999999999 minutes ago", NOW), None);
        assert_eq!(parse("in 99999999999999999999 days", NOW), None);
        // each amount fits, the sum does not
        assert_eq!(parse("in 15000000000000 weeks in 15000000000000 weeks", NOW), None);
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(
            parse_rfc3339("tomorrow at 9am", NOW).as_deref(),
            Some("2024-03-11T09:00:00Z")
        );
        assert_eq!(parse_rfc3339("never", NOW), None);
    }
}
