//! Natural-language date resolution.
//!
//! Resolves phrases like "tomorrow at 4pm", "in 2 hours", or "friday" into
//! absolute UTC timestamps. Relative phrases are handled here with
//! nearest-future semantics; anything unmatched falls through to the
//! `dateparser` crate for absolute formats ("2026-09-01", "Sep 1 at 9am").
//!
//! All resolution is computed against a caller-supplied `now` so tests can
//! pin the clock.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use regex::Regex;

/// Hour used when a phrase names a day but no time.
const DEFAULT_HOUR: u32 = 9;
/// Hour meant by "tonight".
const TONIGHT_HOUR: u32 = 20;

/// Resolve free text into an absolute timestamp, or `None` when the text is
/// not recognizable as a date/time expression.
pub fn resolve(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    if let Some(resolved) = resolve_offset(&lowered, now) {
        return Some(resolved);
    }
    if let Some(resolved) = resolve_day_word(&lowered, now) {
        return Some(resolved);
    }
    if let Some(resolved) = resolve_weekday(&lowered, now) {
        return Some(resolved);
    }
    // Text naming a calendar date goes straight to dateparser, otherwise a
    // clock time inside it would shadow the date part.
    if looks_like_calendar_date(&lowered) {
        return dateparser::parse(text.trim()).ok();
    }
    if let Some(resolved) = resolve_bare_time(&lowered, now) {
        return Some(resolved);
    }

    // Absolute formats. dateparser resolves against the real clock, which is
    // acceptable for calendar dates.
    dateparser::parse(text.trim()).ok()
}

fn looks_like_calendar_date(lowered: &str) -> bool {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    if MONTHS.iter().any(|m| lowered.contains(&m[..3])) {
        return true;
    }
    Regex::new(r"\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{2,4}")
        .map(|re| re.is_match(lowered))
        .unwrap_or(false)
}

/// Render a resolved timestamp for confirmations.
pub fn format_due(due: DateTime<Utc>) -> String {
    due.format("%a %b %e, %H:%M UTC").to_string()
}

/// "in 2 hours", "in 45 minutes", "in a day", "in 3 weeks".
fn resolve_offset(lowered: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let re = Regex::new(r"\bin\s+(\d+|an?)\s+(minute|min|hour|hr|day|week)s?\b").ok()?;
    let caps = re.captures(lowered)?;
    let amount: i64 = match &caps[1] {
        "a" | "an" => 1,
        digits => digits.parse().ok()?,
    };
    // Checked construction and addition: absurd amounts simply fail to
    // resolve instead of panicking mid-request.
    let offset = match &caps[2] {
        "minute" | "min" => Duration::try_minutes(amount),
        "hour" | "hr" => Duration::try_hours(amount),
        "day" => Duration::try_days(amount),
        "week" => Duration::try_weeks(amount),
        _ => None,
    }?;
    now.checked_add_signed(offset)
}

/// "today", "tonight", "tomorrow", "next week" — with an optional time of day.
fn resolve_day_word(lowered: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (day_offset, default_hour) = if lowered.contains("tomorrow") {
        (1, DEFAULT_HOUR)
    } else if lowered.contains("tonight") || lowered.contains("this evening") {
        (0, TONIGHT_HOUR)
    } else if lowered.contains("next week") {
        (7, DEFAULT_HOUR)
    } else if lowered.contains("today") {
        (0, DEFAULT_HOUR)
    } else {
        return None;
    };

    let time = extract_time(lowered)
        .unwrap_or_else(|| NaiveTime::from_hms_opt(default_hour, 0, 0).unwrap());
    let date = now.date_naive() + Duration::days(day_offset);
    Utc.from_local_datetime(&date.and_time(time)).single()
}

/// Weekday names resolve to their nearest future occurrence.
fn resolve_weekday(lowered: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let days = [
        ("monday", Weekday::Mon),
        ("tuesday", Weekday::Tue),
        ("wednesday", Weekday::Wed),
        ("thursday", Weekday::Thu),
        ("friday", Weekday::Fri),
        ("saturday", Weekday::Sat),
        ("sunday", Weekday::Sun),
    ];
    let (_, target) = days.iter().find(|(name, _)| lowered.contains(name))?;

    let today = now.date_naive();
    let mut ahead = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }

    let time = extract_time(lowered)
        .unwrap_or_else(|| NaiveTime::from_hms_opt(DEFAULT_HOUR, 0, 0).unwrap());
    let date = today + Duration::days(ahead);
    Utc.from_local_datetime(&date.and_time(time)).single()
}

/// A time with no day word ("at 4pm", "16:30") means the next occurrence of
/// that time: today if still ahead, otherwise tomorrow.
fn resolve_bare_time(lowered: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let time = extract_time(lowered)?;
    let today = now.date_naive();
    let candidate = Utc.from_local_datetime(&today.and_time(time)).single()?;
    if candidate > now {
        Some(candidate)
    } else {
        Utc.from_local_datetime(&(today + Duration::days(1)).and_time(time))
            .single()
    }
}

/// Pull an explicit clock time out of the text, if any.
///
/// Recognizes "4pm", "4:30pm", "at 4", "at 4:30", and "16:30". Hours without
/// a meridiem are taken as written (24-hour).
fn extract_time(lowered: &str) -> Option<NaiveTime> {
    let with_meridiem = Regex::new(r"\b(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").ok()?;
    if let Some(caps) = with_meridiem.captures(lowered) {
        let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        match &caps[3] {
            "pm" if hour < 12 => hour += 12,
            "am" if hour == 12 => hour = 0,
            _ => {}
        }
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    let at_clock = Regex::new(r"\bat\s+(\d{1,2})(?::(\d{2}))?\b").ok()?;
    if let Some(caps) = at_clock.captures(lowered) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    let clock = Regex::new(r"\b(\d{1,2}):(\d{2})\b").ok()?;
    if let Some(caps) = clock.captures(lowered) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        // A Saturday, mid-morning.
        Utc.with_ymd_and_hms(2026, 8, 29, 10, 0, 0).unwrap()
    }

    fn hms(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn tomorrow_with_time() {
        assert_eq!(
            resolve("tomorrow at 4pm", fixed_now()),
            Some(hms(2026, 8, 30, 16, 0))
        );
        assert_eq!(
            resolve("tomorrow at 9am", fixed_now()),
            Some(hms(2026, 8, 30, 9, 0))
        );
    }

    #[test]
    fn tomorrow_defaults_to_morning() {
        assert_eq!(
            resolve("tomorrow", fixed_now()),
            Some(hms(2026, 8, 30, 9, 0))
        );
    }

    #[test]
    fn tonight_is_evening() {
        assert_eq!(resolve("tonight", fixed_now()), Some(hms(2026, 8, 29, 20, 0)));
    }

    #[test]
    fn relative_offsets() {
        assert_eq!(
            resolve("in 2 hours", fixed_now()),
            Some(hms(2026, 8, 29, 12, 0))
        );
        assert_eq!(
            resolve("in 45 minutes", fixed_now()),
            Some(hms(2026, 8, 29, 10, 45))
        );
        assert_eq!(
            resolve("in a week", fixed_now()),
            Some(hms(2026, 9, 5, 10, 0))
        );
    }

    #[test]
    fn weekday_is_nearest_future() {
        // Saturday -> the coming Monday.
        assert_eq!(resolve("monday", fixed_now()), Some(hms(2026, 8, 31, 9, 0)));
        // Same weekday means next week, never today.
        assert_eq!(
            resolve("saturday", fixed_now()),
            Some(hms(2026, 9, 5, 9, 0))
        );
        assert_eq!(
            resolve("friday at 5pm", fixed_now()),
            Some(hms(2026, 9, 4, 17, 0))
        );
    }

    #[test]
    fn bare_time_rolls_forward() {
        // 4pm is still ahead of a 10:00 now.
        assert_eq!(resolve("at 4pm", fixed_now()), Some(hms(2026, 8, 29, 16, 0)));
        // 8am already passed, so tomorrow.
        assert_eq!(resolve("at 8am", fixed_now()), Some(hms(2026, 8, 30, 8, 0)));
    }

    #[test]
    fn next_week_default() {
        assert_eq!(
            resolve("next week", fixed_now()),
            Some(hms(2026, 9, 5, 9, 0))
        );
    }

    #[test]
    fn overflowing_offsets_do_not_resolve() {
        // Amounts past chrono's Duration range must fail cleanly, not panic;
        // the dispatcher then re-prompts for a usable time.
        // Rejected by checked Duration construction.
        assert_eq!(resolve("in 99999999999 weeks", fixed_now()), None);
        assert_eq!(resolve("in 9223372036854775807 hours", fixed_now()), None);
        // Duration is representable but the sum leaves the datetime range.
        assert_eq!(resolve("in 99999999999 days", fixed_now()), None);
    }

    #[test]
    fn non_dates_do_not_resolve() {
        assert_eq!(resolve("maybe later", fixed_now()), None);
        assert_eq!(resolve("ok", fixed_now()), None);
        assert_eq!(resolve("", fixed_now()), None);
    }

    #[test]
    fn formats_for_confirmation() {
        let formatted = format_due(hms(2026, 8, 30, 16, 0));
        assert!(formatted.contains("16:00"));
        assert!(formatted.contains("Aug"));
    }
}
