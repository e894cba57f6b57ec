use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc, Weekday};
use regex::Regex;
use thiserror::Error;

use crate::reminders::ReminderConfig;

/// Why a message could not be turned into a reminder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no time expression found in the message")]
    NoTimeExpression,
    #[error("the requested time has already passed")]
    PastTime,
    #[error("that isn't a valid time")]
    InvalidTimeValue,
}

/// Successful parse: when to fire, and what to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReminder {
    pub fire_time: DateTime<Utc>,
    pub text: String,
}

#[derive(Clone, Copy, Debug)]
enum MatcherKind {
    /// "tomorrow", "tonight", "next week", "next monday" — optionally with a
    /// clock time before or after the day word.
    NamedDay,
    /// "in 30 minutes"
    RelativeOffset,
    /// "30 minutes from now"
    OffsetFromNow,
    /// "at 3pm", "at 14:30"
    ClockTime,
}

/// Words stripped from the edges of the residual reminder text.
const CONNECTIVES: &[&str] = &["to", "about", "that"];

/// Used when nothing is left of the message after stripping the keyword and
/// time expression.
const FALLBACK_TEXT: &str = "reminder";

/// Heuristic natural-language time parser.
///
/// `detect` gates on an intent keyword AND a time indicator being present;
/// `parse` resolves the time expression against an ordered matcher table,
/// most specific pattern first. Explicitly constructed from config — the
/// caller owns the instance.
pub struct TimeParser {
    intent_patterns: Vec<Regex>,
    time_indicator: Regex,
    matchers: Vec<(MatcherKind, Regex)>,
    tonight_hour: u32,
    offset: FixedOffset,
}

impl TimeParser {
    pub fn new(config: &ReminderConfig) -> Self {
        let intent_patterns = config
            .intent_keywords
            .iter()
            .map(|kw| compile(&format!(r"(?i)\b{}\b", regex::escape(kw))))
            .collect();

        let time_indicator = compile(concat!(
            r"(?i)\b(?:minutes?|mins?|hours?|hrs?|days?|weeks?|tomorrow|tonight|later",
            r"|next\s+(?:week|month|monday|tuesday|wednesday|thursday|friday|saturday|sunday)",
            r"|at\s+\d{1,2}(?::\d{1,2})?\s*(?:am|pm)?)\b",
        ));

        // Priority order: a named day (possibly qualified by a clock time) wins
        // over a bare relative offset, which wins over a bare clock time. The
        // trigger tokens are disjoint, so the first matcher that fires is the
        // intended one.
        let matchers = vec![
            (
                MatcherKind::NamedDay,
                compile(concat!(
                    r"(?i)\b(tomorrow|tonight|next\s+week",
                    r"|next\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday))\b",
                    r"(?:\s+at\s+(\d{1,2})(?::(\d{1,2}))?\s*(am|pm)?)?",
                )),
            ),
            (
                MatcherKind::RelativeOffset,
                compile(r"(?i)\bin\s+(\d+)\s+(minute|min|hour|hr|day|week)s?\b"),
            ),
            (
                MatcherKind::OffsetFromNow,
                compile(r"(?i)\b(\d+)\s+(minute|min|hour|hr|day|week)s?\s+from\s+now\b"),
            ),
            (
                MatcherKind::ClockTime,
                compile(r"(?i)\bat\s+(\d{1,2})(?::(\d{1,2}))?\s*(am|pm)?\b"),
            ),
        ];

        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());

        Self {
            intent_patterns,
            time_indicator,
            matchers,
            tonight_hour: config.tonight_hour.min(23),
            offset,
        }
    }

    /// True only if the text carries both an intent keyword and a time
    /// indicator. Pure — safe to call repeatedly.
    pub fn detect(&self, text: &str) -> bool {
        self.intent_patterns.iter().any(|re| re.is_match(text)) && self.time_indicator.is_match(text)
    }

    /// Resolve the time expression in `text` against `now` and extract the
    /// residual reminder content. The result is guaranteed to be strictly in
    /// the future; a non-future resolution is an error, never a clamp.
    pub fn parse(&self, text: &str, now: DateTime<Utc>) -> Result<ParsedReminder, ParseError> {
        let now_local = now.with_timezone(&self.offset);

        let mut spans: Vec<(usize, usize)> = Vec::new();
        let resolved = self.resolve_time(text, now_local, &mut spans)?;
        if resolved <= now_local {
            return Err(ParseError::PastTime);
        }

        if let Some(span) = self.intent_span(text) {
            spans.push(span);
        }

        Ok(ParsedReminder {
            fire_time: resolved.with_timezone(&Utc),
            text: extract_residual(text, spans),
        })
    }

    /// First matcher in priority order that fires decides the resolution.
    /// Matched spans are recorded so the caller can strip them from the text.
    fn resolve_time(
        &self,
        text: &str,
        now: DateTime<FixedOffset>,
        spans: &mut Vec<(usize, usize)>,
    ) -> Result<DateTime<FixedOffset>, ParseError> {
        for (kind, re) in &self.matchers {
            let Some(caps) = re.captures(text) else {
                continue;
            };
            let whole = caps.get(0).expect("whole match");
            spans.push((whole.start(), whole.end()));

            match kind {
                MatcherKind::NamedDay => {
                    let day = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
                    let weekday = caps.get(2).and_then(|m| parse_weekday(m.as_str()));
                    let inline_clock = match caps.get(3) {
                        Some(hour) => Some(clock_from_parts(
                            hour.as_str(),
                            caps.get(4).map(|m| m.as_str()),
                            caps.get(5).map(|m| m.as_str()),
                        )?),
                        None => self.clock_elsewhere(text, (whole.start(), whole.end()), spans)?,
                    };
                    let day = day.as_deref().unwrap_or_default();
                    return self.resolve_named_day(day, weekday, inline_clock, now);
                }
                MatcherKind::RelativeOffset | MatcherKind::OffsetFromNow => {
                    let value: i64 = caps
                        .get(1)
                        .map(|m| m.as_str())
                        .unwrap_or_default()
                        .parse()
                        .map_err(|_| ParseError::InvalidTimeValue)?;
                    let unit = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());
                    let delta = offset_duration(value, unit.as_deref().unwrap_or_default())?;
                    return now
                        .checked_add_signed(delta)
                        .ok_or(ParseError::InvalidTimeValue);
                }
                MatcherKind::ClockTime => {
                    let time = clock_from_parts(
                        caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
                        caps.get(2).map(|m| m.as_str()),
                        caps.get(3).map(|m| m.as_str()),
                    )?;
                    // Today at that time if still ahead of us, otherwise the
                    // same time tomorrow.
                    let candidate = self.on_date(now, time)?;
                    return if candidate > now {
                        Ok(candidate)
                    } else {
                        self.on_date(next_day(now)?, time)
                    };
                }
            }
        }

        Err(ParseError::NoTimeExpression)
    }

    /// A named day composes with a clock time written elsewhere in the
    /// sentence ("at 3pm tomorrow").
    fn clock_elsewhere(
        &self,
        text: &str,
        day_span: (usize, usize),
        spans: &mut Vec<(usize, usize)>,
    ) -> Result<Option<NaiveTime>, ParseError> {
        let clock = self
            .matchers
            .iter()
            .find(|(kind, _)| matches!(kind, MatcherKind::ClockTime))
            .map(|(_, re)| re);
        let Some(re) = clock else { return Ok(None) };
        let Some(caps) = re.captures(text) else {
            return Ok(None);
        };
        let whole = caps.get(0).expect("whole match");
        if whole.start() >= day_span.0 && whole.start() < day_span.1 {
            return Ok(None);
        }
        spans.push((whole.start(), whole.end()));
        clock_from_parts(
            caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
            caps.get(2).map(|m| m.as_str()),
            caps.get(3).map(|m| m.as_str()),
        )
        .map(Some)
    }

    fn resolve_named_day(
        &self,
        day: &str,
        weekday: Option<Weekday>,
        clock: Option<NaiveTime>,
        now: DateTime<FixedOffset>,
    ) -> Result<DateTime<FixedOffset>, ParseError> {
        if day == "tonight" {
            // "tonight" never rolls over to the next day; once the evening
            // hour has passed it is rejected rather than silently moved.
            let time = clock.unwrap_or(
                NaiveTime::from_hms_opt(self.tonight_hour, 0, 0)
                    .ok_or(ParseError::InvalidTimeValue)?,
            );
            let candidate = self.on_date(now, time)?;
            return if candidate > now {
                Ok(candidate)
            } else {
                Err(ParseError::PastTime)
            };
        }

        let base = if day == "tomorrow" {
            next_day(now)?
        } else if day == "next week" || day.starts_with("next") && weekday.is_none() {
            now.checked_add_signed(Duration::days(7))
                .ok_or(ParseError::InvalidTimeValue)?
        } else if let Some(target) = weekday {
            // Next occurrence strictly after now; "next friday" on a Friday
            // means a week out, not today.
            let today = now.weekday().num_days_from_monday() as i64;
            let target = target.num_days_from_monday() as i64;
            let mut ahead = (target - today).rem_euclid(7);
            if ahead == 0 {
                ahead = 7;
            }
            now.checked_add_signed(Duration::days(ahead))
                .ok_or(ParseError::InvalidTimeValue)?
        } else {
            return Err(ParseError::NoTimeExpression);
        };

        match clock {
            Some(time) => self.on_date(base, time),
            None => Ok(base),
        }
    }

    fn on_date(
        &self,
        date: DateTime<FixedOffset>,
        time: NaiveTime,
    ) -> Result<DateTime<FixedOffset>, ParseError> {
        self.offset
            .from_local_datetime(&date.date_naive().and_time(time))
            .single()
            .ok_or(ParseError::InvalidTimeValue)
    }

    /// Span of the first configured intent keyword found in the text.
    fn intent_span(&self, text: &str) -> Option<(usize, usize)> {
        self.intent_patterns
            .iter()
            .filter_map(|re| re.find(text))
            .map(|m| (m.start(), m.end()))
            .next()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("hard-coded pattern compiles")
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn offset_duration(value: i64, unit: &str) -> Result<Duration, ParseError> {
    let duration = match unit {
        "minute" | "min" => Duration::try_minutes(value),
        "hour" | "hr" => Duration::try_hours(value),
        "day" => Duration::try_days(value),
        "week" => Duration::try_weeks(value),
        _ => None,
    };
    duration.ok_or(ParseError::InvalidTimeValue)
}

/// Turn `"3"`/`None`/`"pm"` style captures into a validated wall-clock time.
fn clock_from_parts(
    hour: &str,
    minute: Option<&str>,
    meridiem: Option<&str>,
) -> Result<NaiveTime, ParseError> {
    let hour: u32 = hour.parse().map_err(|_| ParseError::InvalidTimeValue)?;
    let minute: u32 = match minute {
        Some(m) => m.parse().map_err(|_| ParseError::InvalidTimeValue)?,
        None => 0,
    };

    let hour = match meridiem.map(str::to_ascii_lowercase).as_deref() {
        Some("pm") => {
            if !(1..=12).contains(&hour) {
                return Err(ParseError::InvalidTimeValue);
            }
            (hour % 12) + 12
        }
        Some("am") => {
            if !(1..=12).contains(&hour) {
                return Err(ParseError::InvalidTimeValue);
            }
            hour % 12
        }
        _ => hour,
    };

    if hour > 23 || minute > 59 {
        return Err(ParseError::InvalidTimeValue);
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ParseError::InvalidTimeValue)
}

fn next_day(now: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>, ParseError> {
    now.checked_add_signed(Duration::days(1))
        .ok_or(ParseError::InvalidTimeValue)
}

/// Remove the matched keyword and time spans, trim connective words from the
/// edges, and collapse whitespace. Empty results fall back to a generic label.
fn extract_residual(text: &str, mut spans: Vec<(usize, usize)>) -> String {
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.0 <= last.1 => last.1 = last.1.max(span.1),
            _ => merged.push(span),
        }
    }

    let mut residual = text.to_string();
    for (start, end) in merged.into_iter().rev() {
        residual.replace_range(start..end, " ");
    }

    let mut words: Vec<&str> = residual.split_whitespace().collect();
    while let Some(first) = words.first() {
        if is_connective(first) {
            words.remove(0);
        } else {
            break;
        }
    }
    while let Some(last) = words.last() {
        if is_connective(last) {
            words.pop();
        } else {
            break;
        }
    }

    if words.is_empty() {
        FALLBACK_TEXT.to_string()
    } else {
        words.join(" ")
    }
}

fn is_connective(word: &str) -> bool {
    let trimmed = word
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_ascii_lowercase();
    trimmed.is_empty() || CONNECTIVES.contains(&trimmed.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parser() -> TimeParser {
        TimeParser::new(&ReminderConfig::default())
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn detect_requires_keyword_and_time_indicator() {
        let p = parser();
        assert!(p.detect("remind me in 30 minutes to check the oven"));
        // Time word without intent
        assert!(!p.detect("it's 3pm already"));
        // Intent without any resolvable timing
        assert!(!p.detect("remind me sometime"));
        assert!(!p.detect("what a lovely day"));
    }

    #[test]
    fn detect_is_pure() {
        let p = parser();
        let text = "remind me tomorrow to water the plants";
        assert_eq!(p.detect(text), p.detect(text));
    }

    #[test]
    fn relative_offsets_for_all_units() {
        let p = parser();
        let now = utc(2024, 3, 15, 14, 0);
        let cases = [
            ("minute", Duration::minutes(7)),
            ("hour", Duration::hours(7)),
            ("day", Duration::days(7)),
            ("week", Duration::weeks(7)),
        ];
        for (unit, delta) in cases {
            let msg = format!("remind me in 7 {unit}s to stretch");
            let parsed = p.parse(&msg, now).unwrap();
            assert_eq!(parsed.fire_time, now + delta, "unit {unit}");
            assert_eq!(parsed.text, "stretch");
        }
    }

    #[test]
    fn offset_from_now_form() {
        let p = parser();
        let now = utc(2024, 3, 15, 14, 0);
        let parsed = p.parse("ping me 2 hours from now to hydrate", now).unwrap();
        assert_eq!(parsed.fire_time, now + Duration::hours(2));
        assert_eq!(parsed.text, "hydrate");
    }

    #[test]
    fn clock_time_resolves_today_when_still_ahead() {
        let p = parser();
        let now = utc(2024, 3, 15, 14, 0);
        let parsed = p.parse("remind me at 3pm", now).unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 15, 15, 0));
        assert_eq!(parsed.text, "reminder");
    }

    #[test]
    fn clock_time_rolls_forward_once_passed() {
        let p = parser();
        let now = utc(2024, 3, 15, 16, 0);
        let parsed = p.parse("remind me at 3pm", now).unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 16, 15, 0));
    }

    #[test]
    fn twenty_four_hour_clock() {
        let p = parser();
        let now = utc(2024, 3, 15, 10, 0);
        let parsed = p.parse("notify me at 14:30 about standup", now).unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 15, 14, 30));
        assert_eq!(parsed.text, "standup");
    }

    #[test]
    fn malformed_clock_values_are_rejected() {
        let p = parser();
        let now = utc(2024, 3, 15, 10, 0);
        assert_eq!(
            p.parse("remind me at 25:00", now),
            Err(ParseError::InvalidTimeValue)
        );
        assert_eq!(
            p.parse("remind me at 13pm", now),
            Err(ParseError::InvalidTimeValue)
        );
        assert_eq!(
            p.parse("remind me at 10:75", now),
            Err(ParseError::InvalidTimeValue)
        );
    }

    #[test]
    fn tonight_before_the_evening_hour() {
        let p = parser();
        let now = utc(2024, 3, 15, 10, 0);
        let parsed = p.parse("remind me tonight to take out the bins", now).unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 15, 20, 0));
        assert_eq!(parsed.text, "take out the bins");
    }

    #[test]
    fn tonight_after_the_evening_hour_fails() {
        let p = parser();
        let now = utc(2024, 3, 15, 21, 0);
        assert_eq!(
            p.parse("remind me tonight to take out the bins", now),
            Err(ParseError::PastTime)
        );
    }

    #[test]
    fn tomorrow_keeps_the_time_of_day() {
        let p = parser();
        let now = utc(2024, 3, 15, 9, 30);
        let parsed = p.parse("remind me tomorrow to call mum", now).unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 16, 9, 30));
        assert_eq!(parsed.text, "call mum");
    }

    #[test]
    fn tomorrow_with_explicit_clock() {
        let p = parser();
        let now = utc(2024, 3, 15, 9, 0);
        let parsed = p
            .parse("remind me tomorrow at 2pm to submit the report", now)
            .unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 16, 14, 0));
        assert_eq!(parsed.text, "submit the report");
    }

    #[test]
    fn clock_written_before_the_day_word_composes() {
        let p = parser();
        let now = utc(2024, 3, 15, 9, 0);
        let parsed = p
            .parse("remind me at 2pm tomorrow to submit the report", now)
            .unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 16, 14, 0));
        assert_eq!(parsed.text, "submit the report");
    }

    #[test]
    fn next_weekday_is_strictly_after_now() {
        let p = parser();
        // 2024-03-15 is a Friday.
        let now = utc(2024, 3, 15, 14, 0);
        let parsed = p.parse("remind me next monday to review PRs", now).unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 18, 14, 0));

        let parsed = p.parse("remind me next friday to review PRs", now).unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 22, 14, 0));
    }

    #[test]
    fn next_weekday_with_clock() {
        let p = parser();
        let now = utc(2024, 3, 15, 14, 0);
        let parsed = p
            .parse("remind me next monday at 7am to review PRs", now)
            .unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 18, 7, 0));
        assert_eq!(parsed.text, "review PRs");
    }

    #[test]
    fn next_week_is_seven_days_out() {
        let p = parser();
        let now = utc(2024, 3, 15, 14, 0);
        let parsed = p.parse("remind me next week about the invoice", now).unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 22, 14, 0));
        assert_eq!(parsed.text, "the invoice");
    }

    #[test]
    fn no_time_expression_is_its_own_error() {
        let p = parser();
        let now = utc(2024, 3, 15, 14, 0);
        assert_eq!(
            p.parse("remind me to do the thing later", now),
            Err(ParseError::NoTimeExpression)
        );
    }

    #[test]
    fn residual_strips_connectives_and_punctuation() {
        let p = parser();
        let now = utc(2024, 3, 15, 9, 0);
        let parsed = p.parse("remind me tomorrow, about the standup", now).unwrap();
        assert_eq!(parsed.text, "the standup");
    }

    #[test]
    fn empty_residual_falls_back_to_generic_label() {
        let p = parser();
        let now = utc(2024, 3, 15, 9, 0);
        let parsed = p.parse("remind me in 10 minutes", now).unwrap();
        assert_eq!(parsed.text, "reminder");
    }

    #[test]
    fn reference_timezone_is_config_driven() {
        let config = ReminderConfig {
            utc_offset_minutes: 120,
            ..ReminderConfig::default()
        };
        let p = TimeParser::new(&config);
        // 14:00 UTC is 16:00 local, so "tonight" (20:00 local) is 18:00 UTC.
        let now = utc(2024, 3, 15, 14, 0);
        let parsed = p.parse("remind me tonight to wind down", now).unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 15, 18, 0));
    }

    #[test]
    fn end_to_end_oven_scenario() {
        let p = parser();
        let now = utc(2024, 3, 15, 14, 0);
        let parsed = p
            .parse("remind me in 30 minutes to check the oven", now)
            .unwrap();
        assert_eq!(parsed.fire_time, utc(2024, 3, 15, 14, 30));
        assert_eq!(parsed.text, "check the oven");
    }
}
