//! A 5-field cron expression (minute hour day-of-month month day-of-week).
//!
//! Supports standard Unix/Vixie cron features:
//!
//! - `*` any
//! - `?` no specific value (only for DOM/DOW)
//! - lists: `1,2,3`
//! - ranges: `1-5`
//! - steps: `*/5`, `1-10/2`, `3/15`
//! - month names `JAN..DEC`
//! - day-of-week names `MON..SUN` (SUN may be 0 or 7)
//! - macros `@yearly @annually @monthly @weekly @daily @midnight @hourly`
//!
//! DOM and DOW follow OR semantics when both are restricted (not `*` or `?`),
//! matching traditional cron behavior.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Timelike};
use thiserror::Error;

/// Errors raised while parsing a cron expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CronError {
    /// The expression was empty or whitespace-only.
    #[error("cron expression is empty")]
    Empty,

    /// An unrecognized `@macro`.
    #[error("unknown cron macro: {0}")]
    UnknownMacro(String),

    /// The expression did not have exactly five fields.
    #[error("cron must have 5 fields, got {0}")]
    FieldCount(usize),

    /// A single field failed to parse.
    #[error("invalid {field} field: {reason}")]
    Field {
        field: &'static str,
        reason: String,
    },
}

#[derive(Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    allow_question: bool,
    names: &'static [(&'static str, u32)],
}

const MINUTE_SPEC: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    allow_question: false,
    names: &[],
};
const HOUR_SPEC: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    allow_question: false,
    names: &[],
};
const DOM_SPEC: FieldSpec = FieldSpec {
    name: "day-of-month",
    min: 1,
    max: 31,
    allow_question: true,
    names: &[],
};
const MONTH_SPEC: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    allow_question: false,
    names: &[
        ("jan", 1),
        ("feb", 2),
        ("mar", 3),
        ("apr", 4),
        ("may", 5),
        ("jun", 6),
        ("jul", 7),
        ("aug", 8),
        ("sep", 9),
        ("oct", 10),
        ("nov", 11),
        ("dec", 12),
    ],
};
const DOW_SPEC: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 6,
    allow_question: true,
    names: &[
        ("sun", 0),
        ("mon", 1),
        ("tue", 2),
        ("wed", 3),
        ("thu", 4),
        ("fri", 5),
        ("sat", 6),
    ],
};

/// One parsed cron field as a bitmask over its allowed values.
#[derive(Debug, Clone, Copy)]
struct Field {
    any: bool,
    /// `?` — only meaningful for DOM/DOW.
    unspecified: bool,
    mask: u64,
    min: u32,
    max: u32,
}

impl Field {
    fn parse(raw: &str, spec: FieldSpec) -> Result<Self, CronError> {
        let err = |reason: String| CronError::Field {
            field: spec.name,
            reason,
        };

        let s = raw.trim().to_ascii_lowercase();
        match s.as_str() {
            "" => return Err(err("field is empty".into())),
            "*" => {
                return Ok(Self {
                    any: true,
                    unspecified: false,
                    mask: 0,
                    min: spec.min,
                    max: spec.max,
                });
            }
            "?" => {
                if !spec.allow_question {
                    return Err(err("'?' is only allowed for day-of-month/day-of-week".into()));
                }
                return Ok(Self {
                    any: true,
                    unspecified: true,
                    mask: 0,
                    min: spec.min,
                    max: spec.max,
                });
            }
            _ => {}
        }

        let mut mask = 0u64;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            Self::add_part(&mut mask, part, spec).map_err(err)?;
        }
        if mask == 0 {
            return Err(err(format!("no valid values in '{raw}'")));
        }
        Ok(Self {
            any: false,
            unspecified: false,
            mask,
            min: spec.min,
            max: spec.max,
        })
    }

    fn add_part(mask: &mut u64, part: &str, spec: FieldSpec) -> Result<(), String> {
        let (base, step) = match part.split_once('/') {
            Some((base, step_str)) => {
                let step_str = step_str.trim();
                if step_str.is_empty() {
                    return Err(format!("missing step in '{part}'"));
                }
                let step: u32 = step_str
                    .parse()
                    .map_err(|_| format!("bad step in '{part}'"))?;
                if step == 0 {
                    return Err(format!("step must be > 0 in '{part}'"));
                }
                (base.trim(), Some(step))
            }
            None => (part, None),
        };

        let (mut start, mut end) = if base.is_empty() || base == "*" {
            (spec.min, spec.max)
        } else if let Some((a, b)) = base.split_once('-') {
            let a = a.trim();
            let b = b.trim();
            if a.is_empty() || b.is_empty() {
                return Err(format!("bad range '{part}'"));
            }
            (Self::parse_value(a, spec)?, Self::parse_value(b, spec)?)
        } else {
            let v = Self::parse_value(base, spec)?;
            // a bare value with a step means "from v to max"
            (v, if step.is_some() { spec.max } else { v })
        };

        if spec.allow_question && spec.max == 6 {
            // day-of-week: 7 is an alias for Sunday
            if start == 7 {
                start = 0;
            }
            if end == 7 {
                end = 0;
            }
        }

        let step = step.unwrap_or(1);
        if start <= end {
            Self::fill(mask, start, end, step, spec)?;
        } else {
            // wrap-around range, e.g. FRI-MON
            Self::fill(mask, start, spec.max, step, spec)?;
            Self::fill(mask, spec.min, end, step, spec)?;
        }
        Ok(())
    }

    fn parse_value(token: &str, spec: FieldSpec) -> Result<u32, String> {
        let t = token.trim().to_ascii_lowercase();
        if t.is_empty() {
            return Err("empty value token".into());
        }
        if let Some(&(_, v)) = spec.names.iter().find(|(name, _)| *name == t) {
            return Ok(v);
        }
        let v: u32 = t.parse().map_err(|_| format!("bad value '{token}'"))?;
        if spec.allow_question && spec.max == 6 && v == 7 {
            return Ok(0);
        }
        Ok(v)
    }

    fn fill(mask: &mut u64, start: u32, end: u32, step: u32, spec: FieldSpec) -> Result<(), String> {
        if start < spec.min || start > spec.max {
            return Err(format!("value out of range: {start}"));
        }
        if end < spec.min || end > spec.max {
            return Err(format!("value out of range: {end}"));
        }
        let mut v = start;
        while v <= end {
            *mask |= 1 << v;
            v += step;
        }
        Ok(())
    }

    fn matches(&self, v: u32) -> bool {
        if self.any {
            return true;
        }
        v >= self.min && v <= self.max && self.mask & (1 << v) != 0
    }

    fn next_or_same(&self, v: u32) -> Option<u32> {
        if self.any {
            return Some(v);
        }
        (v..=self.max).find(|&n| self.mask & (1 << n) != 0)
    }

    fn next_after_value(&self, v: u32) -> Option<u32> {
        if self.any {
            return (v < self.max).then(|| v + 1);
        }
        ((v + 1)..=self.max).find(|&n| self.mask & (1 << n) != 0)
    }

    fn first(&self) -> Option<u32> {
        if self.any {
            return Some(self.min);
        }
        (self.min..=self.max).find(|&n| self.mask & (1 << n) != 0)
    }

    fn first_or_min(&self) -> u32 {
        self.first().unwrap_or(self.min)
    }
}

/// A parsed 5-field cron schedule.
#[derive(Debug, Clone, Copy)]
pub struct Cron {
    minute: Field,
    hour: Field,
    day_of_month: Field,
    month: Field,
    day_of_week: Field,
}

impl Cron {
    /// Parses a cron expression or macro.
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(CronError::Empty);
        }

        let expanded = if let Some(stripped) = trimmed.strip_prefix('@') {
            match stripped.to_ascii_lowercase().as_str() {
                "yearly" | "annually" => "0 0 1 1 *",
                "monthly" => "0 0 1 * *",
                "weekly" => "0 0 * * 0",
                "daily" | "midnight" => "0 0 * * *",
                "hourly" => "0 * * * *",
                _ => return Err(CronError::UnknownMacro(trimmed.to_string())),
            }
        } else {
            trimmed
        };

        let parts: Vec<&str> = expanded.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(CronError::FieldCount(parts.len()));
        }

        Ok(Self {
            minute: Field::parse(parts[0], MINUTE_SPEC)?,
            hour: Field::parse(parts[1], HOUR_SPEC)?,
            day_of_month: Field::parse(parts[2], DOM_SPEC)?,
            month: Field::parse(parts[3], MONTH_SPEC)?,
            day_of_week: Field::parse(parts[4], DOW_SPEC)?,
        })
    }

    /// Returns the next time strictly after `after` that matches this cron.
    ///
    /// Jumps across invalid ranges by aligning month, day, hour and minute
    /// fields instead of scanning every minute. Returns `None` if no match
    /// exists within ten years.
    pub fn next_after(&self, after: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        let offset = *after.offset();
        let mut t = truncate_minute(after + Duration::minutes(1));
        let end = t + Duration::days(3_653);

        while t <= end {
            // 1) align month
            let mon = t.month();
            match self.month.next_or_same(mon) {
                None => {
                    let first = self.month.first()?;
                    t = at(offset, t.year() + 1, first, 1, 0, 0)?;
                    continue;
                }
                Some(next_mon) if next_mon != mon => {
                    t = at(offset, t.year(), next_mon, 1, 0, 0)?;
                    continue;
                }
                _ => {}
            }

            // 2) align day within the current month
            match self.find_next_valid_day_in_month(t, offset) {
                None => {
                    t = self.advance_to_next_allowed_month(t, offset)?;
                    continue;
                }
                Some(day_aligned) if day_aligned.date_naive() != t.date_naive() => {
                    t = at(
                        offset,
                        day_aligned.year(),
                        day_aligned.month(),
                        day_aligned.day(),
                        self.hour.first_or_min(),
                        self.minute.first_or_min(),
                    )?;
                    continue;
                }
                _ => {}
            }

            // 3) align hour
            let hr = t.hour();
            match self.hour.next_or_same(hr) {
                None => {
                    let next_day = t + Duration::days(1);
                    t = at(
                        offset,
                        next_day.year(),
                        next_day.month(),
                        next_day.day(),
                        self.hour.first_or_min(),
                        self.minute.first_or_min(),
                    )?;
                    continue;
                }
                Some(next_hr) if next_hr != hr => {
                    t = at(
                        offset,
                        t.year(),
                        t.month(),
                        t.day(),
                        next_hr,
                        self.minute.first_or_min(),
                    )?;
                    continue;
                }
                _ => {}
            }

            // 4) align minute
            let min = t.minute();
            match self.minute.next_or_same(min) {
                None => {
                    let next_hour = t + Duration::hours(1);
                    t = at(
                        offset,
                        next_hour.year(),
                        next_hour.month(),
                        next_hour.day(),
                        next_hour.hour(),
                        self.minute.first_or_min(),
                    )?;
                    continue;
                }
                Some(next_min) if next_min != min => {
                    t = at(offset, t.year(), t.month(), t.day(), t.hour(), next_min)?;
                }
                _ => {}
            }

            if self.matches(t) {
                return Some(t);
            }
            t = truncate_minute(t + Duration::minutes(1));
        }
        None
    }

    fn find_next_valid_day_in_month(
        &self,
        t: DateTime<FixedOffset>,
        offset: FixedOffset,
    ) -> Option<DateTime<FixedOffset>> {
        let max_dom = days_in_month(t.year(), t.month());
        for dom in t.day()..=max_dom {
            let candidate = at(offset, t.year(), t.month(), dom, t.hour(), t.minute())?;
            if self.day_matches(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn advance_to_next_allowed_month(
        &self,
        t: DateTime<FixedOffset>,
        offset: FixedOffset,
    ) -> Option<DateTime<FixedOffset>> {
        if let Some(next) = self.month.next_after_value(t.month()) {
            return at(offset, t.year(), next, 1, 0, 0);
        }
        let first = self.month.first()?;
        at(offset, t.year() + 1, first, 1, 0, 0)
    }

    fn matches(&self, t: DateTime<FixedOffset>) -> bool {
        self.minute.matches(t.minute())
            && self.hour.matches(t.hour())
            && self.month.matches(t.month())
            && self.day_matches(t)
    }

    fn day_matches(&self, t: DateTime<FixedOffset>) -> bool {
        let dom = t.day();
        let dow = t.weekday().num_days_from_sunday();

        // DOM/DOW semantics:
        // - if one is '?' then only the other is considered
        // - if one is '*' and the other is restricted, the other decides
        // - if both are restricted: OR (traditional cron)
        let dom_match = self.day_of_month.matches(dom);
        let dow_match = self.day_of_week.matches(dow);

        match (self.day_of_month.unspecified, self.day_of_week.unspecified) {
            (true, true) => return true,
            (true, false) => return dow_match,
            (false, true) => return dom_match,
            (false, false) => {}
        }

        match (self.day_of_month.any, self.day_of_week.any) {
            (true, true) => true,
            (true, false) => dow_match,
            (false, true) => dom_match,
            (false, false) => dom_match || dow_match,
        }
    }
}

fn truncate_minute(t: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    t - Duration::seconds(i64::from(t.second())) - Duration::nanoseconds(i64::from(t.nanosecond()))
}

fn at(
    offset: FixedOffset,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> Option<DateTime<FixedOffset>> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let naive = date.and_hms_opt(hour, minute, 0)?;
    offset.from_local_datetime(&naive).single()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        at(utc(), y, mo, d, h, mi).unwrap()
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(Cron::parse(""), Err(CronError::Empty)));
        assert_eq!(Cron::parse("* * * *").unwrap_err(), CronError::FieldCount(4));
        assert!(matches!(
            Cron::parse("@fortnightly"),
            Err(CronError::UnknownMacro(_))
        ));
        assert!(matches!(
            Cron::parse("? * * * *"),
            Err(CronError::Field { field: "minute", .. })
        ));
        assert!(matches!(
            Cron::parse("61 * * * *"),
            Err(CronError::Field { field: "minute", .. })
        ));
    }

    #[test]
    fn test_daily_macro() {
        let cron = Cron::parse("@daily").unwrap();
        let next = cron.next_after(dt(2025, 3, 10, 15, 30)).unwrap();
        assert_eq!(next, dt(2025, 3, 11, 0, 0));
    }

    #[test]
    fn test_minute_steps() {
        let cron = Cron::parse("*/15 * * * *").unwrap();
        assert_eq!(cron.next_after(dt(2025, 1, 1, 10, 0)).unwrap(), dt(2025, 1, 1, 10, 15));
        assert_eq!(cron.next_after(dt(2025, 1, 1, 10, 50)).unwrap(), dt(2025, 1, 1, 11, 0));
    }

    #[test]
    fn test_exact_time_rolls_to_next_day() {
        let cron = Cron::parse("30 9 * * *").unwrap();
        // exactly at the match: next occurrence is strictly after
        assert_eq!(cron.next_after(dt(2025, 5, 2, 9, 30)).unwrap(), dt(2025, 5, 3, 9, 30));
        assert_eq!(cron.next_after(dt(2025, 5, 2, 9, 29)).unwrap(), dt(2025, 5, 2, 9, 30));
    }

    #[test]
    fn test_month_and_dow_names() {
        let cron = Cron::parse("0 12 * mar mon").unwrap();
        // 2025-03-03 is the first Monday of March 2025
        assert_eq!(cron.next_after(dt(2025, 1, 1, 0, 0)).unwrap(), dt(2025, 3, 3, 12, 0));
    }

    #[test]
    fn test_sunday_seven_alias() {
        let a = Cron::parse("0 0 * * 7").unwrap();
        let b = Cron::parse("0 0 * * 0").unwrap();
        let from = dt(2025, 6, 4, 0, 0);
        assert_eq!(a.next_after(from), b.next_after(from));
        // 2025-06-08 is a Sunday
        assert_eq!(a.next_after(from).unwrap(), dt(2025, 6, 8, 0, 0));
    }

    #[test]
    fn test_dom_dow_or_semantics() {
        // "the 13th or any Friday"
        let cron = Cron::parse("0 0 13 * fri").unwrap();
        // from June 10 2025 (Tue): Friday the 13th happens to be first
        assert_eq!(cron.next_after(dt(2025, 6, 10, 0, 0)).unwrap(), dt(2025, 6, 13, 0, 0));
        // from June 13: next is Friday June 20, before July 13
        assert_eq!(cron.next_after(dt(2025, 6, 13, 0, 0)).unwrap(), dt(2025, 6, 20, 0, 0));
    }

    #[test]
    fn test_question_mark_dom() {
        let cron = Cron::parse("0 0 ? * mon").unwrap();
        // 2025-06-09 is a Monday
        assert_eq!(cron.next_after(dt(2025, 6, 4, 0, 0)).unwrap(), dt(2025, 6, 9, 0, 0));
    }

    #[test]
    fn test_wrap_around_range() {
        let cron = Cron::parse("0 22-2 * * *").unwrap();
        assert_eq!(cron.next_after(dt(2025, 1, 1, 20, 0)).unwrap(), dt(2025, 1, 1, 22, 0));
        assert_eq!(cron.next_after(dt(2025, 1, 1, 23, 30)).unwrap(), dt(2025, 1, 2, 0, 0));
        assert_eq!(cron.next_after(dt(2025, 1, 2, 2, 30)).unwrap(), dt(2025, 1, 2, 22, 0));
    }

    #[test]
    fn test_yearly_skips_months() {
        let cron = Cron::parse("0 0 1 1 *").unwrap();
        assert_eq!(cron.next_after(dt(2025, 2, 1, 0, 0)).unwrap(), dt(2026, 1, 1, 0, 0));
    }

    #[test]
    fn test_short_month_dom() {
        let cron = Cron::parse("0 0 31 * *").unwrap();
        // from Feb: no Feb 31, jumps to Mar 31
        assert_eq!(cron.next_after(dt(2025, 2, 1, 0, 0)).unwrap(), dt(2025, 3, 31, 0, 0));
    }

    #[test]
    fn test_impossible_schedule_returns_none() {
        // Feb 30 never exists
        let cron = Cron::parse("0 0 30 2 *").unwrap();
        assert_eq!(cron.next_after(dt(2025, 1, 1, 0, 0)), None);
    }

    #[test]
    fn test_respects_fixed_offset() {
        let plus8 = FixedOffset::east_opt(8 * 3600).unwrap();
        let cron = Cron::parse("0 8 * * *").unwrap();
        let after = at(plus8, 2025, 4, 1, 9, 0).unwrap();
        let next = cron.next_after(after).unwrap();
        assert_eq!(next, at(plus8, 2025, 4, 2, 8, 0).unwrap());
        assert_eq!(*next.offset(), plus8);
    }
}
