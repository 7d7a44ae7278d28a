//! Cron expression wrapper and next-occurrence delay computation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;

use crate::error::SchedulerError;

/// Earliest year the underlying parser accepts in a year field.
const MIN_YEAR: u32 = 1970;

/// A parsed cron schedule plus the normalized expression text it came from.
///
/// Parsing happens exactly once, at bind time or at the `schedule()` call;
/// an expression that does not parse never reaches the engine.
#[derive(Clone)]
pub struct CronSchedule {
    expression: String,
    /// `None` when the year field lies entirely in the past; such a
    /// schedule is valid but has no occurrences left.
    inner: Option<Schedule>,
}

impl CronSchedule {
    /// Parse an expression into a schedule.
    ///
    /// Accepts the 6-field (seconds first) and 7-field (trailing year)
    /// calendar cron syntax. Two rewrites are applied before parsing:
    /// 5-field expressions get a `0` seconds field prepended, and
    /// Quartz-style `?` placeholders become `*`.
    ///
    /// A year field confined to years before 1970 would be rejected by
    /// the parser; it is accepted here as a schedule with no remaining
    /// occurrences, so the binding can be skipped instead of erroring.
    pub fn parse(expression: &str) -> Result<Self, SchedulerError> {
        let normalized = normalize(expression);
        if normalized.is_empty() {
            return Err(SchedulerError::EmptyExpression);
        }
        let fields: Vec<&str> = normalized.split_whitespace().collect();
        if fields.len() == 7 && year_field_is_past(fields[6]) {
            return Ok(Self {
                expression: normalized,
                inner: None,
            });
        }
        let inner =
            Schedule::from_str(&normalized).map_err(|source| SchedulerError::InvalidExpression {
                expression: expression.trim().to_string(),
                source,
            })?;
        Ok(Self {
            expression: normalized,
            inner: Some(inner),
        })
    }

    /// The normalized expression text.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First occurrence strictly after `after`, or `None` if the
    /// expression can never match again.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.inner.as_ref()?.after(&after).next()
    }

    /// Delay until the next occurrence after `after`, measured against the
    /// wall clock at call time so drift between the logical `after` and
    /// now is absorbed rather than propagated.
    ///
    /// An occurrence that already elapsed in that window clamps to zero
    /// (fire immediately). `None` means no further occurrence exists.
    pub fn delay_from(&self, after: DateTime<Utc>) -> Option<Duration> {
        let next = self.next_after(after)?;
        Some((next - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }
}

impl FromStr for CronSchedule {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CronSchedule").field(&self.expression).finish()
    }
}

/// Normalize an expression to the 6-or-7-field form the `cron` crate
/// parses: prepend a seconds field to 5-field expressions, rewrite `?`
/// to `*`.
fn normalize(expression: &str) -> String {
    let mut fields: Vec<&str> = expression
        .split_whitespace()
        .map(|f| if f == "?" { "*" } else { f })
        .collect();
    if fields.len() == 5 {
        fields.insert(0, "0");
    }
    fields.join(" ")
}

/// Whether a literal year field names only years before [`MIN_YEAR`].
///
/// A stepped single value (`1900/4`) walks upward without bound and so
/// is never past; anything non-numeric is left for the parser to judge.
fn year_field_is_past(field: &str) -> bool {
    field.split(',').all(|part| {
        let (range, stepped) = match part.split_once('/') {
            Some((range, _)) => (range, true),
            None => (part, false),
        };
        match range.split_once('-') {
            None if stepped => false,
            None => range.parse::<u32>().is_ok_and(|year| year < MIN_YEAR),
            Some((_, end)) => end.parse::<u32>().is_ok_and(|year| year < MIN_YEAR),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parses_six_field_expression() {
        let schedule = CronSchedule::parse("0 */15 * * * *").unwrap();
        assert_eq!(schedule.expression(), "0 */15 * * * *");
    }

    #[test]
    fn normalizes_five_field_expression() {
        let schedule = CronSchedule::parse("*/15 * * * *").unwrap();
        assert_eq!(schedule.expression(), "0 */15 * * * *");
    }

    #[test]
    fn rewrites_question_mark_placeholders() {
        let schedule = CronSchedule::parse("0/1 * * * * ?").unwrap();
        assert_eq!(schedule.expression(), "0/1 * * * * *");
    }

    #[test]
    fn rejects_invalid_expression() {
        let err = CronSchedule::parse("not a cron").unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidExpression { .. }));
    }

    #[test]
    fn rejects_empty_expression() {
        assert!(matches!(
            CronSchedule::parse("   "),
            Err(SchedulerError::EmptyExpression)
        ));
    }

    #[test]
    fn next_after_is_in_the_future() {
        let schedule = CronSchedule::parse("0 15 10 15 * ?").unwrap();
        let reference = at(2024, 5, 1, 12, 0, 0);
        let next = schedule.next_after(reference).unwrap();
        assert!(next > reference);
    }

    #[test]
    fn next_after_is_non_decreasing() {
        let schedule = CronSchedule::parse("0 0 * * * *").unwrap();
        let mut reference = at(2024, 5, 1, 0, 0, 0);
        let mut previous = schedule.next_after(reference).unwrap();
        for _ in 0..48 {
            reference = reference + chrono::Duration::minutes(37);
            let next = schedule.next_after(reference).unwrap();
            assert!(next >= previous, "{next} < {previous} at {reference}");
            previous = next;
        }
    }

    #[test]
    fn parse_is_deterministic() {
        let reference = at(2024, 5, 1, 12, 0, 0);
        let a = CronSchedule::parse("0 30 9 * * ?").unwrap();
        let b = CronSchedule::parse("0 30 9 * * ?").unwrap();
        assert_eq!(a.next_after(reference), b.next_after(reference));
    }

    #[test]
    fn pre_1970_year_parses_but_never_fires() {
        let schedule = CronSchedule::parse("0 0 10 * * ? 1900").unwrap();
        assert_eq!(schedule.next_after(at(2024, 5, 1, 12, 0, 0)), None);
        assert_eq!(schedule.delay_from(Utc::now()), None);

        let ranged = CronSchedule::parse("0 0 0 1 1 * 1950-1960").unwrap();
        assert_eq!(ranged.next_after(Utc::now()), None);
    }

    #[test]
    fn stepped_year_start_is_not_treated_as_past() {
        // 1970/10 matches 2030, 2040, ... as well.
        let schedule = CronSchedule::parse("0 0 0 1 1 * 1970/10").unwrap();
        assert!(schedule.next_after(at(2024, 5, 1, 12, 0, 0)).is_some());
    }

    #[test]
    fn exhausted_year_has_no_next_occurrence() {
        let schedule = CronSchedule::parse("0 0 10 * * ? 2000").unwrap();
        assert_eq!(schedule.next_after(Utc::now()), None);
        assert_eq!(schedule.delay_from(Utc::now()), None);
    }

    #[test]
    fn elapsed_occurrence_clamps_delay_to_zero() {
        let schedule = CronSchedule::parse("* * * * * *").unwrap();
        // Next occurrence after an hour ago lies far in the past relative
        // to the wall clock; the negative difference must clamp, not
        // produce a negative delay.
        let delay = schedule
            .delay_from(Utc::now() - chrono::Duration::hours(1))
            .unwrap();
        assert_eq!(delay, Duration::ZERO);
    }

    #[test]
    fn upcoming_delay_stays_within_one_period() {
        let schedule = CronSchedule::parse("* * * * * *").unwrap();
        let delay = schedule.delay_from(Utc::now()).unwrap();
        assert!(delay <= Duration::from_secs(1), "delay was {delay:?}");
    }
}
