//! Cron schedule evaluation for maintenance windows.
//!
//! Configuration uses standard 5-field cron (`min hour dom month dow`, Sunday
//! is 0 or 7), a `@descriptor`, or `@every <duration>`, optionally prefixed
//! with `CRON_TZ=<zone>` or `TZ=<zone>`. Without a prefix schedules are
//! evaluated in UTC.
//!
//! The `cron` crate wants 6 fields with a leading seconds column, numbers
//! weekdays from 1 = Sunday, and requires both day fields to match. Standard
//! cron fires when either restricted day field matches, so an expression
//! restricting both is split into two schedules and the earlier occurrence
//! wins.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use silencer_core::{parse_duration, ConfigError};

const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

const DESCRIPTORS: &[(&str, &str)] = &[
    ("@yearly", "0 0 0 1 1 *"),
    ("@annually", "0 0 0 1 1 *"),
    ("@monthly", "0 0 0 1 * *"),
    ("@weekly", "0 0 0 * * SUN"),
    ("@daily", "0 0 0 * * *"),
    ("@midnight", "0 0 0 * * *"),
    ("@hourly", "0 0 * * * *"),
];

const TIMEZONE_PREFIXES: [&str; 2] = ["CRON_TZ=", "TZ="];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid schedule '{expression}': {reason}")]
pub struct ScheduleError {
    pub expression: String,
    pub reason: String,
}

impl From<ScheduleError> for ConfigError {
    fn from(e: ScheduleError) -> Self {
        ConfigError::Schedule {
            expression: e.expression,
            reason: e.reason,
        }
    }
}

#[derive(Debug, Clone)]
enum Recurrence {
    /// A day qualifies when any of the schedules matches it.
    Cron(Vec<Schedule>),
    /// Fixed interval in whole seconds, counted from the Unix epoch.
    Every(i64),
}

/// A parsed recurrence rule. Inputs and outputs are UTC instants; cron fields
/// are matched in the schedule's timezone.
#[derive(Debug, Clone)]
pub struct MaintenanceSchedule {
    /// Expression as written in configuration.
    expression: String,
    timezone: Tz,
    recurrence: Recurrence,
}

impl MaintenanceSchedule {
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        let err = |reason: String| ScheduleError {
            expression: expression.to_string(),
            reason,
        };

        let (timezone, body) = split_timezone(expression).map_err(err)?;
        let every = body
            .strip_prefix("@every")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace));
        let recurrence = match every {
            Some(interval) => Recurrence::Every(parse_every(interval).map_err(err)?),
            None => {
                let schedules = normalize_cron(body)
                    .map_err(err)?
                    .iter()
                    .map(|six| Schedule::from_str(six).map_err(|e| err(e.to_string())))
                    .collect::<Result<Vec<_>, _>>()?;
                Recurrence::Cron(schedules)
            }
        };

        Ok(Self {
            expression: expression.to_string(),
            timezone,
            recurrence,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Earliest occurrence strictly after `t`, or `None` if the rule never fires again.
    pub fn next(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match &self.recurrence {
            Recurrence::Cron(schedules) => {
                let local = t.with_timezone(&self.timezone);
                schedules
                    .iter()
                    .filter_map(|s| s.after(&local).next())
                    .min()
                    .map(|next| next.with_timezone(&Utc))
            }
            Recurrence::Every(secs) => {
                let slot = t.timestamp().div_euclid(*secs).checked_add(1)?;
                DateTime::from_timestamp(slot.checked_mul(*secs)?, 0)
            }
        }
    }

    /// Whether a window of `duration` that started on this schedule covers `t`.
    ///
    /// The candidate start is the first occurrence after `t - duration`; the
    /// window is active when that start lies before `t`. When inactive, the
    /// returned start is simply the next occurrence after `t - duration`.
    pub fn active_at(&self, t: DateTime<Utc>, duration: Duration) -> (bool, Option<DateTime<Utc>>) {
        let lookback = chrono::Duration::from_std(duration)
            .ok()
            .and_then(|d| t.checked_sub_signed(d));
        let Some(from) = lookback else {
            return (false, self.next(t));
        };

        let start = self.next(from);
        (start.is_some_and(|s| s < t), start)
    }
}

/// Strip an optional `CRON_TZ=`/`TZ=` prefix; UTC when absent.
fn split_timezone(expression: &str) -> Result<(Tz, &str), String> {
    let trimmed = expression.trim();
    for prefix in TIMEZONE_PREFIXES {
        let Some(rest) = trimmed.strip_prefix(prefix) else {
            continue;
        };
        let (zone, body) = rest
            .split_once(char::is_whitespace)
            .ok_or_else(|| "missing schedule after timezone".to_string())?;
        let timezone = zone
            .parse::<Tz>()
            .map_err(|_| format!("unknown timezone '{zone}'"))?;
        return Ok((timezone, body.trim()));
    }
    Ok((Tz::UTC, trimmed))
}

/// Interval of `@every <duration>`, at least one second, sub-seconds dropped.
fn parse_every(interval: &str) -> Result<i64, String> {
    let interval = interval.trim();
    if interval.is_empty() {
        return Err("@every needs a duration".to_string());
    }
    let duration = parse_duration(interval).map_err(|e| e.to_string())?;
    if duration < Duration::from_secs(1) {
        return Err(format!("@every interval '{interval}' is shorter than 1s"));
    }
    i64::try_from(duration.as_secs()).map_err(|_| format!("@every interval '{interval}' is too large"))
}

fn is_unrestricted(field: &str) -> bool {
    field == "*" || field == "?"
}

/// Turn a 5-field expression or `@descriptor` into the 6-field form(s) `cron`
/// parses. Two forms come back when both day fields are restricted.
pub(crate) fn normalize_cron(expression: &str) -> Result<Vec<String>, String> {
    let trimmed = expression.trim();
    if trimmed.starts_with('@') {
        return DESCRIPTORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
            .map(|(_, six)| vec![six.to_string()])
            .ok_or_else(|| format!("unknown descriptor '{trimmed}'"));
    }

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    let [minute, hour, dom, month, dow] = fields[..] else {
        return Err(format!("expected 5 fields, got {}", fields.len()));
    };

    let weekdays = translate_weekdays(dow)?;
    if is_unrestricted(dom) || is_unrestricted(dow) {
        let dom = if is_unrestricted(dom) { "*" } else { dom };
        return Ok(vec![format!("0 {minute} {hour} {dom} {month} {weekdays}")]);
    }

    Ok(vec![
        format!("0 {minute} {hour} {dom} {month} *"),
        format!("0 {minute} {hour} * {month} {weekdays}"),
    ])
}

/// Rewrite a standard day-of-week field (0-7, Sunday = 0 or 7) as day names.
fn translate_weekdays(field: &str) -> Result<String, String> {
    if is_unrestricted(field) {
        return Ok("*".to_string());
    }

    let mut days = BTreeSet::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: usize = step
                    .parse()
                    .map_err(|_| format!("invalid weekday step in '{part}'"))?;
                if step == 0 {
                    return Err(format!("weekday step must be positive in '{part}'"));
                }
                (range, Some(step))
            }
            None => (part, None),
        };

        let (lo, hi) = if range == "*" {
            (0, 6)
        } else if let Some((a, b)) = range.split_once('-') {
            (weekday(a)?, weekday(b)?)
        } else {
            let day = weekday(range)?;
            // "3/2" means from Wednesday to the end of the week.
            if step.is_some() { (day, 6) } else { (day, day) }
        };
        if lo > hi {
            return Err(format!("weekday range '{range}' runs backwards"));
        }

        for day in (lo..=hi).step_by(step.unwrap_or(1)) {
            days.insert(day % 7);
        }
    }

    Ok(days
        .iter()
        .map(|&d| WEEKDAY_NAMES[d])
        .collect::<Vec<_>>()
        .join(","))
}

fn weekday(token: &str) -> Result<usize, String> {
    if let Ok(n) = token.parse::<usize>() {
        return if n <= 7 {
            Ok(n)
        } else {
            Err(format!("weekday {n} out of range 0-7"))
        };
    }
    WEEKDAY_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(token))
        .ok_or_else(|| format!("unknown weekday '{token}'"))
}
