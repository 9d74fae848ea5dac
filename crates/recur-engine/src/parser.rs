//! RRULE text ⇄ [`RecurrenceRule`].
//!
//! ```text
//! FREQ=MONTHLY;INTERVAL=2;BYDAY=-1FR;COUNT=6
//! ```
//!
//! Parsing is lenient about layout (an `RRULE:` prefix, whitespace, empty parts,
//! lower case) but strict about content: malformed literals are
//! [`ParseError`]s and shape problems are [`StructuralViolation`]s. Unknown part
//! names are skipped. Serialization is canonical: FREQ, INTERVAL (when > 1),
//! COUNT or UNTIL, then BY-rules in pipeline order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use tracing::debug;

use crate::byrule::{weekday_from_code, ByRule, ByRuleKind, WeekdayNum};
use crate::error::{ParseError, RecurError, Result, StructuralViolation};
use crate::frequency::Frequency;
use crate::rule::RecurrenceRule;
use crate::temporal::Temporal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Part {
    Freq,
    Interval,
    Count,
    Until,
    WeekStart,
    By(ByRuleKind),
}

impl Part {
    fn name(self) -> &'static str {
        match self {
            Part::Freq => "FREQ",
            Part::Interval => "INTERVAL",
            Part::Count => "COUNT",
            Part::Until => "UNTIL",
            Part::WeekStart => "WKST",
            Part::By(kind) => kind.name(),
        }
    }
}

static PARTS: LazyLock<HashMap<&'static str, Part>> = LazyLock::new(|| {
    [Part::Freq, Part::Interval, Part::Count, Part::Until, Part::WeekStart]
        .into_iter()
        .chain(ByRuleKind::PIPELINE.into_iter().map(Part::By))
        .map(|part| (part.name(), part))
        .collect()
});

/// Accepted magnitudes for a numeric rule value.
struct Bounds {
    min: i64,
    max: i64,
    /// Whether the negated range is accepted too.
    signed: bool,
    text: &'static str,
}

impl Bounds {
    const fn unsigned(min: i64, max: i64, text: &'static str) -> Self {
        Self {
            min,
            max,
            signed: false,
            text,
        }
    }

    const fn signed(max: i64, text: &'static str) -> Self {
        Self {
            min: 1,
            max,
            signed: true,
            text,
        }
    }

    fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
            || (self.signed && (-self.max..=-self.min).contains(&value))
    }
}

const MONTHS: Bounds = Bounds::unsigned(1, 12, "1..=12");
const WEEK_NUMBERS: Bounds = Bounds::signed(53, "±1..=53");
const YEAR_DAYS: Bounds = Bounds::signed(366, "±1..=366");
const MONTH_DAYS: Bounds = Bounds::signed(31, "±1..=31");
const WEEKDAY_ORDINALS: Bounds = Bounds::signed(53, "±1..=53");
const HOURS: Bounds = Bounds::unsigned(0, 23, "0..=23");
const MINUTES: Bounds = Bounds::unsigned(0, 59, "0..=59");
const SECONDS: Bounds = Bounds::unsigned(0, 60, "0..=60");
const SET_POSITIONS: Bounds = Bounds::signed(366, "±1..=366");

/// Parse RRULE text into a rule.
///
/// # Errors
/// - `ParseError` for malformed parts and literals.
/// - `StructuralViolation` for a missing, unknown or unsupported FREQ, repeated
///   parts, COUNT together with UNTIL, INTERVAL=0 and WKST.
pub fn parse(text: &str) -> Result<RecurrenceRule> {
    let body = text.trim();
    let body = match body.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &body[6..],
        _ => body,
    };

    let mut parts: Vec<(Part, &str)> = Vec::new();
    let mut seen = HashSet::new();
    for raw in body.split(';').map(str::trim).filter(|raw| !raw.is_empty()) {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| ParseError::MalformedPart(raw.to_string()))?;
        let name = name.trim().to_ascii_uppercase();
        let Some(part) = PARTS.get(name.as_str()).copied() else {
            debug!(part = %name, "ignoring unknown rule part");
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(ParseError::EmptyValue(part.name()).into());
        }
        if !seen.insert(part) {
            return Err(StructuralViolation::DuplicatePart(part.name()).into());
        }
        parts.push((part, value));
    }

    let frequency = parts
        .iter()
        .find(|(part, _)| *part == Part::Freq)
        .map(|(_, value)| value.parse::<Frequency>())
        .ok_or(StructuralViolation::MissingFrequency)??;
    let mut rule = RecurrenceRule::new(frequency)?;

    for (part, value) in parts {
        match part {
            Part::Freq => {}
            Part::Interval => {
                let interval = parse_integer(part.name(), value)?;
                let interval = u32::try_from(interval).map_err(|_| ParseError::OutOfRange {
                    name: "INTERVAL",
                    value: interval,
                    range: "1..",
                })?;
                rule.set_interval(interval)?;
            }
            Part::Count => {
                let count = parse_integer(part.name(), value)?;
                let count = i32::try_from(count).map_err(|_| ParseError::OutOfRange {
                    name: "COUNT",
                    value: count,
                    range: "0..",
                })?;
                rule.set_count(count)?;
            }
            Part::Until => rule.set_until(Temporal::parse(value, None)?)?,
            Part::WeekStart => return Err(StructuralViolation::Unsupported("WKST").into()),
            Part::By(kind) => rule.add_by_rule(parse_by_rule(kind, value)?)?,
        }
    }

    debug!(rule = %rule, "parsed recurrence rule");
    Ok(rule)
}

/// Canonical RRULE text for `rule` (without an `RRULE:` prefix).
///
/// Parts appear as FREQ, INTERVAL, then COUNT or UNTIL, then the BY-rules in
/// pipeline order. Defaults are left out: `INTERVAL=1` and `COUNT=0` (the unset
/// count) are never emitted, so `FREQ=DAILY;COUNT=0` serializes as `FREQ=DAILY`.
pub fn serialize(rule: &RecurrenceRule) -> String {
    let mut parts = vec![format!("FREQ={}", rule.frequency())];
    if rule.interval() > 1 {
        parts.push(format!("INTERVAL={}", rule.interval()));
    }
    if rule.count() != 0 {
        parts.push(format!("COUNT={}", rule.count()));
    } else if let Some(until) = rule.until() {
        parts.push(format!("UNTIL={}", until.to_ical()));
    }
    parts.extend(rule.by_rules().iter().map(ToString::to_string));
    parts.join(";")
}

impl FromStr for RecurrenceRule {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

fn parse_by_rule(kind: ByRuleKind, value: &str) -> std::result::Result<ByRule, ParseError> {
    let name = kind.name();
    Ok(match kind {
        ByRuleKind::Month => ByRule::Month(parse_list(name, value, &MONTHS)?),
        ByRuleKind::WeekNo => ByRule::WeekNo(parse_list(name, value, &WEEK_NUMBERS)?),
        ByRuleKind::YearDay => ByRule::YearDay(parse_list(name, value, &YEAR_DAYS)?),
        ByRuleKind::MonthDay => ByRule::MonthDay(parse_list(name, value, &MONTH_DAYS)?),
        ByRuleKind::Day => ByRule::Day(
            value
                .split(',')
                .map(|token| parse_weekday_num(token.trim()))
                .collect::<std::result::Result<_, _>>()?,
        ),
        ByRuleKind::Hour => ByRule::Hour(parse_list(name, value, &HOURS)?),
        ByRuleKind::Minute => ByRule::Minute(parse_list(name, value, &MINUTES)?),
        ByRuleKind::Second => ByRule::Second(parse_list(name, value, &SECONDS)?),
        ByRuleKind::SetPos => ByRule::SetPos(parse_list(name, value, &SET_POSITIONS)?),
    })
}

fn parse_integer(name: &'static str, token: &str) -> std::result::Result<i64, ParseError> {
    let digits = token.strip_prefix('+').unwrap_or(token);
    digits.parse().map_err(|_| ParseError::InvalidInteger {
        name,
        value: token.to_string(),
    })
}

fn parse_bounded<T: TryFrom<i64>>(
    name: &'static str,
    token: &str,
    bounds: &Bounds,
) -> std::result::Result<T, ParseError> {
    let value = parse_integer(name, token)?;
    let out_of_range = || ParseError::OutOfRange {
        name,
        value,
        range: bounds.text,
    };
    if !bounds.contains(value) {
        return Err(out_of_range());
    }
    T::try_from(value).map_err(|_| out_of_range())
}

fn parse_list<T: TryFrom<i64>>(
    name: &'static str,
    value: &str,
    bounds: &Bounds,
) -> std::result::Result<Vec<T>, ParseError> {
    value
        .split(',')
        .map(|token| parse_bounded(name, token.trim(), bounds))
        .collect()
}

fn parse_weekday_num(token: &str) -> std::result::Result<WeekdayNum, ParseError> {
    let invalid = || ParseError::InvalidWeekday(token.to_string());
    let split = token.len().checked_sub(2).ok_or_else(invalid)?;
    let (ordinal, code) = match (token.get(..split), token.get(split..)) {
        (Some(ordinal), Some(code)) => (ordinal, code),
        _ => return Err(invalid()),
    };
    let weekday = weekday_from_code(code).ok_or_else(invalid)?;
    if ordinal.is_empty() {
        return Ok(WeekdayNum::every(weekday));
    }
    Ok(WeekdayNum::nth(
        parse_bounded("BYDAY", ordinal, &WEEKDAY_ORDINALS)?,
        weekday,
    ))
}
