//! FREQ values and the raw per-period stream they drive.
//!
//! A [`FrequencyStream`] walks the rule's periods (`INTERVAL` units apart, from
//! the period holding the start), pushes each period through the BY-rule
//! pipeline and yields the surviving candidates in order. It knows nothing about
//! COUNT, UNTIL or overrides; that is [`crate::stream::Occurrences`]' job.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::byrule::{ByRuleKind, Candidates, Granularity, Period};
use crate::dst::DstPolicy;
use crate::error::StructuralViolation;
use crate::rule::RecurrenceRule;
use crate::temporal::Temporal;

/// Base repetition unit of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    /// Recognized but unsupported.
    Hourly,
    /// Recognized but unsupported.
    Minutely,
    /// Recognized but unsupported.
    Secondly,
}

impl Frequency {
    pub const ALL: [Frequency; 7] = [
        Frequency::Yearly,
        Frequency::Monthly,
        Frequency::Weekly,
        Frequency::Daily,
        Frequency::Hourly,
        Frequency::Minutely,
        Frequency::Secondly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Frequency::Yearly => "YEARLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Daily => "DAILY",
            Frequency::Hourly => "HOURLY",
            Frequency::Minutely => "MINUTELY",
            Frequency::Secondly => "SECONDLY",
        }
    }

    /// Case-insensitive lookup of a FREQ value.
    pub fn from_name(name: &str) -> Option<Frequency> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|freq| freq.name().eq_ignore_ascii_case(name))
    }

    /// Whether occurrences can be generated for this frequency.
    pub fn is_supported(self) -> bool {
        self.granularity().is_some()
    }

    fn granularity(self) -> Option<Granularity> {
        match self {
            Frequency::Yearly => Some(Granularity::Year),
            Frequency::Monthly => Some(Granularity::Month),
            Frequency::Weekly => Some(Granularity::Week),
            Frequency::Daily => Some(Granularity::Day),
            Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => None,
        }
    }

    /// Number of periods spanning one full Gregorian cycle (400 years).
    fn periods_per_cycle(self) -> u32 {
        match self {
            Frequency::Yearly => 400,
            Frequency::Monthly => 400 * 12,
            Frequency::Weekly => 146_097 / 7,
            _ => 146_097,
        }
    }

    /// First day of the `index`-th period, `interval` units apart from `origin`'s period.
    fn period_anchor(self, origin: NaiveDate, interval: u32, index: i64) -> Option<NaiveDate> {
        let step = index.checked_mul(i64::from(interval))?;
        match self {
            Frequency::Daily => origin.checked_add_signed(Duration::try_days(step)?),
            Frequency::Weekly => {
                let monday = origin.checked_sub_signed(Duration::try_days(i64::from(
                    origin.weekday().num_days_from_monday(),
                ))?)?;
                monday.checked_add_signed(Duration::try_weeks(step)?)
            }
            Frequency::Monthly => {
                let months = i64::from(origin.year()) * 12 + i64::from(origin.month0()) + step;
                let year = i32::try_from(months.div_euclid(12)).ok()?;
                let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;
                NaiveDate::from_ymd_opt(year, month, 1)
            }
            Frequency::Yearly => {
                let year = i32::try_from(i64::from(origin.year()) + step).ok()?;
                NaiveDate::from_ymd_opt(year, 1, 1)
            }
            Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Frequency {
    type Err = StructuralViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::from_name(s).ok_or_else(|| StructuralViolation::UnknownFrequency(s.to_string()))
    }
}

/// Unbounded, strictly increasing sequence of every value a rule generates from `start`.
///
/// Cloning the stream forks it; each clone continues independently.
#[derive(Debug, Clone)]
pub struct FrequencyStream<'r> {
    rule: &'r RecurrenceRule,
    start: Temporal,
    origin: NaiveDateTime,
    policy: DstPolicy,
    next_period: i64,
    barren_periods: u32,
    pending: VecDeque<Temporal>,
    last: Option<Temporal>,
    exhausted: bool,
}

impl<'r> FrequencyStream<'r> {
    pub fn new(rule: &'r RecurrenceRule, start: Temporal, policy: DstPolicy) -> Self {
        let origin = start.civil();
        Self {
            rule,
            start,
            origin,
            policy,
            next_period: 0,
            barren_periods: 0,
            pending: VecDeque::new(),
            last: None,
            exhausted: !rule.frequency().is_supported(),
        }
    }

    /// The value the stream was started from.
    pub fn start(&self) -> &Temporal {
        &self.start
    }

    fn expand_next_period(&mut self) {
        let frequency = self.rule.frequency();
        let Some(granularity) = frequency.granularity() else {
            self.exhausted = true;
            return;
        };
        let Some(anchor) =
            frequency.period_anchor(self.origin.date(), self.rule.interval(), self.next_period)
        else {
            warn!(
                period = self.next_period,
                "recurrence left the representable date range"
            );
            self.exhausted = true;
            return;
        };
        self.next_period += 1;

        let period = Period {
            frequency,
            anchor,
            start: self.origin,
            by_month: self.rule.by_rule(ByRuleKind::Month).is_some(),
            by_day: self.rule.by_rule(ByRuleKind::Day).is_some(),
        };
        let candidates = self
            .rule
            .by_rules()
            .iter()
            .fold(
                Candidates::seed(granularity, anchor.and_time(self.origin.time())),
                |candidates, by_rule| by_rule.apply(candidates, &period),
            )
            .finish(&period);

        let before = self.pending.len();
        for civil in candidates.into_iter().filter(|civil| *civil >= self.origin) {
            let Some(value) = self.start.with_civil(civil, self.policy) else {
                continue;
            };
            if self.last.as_ref().is_some_and(|last| value <= *last) {
                continue;
            }
            self.last = Some(value.clone());
            self.pending.push_back(value);
        }
        let produced = self.pending.len() - before;
        trace!(period = %anchor, count = produced, "expanded period");

        if produced == 0 {
            self.barren_periods += 1;
            if self.barren_periods >= frequency.periods_per_cycle() {
                warn!(
                    rule = %self.rule,
                    "no occurrence in a full 400-year cycle, ending recurrence"
                );
                self.exhausted = true;
            }
        } else {
            self.barren_periods = 0;
        }
    }
}

impl Iterator for FrequencyStream<'_> {
    type Item = Temporal;

    fn next(&mut self) -> Option<Temporal> {
        loop {
            if let Some(value) = self.pending.pop_front() {
                return Some(value);
            }
            if self.exhausted {
                return None;
            }
            self.expand_next_period();
        }
    }
}
