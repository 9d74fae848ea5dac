//! The structured recurrence rule.

use chrono::Weekday;

use crate::byrule::{ByRule, ByRuleKind, WeekdayNum};
use crate::dst::DstPolicy;
use crate::error::{Result, StructuralViolation};
use crate::frequency::{Frequency, FrequencyStream};
use crate::stream::Occurrences;
use crate::temporal::{Temporal, TemporalKind};

/// Options applied while streaming occurrences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// How generated wall-clock times inside a DST gap are resolved.
    pub dst_policy: DstPolicy,
}

/// A parsed or programmatically built RRULE.
///
/// Every mutator enforces the structural invariants (FREQ support, INTERVAL ≥ 1,
/// COUNT and UNTIL exclusive, one BY-rule per kind), so a value of this type is
/// always streamable. Semantic problems that depend on the parent component
/// (e.g. UNTIL before DTSTART) are reported by [`RecurrenceRule::errors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: u32,
    count: i32,
    until: Option<Temporal>,
    by_rules: Vec<ByRule>,
    recurrence_overrides: Vec<Temporal>,
}

impl RecurrenceRule {
    /// A rule repeating every `frequency` period, without bound.
    ///
    /// # Errors
    /// `StructuralViolation::Unsupported` for HOURLY, MINUTELY and SECONDLY.
    pub fn new(frequency: Frequency) -> Result<Self> {
        if !frequency.is_supported() {
            return Err(StructuralViolation::Unsupported(frequency.name()).into());
        }
        Ok(Self {
            frequency,
            interval: 1,
            count: 0,
            until: None,
            by_rules: Vec::new(),
            recurrence_overrides: Vec::new(),
        })
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// COUNT, `0` when unset.
    pub fn count(&self) -> i32 {
        self.count
    }

    pub fn until(&self) -> Option<&Temporal> {
        self.until.as_ref()
    }

    /// BY-rules in pipeline order.
    pub fn by_rules(&self) -> &[ByRule] {
        &self.by_rules
    }

    pub fn by_rule(&self, kind: ByRuleKind) -> Option<&ByRule> {
        self.by_rules.iter().find(|rule| rule.kind() == kind)
    }

    pub fn recurrence_overrides(&self) -> &[Temporal] {
        &self.recurrence_overrides
    }

    /// Whether neither COUNT nor UNTIL bounds the rule.
    pub fn is_infinite(&self) -> bool {
        self.count == 0 && self.until.is_none()
    }

    pub fn set_interval(&mut self, interval: u32) -> Result<()> {
        if interval == 0 {
            return Err(StructuralViolation::InvalidInterval(interval).into());
        }
        self.interval = interval;
        Ok(())
    }

    /// Set COUNT. Negative values are accepted here and reported by validation.
    pub fn set_count(&mut self, count: i32) -> Result<()> {
        if self.until.is_some() {
            return Err(StructuralViolation::CountAndUntil.into());
        }
        self.count = count;
        Ok(())
    }

    pub fn set_until(&mut self, until: Temporal) -> Result<()> {
        if !matches!(
            until.kind(),
            TemporalKind::Date | TemporalKind::UtcDateTime
        ) {
            return Err(StructuralViolation::InvalidUntilKind(until.kind()).into());
        }
        if self.count != 0 {
            return Err(StructuralViolation::CountAndUntil.into());
        }
        self.until = Some(until);
        Ok(())
    }

    /// Attach a BY-rule, keeping the collection in pipeline order.
    pub fn add_by_rule(&mut self, by_rule: ByRule) -> Result<()> {
        let kind = by_rule.kind();
        if by_rule.is_empty() {
            return Err(StructuralViolation::EmptyByRule(kind.name()).into());
        }
        if self.by_rule(kind).is_some() {
            return Err(StructuralViolation::DuplicatePart(kind.name()).into());
        }
        let at = self
            .by_rules
            .partition_point(|rule| rule.kind().pipeline_position() < kind.pipeline_position());
        self.by_rules.insert(at, by_rule);
        Ok(())
    }

    /// Mark `value` as an instance materialized elsewhere; it is never generated.
    pub fn add_recurrence_override(&mut self, value: Temporal) {
        if !self.recurrence_overrides.contains(&value) {
            self.recurrence_overrides.push(value);
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Result<Self> {
        self.set_interval(interval)?;
        Ok(self)
    }

    pub fn with_count(mut self, count: i32) -> Result<Self> {
        self.set_count(count)?;
        Ok(self)
    }

    pub fn with_until(mut self, until: Temporal) -> Result<Self> {
        self.set_until(until)?;
        Ok(self)
    }

    pub fn with_by_rule(mut self, by_rule: ByRule) -> Result<Self> {
        self.add_by_rule(by_rule)?;
        Ok(self)
    }

    /// Shorthand for `with_by_rule(ByRule::Day(..))` with plain weekdays.
    pub fn on_weekdays(self, weekdays: &[Weekday]) -> Result<Self> {
        self.with_by_rule(ByRule::Day(
            weekdays.iter().copied().map(WeekdayNum::every).collect(),
        ))
    }

    pub fn with_recurrence_override(mut self, value: Temporal) -> Self {
        self.add_recurrence_override(value);
        self
    }

    /// Lazily generate the occurrences of this rule from `start`.
    ///
    /// Every value shares `start`'s kind. Calling this again restarts from scratch.
    pub fn stream(&self, start: &Temporal) -> Occurrences<'_> {
        self.stream_with(start, StreamOptions::default())
    }

    pub fn stream_with(&self, start: &Temporal, options: StreamOptions) -> Occurrences<'_> {
        Occurrences::new(self, start.clone(), options)
    }

    /// Every generated value, before overrides, COUNT or UNTIL are applied.
    pub fn frequency_stream(
        &self,
        start: &Temporal,
        options: StreamOptions,
    ) -> FrequencyStream<'_> {
        FrequencyStream::new(self, start.clone(), options.dst_policy)
    }
}
