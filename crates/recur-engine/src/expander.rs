//! Recurrence sets -- a start, an optional rule, RDATE additions and EXDATE exceptions.
//!
//! The rule's stream is merged with the additions, exceptions are removed, and
//! the result stays strictly increasing (RFC 5545 Section 3.8.5).

use std::iter::Peekable;
use std::slice;

use crate::error::Result;
use crate::parser;
use crate::rule::{RecurrenceRule, StreamOptions};
use crate::stream::Occurrences;
use crate::temporal::{ConversionHint, Temporal};

/// All occurrences of one recurring component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSet {
    start: Temporal,
    rule: Option<RecurrenceRule>,
    additions: Vec<Temporal>,
    exceptions: Vec<Temporal>,
    options: StreamOptions,
}

impl RecurrenceSet {
    /// An empty set anchored at `start`; attach a rule and RDATEs to fill it.
    pub fn new(start: Temporal) -> Self {
        Self {
            start,
            rule: None,
            additions: Vec::new(),
            exceptions: Vec::new(),
            options: StreamOptions::default(),
        }
    }

    pub fn start(&self) -> &Temporal {
        &self.start
    }

    pub fn rule(&self) -> Option<&RecurrenceRule> {
        self.rule.as_ref()
    }

    /// RDATE values, converted to the start's kind, sorted.
    pub fn additions(&self) -> &[Temporal] {
        &self.additions
    }

    /// EXDATE values, converted to the start's kind, sorted.
    pub fn exceptions(&self) -> &[Temporal] {
        &self.exceptions
    }

    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn with_options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }

    /// Add an RDATE.
    ///
    /// # Errors
    /// `RecurError::Conversion` when `value` cannot be expressed in the start's kind.
    pub fn add_addition(&mut self, value: &Temporal) -> Result<()> {
        let value = self.align(value)?;
        insert_sorted(&mut self.additions, value);
        Ok(())
    }

    /// Add an EXDATE.
    ///
    /// # Errors
    /// `RecurError::Conversion` when `value` cannot be expressed in the start's kind.
    pub fn add_exception(&mut self, value: &Temporal) -> Result<()> {
        let value = self.align(value)?;
        insert_sorted(&mut self.exceptions, value);
        Ok(())
    }

    pub fn with_additions<'a>(
        mut self,
        values: impl IntoIterator<Item = &'a Temporal>,
    ) -> Result<Self> {
        for value in values {
            self.add_addition(value)?;
        }
        Ok(self)
    }

    pub fn with_exceptions<'a>(
        mut self,
        values: impl IntoIterator<Item = &'a Temporal>,
    ) -> Result<Self> {
        for value in values {
            self.add_exception(value)?;
        }
        Ok(self)
    }

    /// Convert a foreign value into the start's kind, borrowing its zone and time of day.
    pub fn align(&self, value: &Temporal) -> Result<Temporal> {
        let hint =
            ConversionHint::zone(self.start.zone()).with_time_of_day(self.start.civil().time());
        Ok(value.convert(self.start.kind(), &hint)?)
    }

    /// Lazily merge the rule's occurrences with the additions, minus the exceptions.
    pub fn iter(&self) -> SetOccurrences<'_> {
        SetOccurrences {
            rule: self
                .rule
                .as_ref()
                .map(|rule| rule.stream_with(&self.start, self.options).peekable()),
            additions: self.additions.iter().peekable(),
            exceptions: &self.exceptions,
            last: None,
        }
    }

    /// Occurrences in the half-open range `[from, to)`.
    ///
    /// Pulling stops at `to`, so this is safe on unbounded rules.
    ///
    /// # Errors
    /// `RecurError::Conversion` when a bound cannot be expressed in the start's kind.
    pub fn between(&self, from: &Temporal, to: &Temporal) -> Result<Vec<Temporal>> {
        let from = self.align(from)?;
        let to = self.align(to)?;
        Ok(self
            .iter()
            .skip_while(|value| *value < from)
            .take_while(|value| *value < to)
            .collect())
    }
}

impl<'s> IntoIterator for &'s RecurrenceSet {
    type Item = Temporal;
    type IntoIter = SetOccurrences<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`RecurrenceSet::iter`].
#[derive(Debug, Clone)]
pub struct SetOccurrences<'s> {
    rule: Option<Peekable<Occurrences<'s>>>,
    additions: Peekable<slice::Iter<'s, Temporal>>,
    exceptions: &'s [Temporal],
    last: Option<Temporal>,
}

impl Iterator for SetOccurrences<'_> {
    type Item = Temporal;

    fn next(&mut self) -> Option<Temporal> {
        loop {
            let take_addition = match (
                self.rule.as_mut().and_then(|rule| rule.peek()),
                self.additions.peek(),
            ) {
                (None, None) => return None,
                (Some(_), None) => false,
                (None, Some(_)) => true,
                (Some(generated), Some(added)) => *added <= generated,
            };
            let value = if take_addition {
                self.additions.next().cloned()
            } else {
                self.rule.as_mut().and_then(Iterator::next)
            }?;

            if self.last.as_ref().is_some_and(|last| value <= *last) {
                continue;
            }
            if self.exceptions.binary_search(&value).is_ok() {
                continue;
            }
            self.last = Some(value.clone());
            return Some(value);
        }
    }
}

fn insert_sorted(values: &mut Vec<Temporal>, value: Temporal) {
    if let Err(at) = values.binary_search(&value) {
        values.insert(at, value);
    }
}

/// Expand an RRULE string into its first `limit` occurrences.
///
/// # Arguments
/// - `rrule` -- RRULE text (e.g., "FREQ=WEEKLY;BYDAY=TU,TH")
/// - `dtstart` -- start value (e.g., "2026-02-17T14:00:00" or "20260217T140000Z")
/// - `tzid` -- IANA timezone the start's wall-clock time is in, if any
/// - `limit` -- maximum number of occurrences returned
///
/// # Errors
/// Returns `RecurError::Parse` or `RecurError::Structural` if the rule or the start
/// cannot be read.
pub fn expand_rrule(
    rrule: &str,
    dtstart: &str,
    tzid: Option<&str>,
    limit: usize,
) -> Result<Vec<Temporal>> {
    expand_rrule_with_exdates(rrule, dtstart, tzid, limit, &[])
}

/// Expand an RRULE string, with EXDATE exclusions.
///
/// Identical to [`expand_rrule`] but drops every occurrence listed in `exdates`
/// (same format as `dtstart`, read in the same `tzid`). Excluded values do not
/// count towards `limit`.
///
/// # Errors
/// As [`expand_rrule`], plus `RecurError::Conversion` for an EXDATE that cannot be
/// compared with the start.
pub fn expand_rrule_with_exdates(
    rrule: &str,
    dtstart: &str,
    tzid: Option<&str>,
    limit: usize,
    exdates: &[&str],
) -> Result<Vec<Temporal>> {
    let rule = parser::parse(rrule)?;
    let start = Temporal::parse(dtstart, tzid)?;
    let exdates = exdates
        .iter()
        .map(|value| Temporal::parse(value, tzid))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let set = RecurrenceSet::new(start)
        .with_rule(rule)
        .with_exceptions(&exdates)?;
    Ok(set.iter().take(limit).collect())
}
