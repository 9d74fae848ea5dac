//! The consumer-facing occurrence sequence of a rule.
//!
//! [`Occurrences`] wraps the raw [`FrequencyStream`], removes recurrence
//! overrides, then applies exactly one termination mode: COUNT when it is
//! positive, otherwise UNTIL (inclusive), otherwise none.

use chrono::NaiveTime;
use tracing::debug;

use crate::frequency::FrequencyStream;
use crate::rule::{RecurrenceRule, StreamOptions};
use crate::temporal::{ConversionHint, Temporal};

/// Hint used to bring UNTIL into the kind of `start`. A date-valued UNTIL
/// against a timed start covers the whole day.
pub(crate) fn until_hint(start: &Temporal) -> ConversionHint {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    ConversionHint::zone(start.zone()).with_time_of_day(end_of_day)
}

#[derive(Debug, Clone)]
enum Bound {
    Count(u32),
    Until(Temporal),
    Unbounded,
}

/// Lazy occurrence sequence returned by [`RecurrenceRule::stream`].
#[derive(Debug, Clone)]
pub struct Occurrences<'r> {
    inner: FrequencyStream<'r>,
    overrides: &'r [Temporal],
    bound: Bound,
    done: bool,
}

impl<'r> Occurrences<'r> {
    pub(crate) fn new(rule: &'r RecurrenceRule, start: Temporal, options: StreamOptions) -> Self {
        let bound = if rule.count() > 0 {
            Bound::Count(rule.count().unsigned_abs())
        } else if let Some(until) = rule.until() {
            match until.convert(start.kind(), &until_hint(&start)) {
                Ok(limit) => Bound::Until(limit),
                Err(error) => {
                    debug!(%error, until = %until, "comparing UNTIL by wall-clock reading");
                    start
                        .with_civil(until.civil(), options.dst_policy)
                        .map_or(Bound::Unbounded, Bound::Until)
                }
            }
        } else {
            Bound::Unbounded
        };
        debug!(rule = %rule, start = %start, ?bound, "streaming occurrences");

        Self {
            inner: FrequencyStream::new(rule, start, options.dst_policy),
            overrides: rule.recurrence_overrides(),
            bound,
            done: false,
        }
    }

    /// The UNTIL value after conversion to the start's kind, if the stream is bounded by one.
    pub fn until_bound(&self) -> Option<&Temporal> {
        match &self.bound {
            Bound::Until(limit) => Some(limit),
            _ => None,
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Temporal;

    fn next(&mut self) -> Option<Temporal> {
        if self.done {
            return None;
        }
        loop {
            if let Bound::Count(0) = self.bound {
                self.done = true;
                return None;
            }
            let Some(value) = self.inner.next() else {
                self.done = true;
                return None;
            };
            if self.overrides.contains(&value) {
                continue;
            }
            match &mut self.bound {
                Bound::Count(remaining) => *remaining -= 1,
                Bound::Until(limit) if value > *limit => {
                    self.done = true;
                    return None;
                }
                _ => {}
            }
            return Some(value);
        }
    }
}
