//! Temporal values and the conversions between their kinds.
//!
//! A recurrence is anchored on one of four flavours of date/time. Every
//! occurrence produced for a rule shares the kind of the rule's start value,
//! so foreign values (UNTIL, EXDATE, RDATE) are converted into that kind
//! before they are compared with generated occurrences.
//!
//! Text input uses the iCalendar basic format (`19970610T172345Z`). Dashes and
//! colons are stripped first, so ISO 8601 input like `2026-02-17T14:00:00` is
//! accepted as well.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::{self, DstPolicy};
use crate::error::{ConversionError, ParseError};

/// The date/time-zone flavour of a [`Temporal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalKind {
    /// Calendar date without a time (`VALUE=DATE`).
    Date,
    /// Floating wall-clock date-time, not bound to any zone.
    LocalDateTime,
    /// Date-time in UTC (`...Z`).
    UtcDateTime,
    /// Wall-clock date-time bound to an IANA zone (`TZID=...`).
    ZonedDateTime,
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalKind::Date => write!(f, "DATE"),
            TemporalKind::LocalDateTime => write!(f, "LOCAL DATE-TIME"),
            TemporalKind::UtcDateTime => write!(f, "UTC DATE-TIME"),
            TemporalKind::ZonedDateTime => write!(f, "ZONED DATE-TIME"),
        }
    }
}

/// A date or date-time value in one of the four [`TemporalKind`]s.
///
/// Values of the same kind are totally ordered on the timeline; zoned values
/// compare by instant, whatever their zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Temporal {
    Date(NaiveDate),
    Local(NaiveDateTime),
    Utc(DateTime<Utc>),
    Zoned(DateTime<Tz>),
}

/// Extra information needed when a conversion has to invent data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionHint {
    /// Zone to attach (or to view a UTC/zoned value in).
    pub zone: Option<Tz>,
    /// Time of day given to a DATE that becomes a date-time.
    pub time_of_day: Option<NaiveTime>,
}

impl ConversionHint {
    pub fn zone(zone: Option<Tz>) -> Self {
        Self {
            zone,
            time_of_day: None,
        }
    }

    pub fn with_time_of_day(mut self, time: NaiveTime) -> Self {
        self.time_of_day = Some(time);
        self
    }
}

impl Temporal {
    /// Parse a date or date-time token, binding floating times to `tzid` when given.
    ///
    /// - `YYYYMMDD` → [`Temporal::Date`]
    /// - `YYYYMMDDTHHMMSS` → [`Temporal::Local`], or [`Temporal::Zoned`] with a `tzid`
    /// - `YYYYMMDDTHHMMSSZ` → [`Temporal::Utc`]
    ///
    /// # Errors
    /// Returns `ParseError::InvalidTemporal` for malformed tokens and
    /// `ParseError::UnknownTimezone` when `tzid` is not an IANA identifier.
    pub fn parse(text: &str, tzid: Option<&str>) -> Result<Temporal, ParseError> {
        let zone = tzid.map(parse_zone).transpose()?;
        let invalid = || ParseError::InvalidTemporal(text.to_string());

        let compact: String = text
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | ':'))
            .collect::<String>()
            .to_ascii_uppercase();
        let (body, utc) = match compact.strip_suffix('Z') {
            Some(body) => (body, true),
            None => (compact.as_str(), false),
        };

        let (date_part, time_part) = match body.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (body, None),
        };
        let date = parse_date(date_part).ok_or_else(invalid)?;

        let Some(time_part) = time_part else {
            if utc {
                return Err(invalid());
            }
            return Ok(Temporal::Date(date));
        };
        let local = date.and_time(parse_time(time_part).ok_or_else(invalid)?);

        if utc {
            return Ok(Temporal::Utc(local.and_utc()));
        }
        match zone {
            Some(tz) => dst::resolve_local(&tz, local, DstPolicy::WallClock)
                .map(Temporal::Zoned)
                .ok_or_else(invalid),
            None => Ok(Temporal::Local(local)),
        }
    }

    pub fn kind(&self) -> TemporalKind {
        match self {
            Temporal::Date(_) => TemporalKind::Date,
            Temporal::Local(_) => TemporalKind::LocalDateTime,
            Temporal::Utc(_) => TemporalKind::UtcDateTime,
            Temporal::Zoned(_) => TemporalKind::ZonedDateTime,
        }
    }

    /// The zone of a zoned value.
    pub fn zone(&self) -> Option<Tz> {
        match self {
            Temporal::Zoned(dt) => Some(dt.timezone()),
            _ => None,
        }
    }

    /// Wall-clock reading of the value; dates read as midnight.
    pub fn civil(&self) -> NaiveDateTime {
        match self {
            Temporal::Date(d) => d.and_time(NaiveTime::MIN),
            Temporal::Local(dt) => *dt,
            Temporal::Utc(dt) => dt.naive_utc(),
            Temporal::Zoned(dt) => dt.naive_local(),
        }
    }

    /// Position on the timeline: the UTC reading for instants, the civil one otherwise.
    fn timeline_key(&self) -> NaiveDateTime {
        match self {
            Temporal::Utc(dt) => dt.naive_utc(),
            Temporal::Zoned(dt) => dt.naive_utc(),
            _ => self.civil(),
        }
    }

    /// Convert into `target`, using `hint` for whatever the source value lacks.
    ///
    /// # Errors
    /// - `ConversionError::MissingTimeOfDay` when a DATE must gain a time and the
    ///   hint carries none.
    /// - `ConversionError::MissingZone` when a floating value must become an
    ///   instant (or a zoned value) and no zone is known.
    pub fn convert(
        &self,
        target: TemporalKind,
        hint: &ConversionHint,
    ) -> Result<Temporal, ConversionError> {
        let time_of_day = || hint.time_of_day.ok_or(ConversionError::MissingTimeOfDay(target));
        let missing_zone = || ConversionError::MissingZone {
            from: self.kind(),
            to: target,
        };

        match target {
            TemporalKind::Date => Ok(Temporal::Date(match (self, hint.zone) {
                (Temporal::Date(d), _) => *d,
                (Temporal::Local(dt), _) => dt.date(),
                (Temporal::Utc(dt), Some(tz)) => dt.with_timezone(&tz).date_naive(),
                (Temporal::Utc(dt), None) => dt.date_naive(),
                (Temporal::Zoned(dt), Some(tz)) => dt.with_timezone(&tz).date_naive(),
                (Temporal::Zoned(dt), None) => dt.date_naive(),
            })),
            TemporalKind::LocalDateTime => Ok(Temporal::Local(match (self, hint.zone) {
                (Temporal::Date(d), _) => d.and_time(time_of_day()?),
                (Temporal::Local(dt), _) => *dt,
                (Temporal::Utc(dt), Some(tz)) => dt.with_timezone(&tz).naive_local(),
                (Temporal::Utc(dt), None) => dt.naive_utc(),
                (Temporal::Zoned(dt), Some(tz)) => dt.with_timezone(&tz).naive_local(),
                (Temporal::Zoned(dt), None) => dt.naive_local(),
            })),
            TemporalKind::UtcDateTime => Ok(Temporal::Utc(match self {
                Temporal::Date(d) => {
                    let local = d.and_time(time_of_day()?);
                    match hint.zone {
                        Some(tz) => attach(&tz, local)?.with_timezone(&Utc),
                        None => local.and_utc(),
                    }
                }
                Temporal::Local(dt) => {
                    let tz = hint.zone.ok_or_else(missing_zone)?;
                    attach(&tz, *dt)?.with_timezone(&Utc)
                }
                Temporal::Utc(dt) => *dt,
                Temporal::Zoned(dt) => dt.with_timezone(&Utc),
            })),
            TemporalKind::ZonedDateTime => {
                let tz = hint.zone.or_else(|| self.zone()).ok_or_else(missing_zone)?;
                Ok(Temporal::Zoned(match self {
                    Temporal::Date(d) => attach(&tz, d.and_time(time_of_day()?))?,
                    Temporal::Local(dt) => attach(&tz, *dt)?,
                    Temporal::Utc(dt) => dt.with_timezone(&tz),
                    Temporal::Zoned(dt) => dt.with_timezone(&tz),
                }))
            }
        }
    }

    /// Build a value of the same kind (and zone) as `self` from a wall-clock reading.
    ///
    /// Returns `None` when `policy` drops a time that does not exist in the zone.
    pub(crate) fn with_civil(&self, civil: NaiveDateTime, policy: DstPolicy) -> Option<Temporal> {
        match self {
            Temporal::Date(_) => Some(Temporal::Date(civil.date())),
            Temporal::Local(_) => Some(Temporal::Local(civil)),
            Temporal::Utc(_) => Some(Temporal::Utc(civil.and_utc())),
            Temporal::Zoned(dt) => {
                dst::resolve_local(&dt.timezone(), civil, policy).map(Temporal::Zoned)
            }
        }
    }

    /// iCalendar basic-format token, as used in UNTIL, EXDATE and RDATE values.
    pub fn to_ical(&self) -> String {
        match self {
            Temporal::Date(d) => d.format("%Y%m%d").to_string(),
            Temporal::Local(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
            Temporal::Utc(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
            Temporal::Zoned(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
        }
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporal::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Temporal::Local(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Temporal::Utc(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            Temporal::Zoned(dt) => write!(
                f,
                "{}[{}]",
                dt.format("%Y-%m-%dT%H:%M:%S%:z"),
                dt.timezone().name()
            ),
        }
    }
}

impl PartialOrd for Temporal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Temporal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timeline_key()
            .cmp(&other.timeline_key())
            .then_with(|| self.kind().cmp(&other.kind()))
    }
}

/// Parse an IANA timezone identifier.
pub fn parse_zone(tzid: &str) -> Result<Tz, ParseError> {
    tzid.trim()
        .parse()
        .map_err(|_| ParseError::UnknownTimezone(tzid.to_string()))
}

fn attach(tz: &Tz, local: NaiveDateTime) -> Result<DateTime<Tz>, ConversionError> {
    dst::resolve_local(tz, local, DstPolicy::WallClock).ok_or_else(|| {
        ConversionError::NonexistentLocalTime(local.to_string(), tz.name().to_string())
    })
}

fn digits(text: &str, range: std::ops::Range<usize>) -> Option<u32> {
    text.get(range)?.parse().ok()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = i32::try_from(digits(text, 0..4)?).ok()?;
    NaiveDate::from_ymd_opt(year, digits(text, 4..6)?, digits(text, 6..8)?)
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    if !matches!(text.len(), 4 | 6) || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let second = if text.len() == 6 { digits(text, 4..6)? } else { 0 };
    NaiveTime::from_hms_opt(digits(text, 0..2)?, digits(text, 2..4)?, second)
}
