//! Error types for recur-engine operations.
//!
//! Parse and structural failures abort rule creation and surface through
//! [`RecurError`]. Semantic violations never abort anything; they are collected
//! by [`crate::validation`] and reported as a list.

use serde::Serialize;
use thiserror::Error;

use crate::temporal::TemporalKind;

/// A literal inside the rule text could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed rule part '{0}': expected NAME=VALUE")]
    MalformedPart(String),

    #[error("{0} has an empty value")]
    EmptyValue(&'static str),

    #[error("Invalid integer for {name}: '{value}'")]
    InvalidInteger { name: &'static str, value: String },

    #[error("{name} value {value} is out of range ({range})")]
    OutOfRange {
        name: &'static str,
        value: i64,
        range: &'static str,
    },

    #[error("Invalid weekday: '{0}'")]
    InvalidWeekday(String),

    #[error("Invalid date or date-time: '{0}'")]
    InvalidTemporal(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// The rule text (or a builder call) breaks the shape of a recurrence rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralViolation {
    #[error("{0} can only appear once in a recurrence rule")]
    DuplicatePart(&'static str),

    #[error("FREQ is required")]
    MissingFrequency,

    #[error("Unrecognized FREQ value: '{0}'")]
    UnknownFrequency(String),

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("COUNT can't be set while UNTIL has a value (and vice versa)")]
    CountAndUntil,

    #[error("INTERVAL can't be less than 1 ({0})")]
    InvalidInterval(u32),

    #[error("UNTIL must be a DATE or a UTC DATE-TIME, not a {0}")]
    InvalidUntilKind(TemporalKind),

    #[error("{0} needs at least one value")]
    EmptyByRule(&'static str),
}

/// A rule that exists but does not make sense against its parent component.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticViolation {
    #[error("Invalid RRULE. UNTIL ({until}) can not come before DTSTART ({start})")]
    UntilBeforeStart { until: String, start: String },

    #[error("Invalid RRULE. UNTIL ({until}) can not be compared with DTSTART: {reason}")]
    UntilNotComparable { until: String, reason: String },

    #[error("Invalid RRULE. COUNT must not be less than 0 ({count})")]
    NegativeCount { count: i32 },

    #[error(
        "Invalid RRULE. Recurrence ({value}, {found}) must have the same kind as DTSTART ({expected})"
    )]
    OverrideKindMismatch {
        value: String,
        found: TemporalKind,
        expected: TemporalKind,
    },

    #[error("Invalid RRULE. BYSETPOS must be combined with another BYxxx rule")]
    LoneSetPosition,
}

/// A temporal value could not be converted to the requested kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Converting a {from} to a {to} requires a timezone")]
    MissingZone {
        from: TemporalKind,
        to: TemporalKind,
    },

    #[error("Converting a DATE to a {0} requires a default time of day")]
    MissingTimeOfDay(TemporalKind),

    #[error("Local time {0} does not exist in {1}")]
    NonexistentLocalTime(String, String),
}

/// Fail-fast errors raised while building a rule or reading temporal input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Structural(#[from] StructuralViolation),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

pub type Result<T> = std::result::Result<T, RecurError>;
