//! # recur-engine
//!
//! RFC 5545 recurrence rules: parsing, canonical serialization and lazy
//! occurrence expansion.
//!
//! A rule is parsed from its `NAME=VALUE;...` text, then streamed from a start
//! value. Every occurrence has the start's kind (date, floating, UTC or zoned),
//! the sequence is strictly increasing, and it ends by COUNT, by UNTIL
//! (inclusive), or never. Unbounded sequences are safe to hold: nothing is
//! computed until it is pulled.
//!
//! ```
//! use recur_engine::{RecurrenceRule, Temporal};
//!
//! let rule: RecurrenceRule = "FREQ=DAILY;INTERVAL=3;COUNT=3".parse().unwrap();
//! let start = Temporal::parse("20151109T100000", None).unwrap();
//! let days: Vec<String> = rule.stream(&start).map(|t| t.to_string()).collect();
//! assert_eq!(
//!     days,
//!     ["2015-11-09T10:00:00", "2015-11-12T10:00:00", "2015-11-15T10:00:00"]
//! );
//! ```
//!
//! ## Modules
//!
//! - [`temporal`] — the four temporal kinds and conversions between them
//! - [`dst`] — DST gap policies for zoned occurrences
//! - [`byrule`] — BYxxx modifiers and the per-period pipeline
//! - [`frequency`] — FREQ values and the raw per-period stream
//! - [`rule`] — the structured rule and its builders
//! - [`parser`] — RRULE text ⇄ rule
//! - [`stream`] — COUNT / UNTIL / override handling
//! - [`validation`] — semantic checks against the owning component
//! - [`expander`] — recurrence sets (RDATE / EXDATE) and one-shot expansion
//! - [`error`] — Error types

pub mod byrule;
pub mod dst;
pub mod error;
pub mod expander;
pub mod frequency;
pub mod parser;
pub mod rule;
pub mod stream;
pub mod temporal;
pub mod validation;

pub use byrule::{ByRule, ByRuleKind, WeekdayNum};
pub use dst::DstPolicy;
pub use error::{ConversionError, ParseError, RecurError, SemanticViolation, StructuralViolation};
pub use expander::{expand_rrule, expand_rrule_with_exdates, RecurrenceSet};
pub use frequency::Frequency;
pub use parser::{parse, serialize};
pub use rule::{RecurrenceRule, StreamOptions};
pub use stream::Occurrences;
pub use temporal::{ConversionHint, Temporal, TemporalKind};
pub use validation::ParentContext;
