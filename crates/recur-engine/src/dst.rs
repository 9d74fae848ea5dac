//! DST transition policies for zoned occurrences.
//!
//! Occurrences are generated on the wall clock of the start's zone. A wall-clock
//! time that falls in a spring-forward gap has no instant of its own, so the
//! policy decides what the occurrence becomes. Fall-back (ambiguous) times always
//! resolve to the earlier instant.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Longest gap probed when shifting forward. Real-world gaps are an hour or less.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Policy for handling occurrences that fall during DST transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DstPolicy {
    /// Skip instances that fall in the DST gap (e.g., 2:30 AM during spring forward)
    Skip,
    /// Shift to the first valid wall-clock minute after the gap
    ShiftForward,
    /// Keep the UTC offset in force before the gap (RFC 5545 3.3.5), so 2:30 AM
    /// becomes 3:30 AM daylight time
    #[default]
    WallClock,
}

/// Attach `tz` to a wall-clock time, applying `policy` when the time does not exist.
///
/// Returns `None` only for [`DstPolicy::Skip`] inside a gap.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => first_valid_after(tz, local),
            DstPolicy::WallClock => {
                offset_before_gap(tz, local).or_else(|| first_valid_after(tz, local))
            }
        },
    }
}

fn offset_before_gap(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    let probe = tz
        .from_local_datetime(&local.checked_sub_signed(Duration::days(1))?)
        .earliest()?;
    let offset = probe.offset().fix().local_minus_utc();
    let utc = local.checked_sub_signed(Duration::seconds(i64::from(offset)))?;
    Some(tz.from_utc_datetime(&utc))
}

fn first_valid_after(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    let mut probe = local.with_second(0)?.with_nanosecond(0)?;
    for _ in 0..MAX_GAP_MINUTES {
        probe = probe.checked_add_signed(Duration::minutes(1))?;
        if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
            return Some(dt);
        }
    }
    None
}
