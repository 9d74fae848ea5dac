//! BYxxx rule parts -- the modifiers that expand or narrow the candidates of one period.
//!
//! Each period starts as a single coarse candidate (a whole year, month, week or
//! day, depending on FREQ). Rules are applied in the fixed order of
//! [`ByRuleKind::PIPELINE`]. A rule whose unit is finer than the current
//! granularity *expands* every candidate into its member values; otherwise it
//! *limits* the candidates to members. A limit that can only be judged on single
//! days (e.g. BYMONTH against a week) is deferred until the candidates reach day
//! granularity.
//!
//! When a coarse candidate has to become a day without a rule saying which one,
//! it takes its day from the rule's start: same month and day for a year, same
//! day of month for a month, same weekday for a week. Days that don't exist
//! (February 30th) are dropped.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::frequency::Frequency;

/// The nine BYxxx selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ByRuleKind {
    #[serde(rename = "BYMONTH")]
    Month,
    #[serde(rename = "BYWEEKNO")]
    WeekNo,
    #[serde(rename = "BYYEARDAY")]
    YearDay,
    #[serde(rename = "BYMONTHDAY")]
    MonthDay,
    #[serde(rename = "BYDAY")]
    Day,
    #[serde(rename = "BYHOUR")]
    Hour,
    #[serde(rename = "BYMINUTE")]
    Minute,
    #[serde(rename = "BYSECOND")]
    Second,
    #[serde(rename = "BYSETPOS")]
    SetPos,
}

impl ByRuleKind {
    /// Evaluation order of the pipeline (RFC 5545 3.3.10). BYSETPOS is always last.
    pub const PIPELINE: [ByRuleKind; 9] = [
        ByRuleKind::Month,
        ByRuleKind::WeekNo,
        ByRuleKind::YearDay,
        ByRuleKind::MonthDay,
        ByRuleKind::Day,
        ByRuleKind::Hour,
        ByRuleKind::Minute,
        ByRuleKind::Second,
        ByRuleKind::SetPos,
    ];

    /// Index of this kind in [`ByRuleKind::PIPELINE`].
    pub fn pipeline_position(self) -> usize {
        match self {
            ByRuleKind::Month => 0,
            ByRuleKind::WeekNo => 1,
            ByRuleKind::YearDay => 2,
            ByRuleKind::MonthDay => 3,
            ByRuleKind::Day => 4,
            ByRuleKind::Hour => 5,
            ByRuleKind::Minute => 6,
            ByRuleKind::Second => 7,
            ByRuleKind::SetPos => 8,
        }
    }

    /// Rule part name as it appears in RRULE text.
    pub fn name(self) -> &'static str {
        match self {
            ByRuleKind::Month => "BYMONTH",
            ByRuleKind::WeekNo => "BYWEEKNO",
            ByRuleKind::YearDay => "BYYEARDAY",
            ByRuleKind::MonthDay => "BYMONTHDAY",
            ByRuleKind::Day => "BYDAY",
            ByRuleKind::Hour => "BYHOUR",
            ByRuleKind::Minute => "BYMINUTE",
            ByRuleKind::Second => "BYSECOND",
            ByRuleKind::SetPos => "BYSETPOS",
        }
    }
}

impl fmt::Display for ByRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A BYDAY entry: a weekday, optionally restricted to its Nth occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayNum {
    /// 1-based occurrence within the period; negative counts from the end.
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Every `weekday` in the period.
    pub fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// Only the `ordinal`-th `weekday` in the period (`-1` = last).
    pub fn nth(ordinal: i8, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        f.write_str(weekday_code(self.weekday))
    }
}

/// Two-letter iCalendar code for a weekday.
pub fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Inverse of [`weekday_code`], case-insensitive.
pub fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code.to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

/// One BYxxx rule part and its values, in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByRule {
    /// Months of the year, 1..=12.
    Month(Vec<u8>),
    /// ISO week numbers, ±1..=53.
    WeekNo(Vec<i8>),
    /// Days of the year, ±1..=366.
    YearDay(Vec<i16>),
    /// Days of the month, ±1..=31.
    MonthDay(Vec<i8>),
    Day(Vec<WeekdayNum>),
    Hour(Vec<u8>),
    Minute(Vec<u8>),
    Second(Vec<u8>),
    /// 1-based positions within the period's final candidate set, ±1..=366.
    SetPos(Vec<i16>),
}

/// Coarseness of a period's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Granularity {
    Day,
    Week,
    Month,
    Year,
}

/// What a BY-rule needs to know about the period being expanded.
#[derive(Debug, Clone, Copy)]
pub struct Period {
    pub frequency: Frequency,
    /// First day of the period's unit.
    pub anchor: NaiveDate,
    /// Wall-clock reading of the rule's start.
    pub start: NaiveDateTime,
    /// Whether the rule carries BYMONTH (scopes BYDAY ordinals to the month).
    pub by_month: bool,
    /// Whether the rule carries BYDAY. Without it, week numbers pick the start's weekday.
    pub by_day: bool,
}

/// Candidate set for one period, threaded through the BY-rule pipeline.
///
/// Coarse items hold the first day of their unit plus the start's time of day.
#[derive(Debug, Clone)]
pub struct Candidates<'r> {
    granularity: Granularity,
    items: Vec<NaiveDateTime>,
    deferred: Vec<&'r ByRule>,
}

impl<'r> Candidates<'r> {
    /// A single candidate standing for the whole unit that starts at `item`.
    pub fn seed(granularity: Granularity, item: NaiveDateTime) -> Self {
        Self {
            granularity,
            items: vec![item],
            deferred: Vec::new(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn items(&self) -> &[NaiveDateTime] {
        &self.items
    }

    /// Resolve to single days and return them sorted and de-duplicated.
    pub fn finish(self, period: &Period) -> Vec<NaiveDateTime> {
        let mut items = self.into_days(period).items;
        items.sort_unstable();
        items.dedup();
        items
    }

    fn refine(
        mut self,
        granularity: Granularity,
        items: Vec<NaiveDateTime>,
        period: &Period,
    ) -> Self {
        self.granularity = granularity;
        self.items = items;
        if granularity == Granularity::Day && !self.deferred.is_empty() {
            let deferred = std::mem::take(&mut self.deferred);
            self.items
                .retain(|dt| deferred.iter().all(|rule| rule.matches(*dt, period)));
        }
        self
    }

    fn limit(mut self, rule: &'r ByRule, period: &Period) -> Self {
        if self.granularity == Granularity::Day {
            self.items.retain(|dt| rule.matches(*dt, period));
        } else {
            self.deferred.push(rule);
        }
        self
    }

    fn into_days(self, period: &Period) -> Self {
        if self.granularity == Granularity::Day {
            return self;
        }
        let granularity = self.granularity;
        let start = period.start;
        let items = self
            .items
            .iter()
            .filter_map(|item| settle_day(*item, granularity, start))
            .collect();
        self.refine(Granularity::Day, items, period)
    }

    /// Replace every coarse candidate by the days of its unit that `keep` accepts.
    fn expand_days(self, period: &Period, keep: impl Fn(NaiveDateTime) -> bool) -> Self {
        let granularity = self.granularity;
        let keep = &keep;
        let items = self
            .items
            .iter()
            .flat_map(|item| {
                let (first, last) = unit_span(item.date(), granularity);
                first
                    .iter_days()
                    .take_while(move |day| *day <= last)
                    .map(move |day| day.and_time(item.time()))
                    .filter(move |dt| keep(*dt))
            })
            .collect();
        self.refine(Granularity::Day, items, period)
    }

    fn expand_time(
        self,
        values: &[u8],
        period: &Period,
        set: impl Fn(NaiveDateTime, u32) -> Option<NaiveDateTime>,
    ) -> Self {
        let days = self.into_days(period);
        let items = days
            .items
            .iter()
            .flat_map(|dt| values.iter().filter_map(|v| set(*dt, u32::from(*v))))
            .collect();
        days.refine(Granularity::Day, items, period)
    }
}

impl ByRule {
    pub fn kind(&self) -> ByRuleKind {
        match self {
            ByRule::Month(_) => ByRuleKind::Month,
            ByRule::WeekNo(_) => ByRuleKind::WeekNo,
            ByRule::YearDay(_) => ByRuleKind::YearDay,
            ByRule::MonthDay(_) => ByRuleKind::MonthDay,
            ByRule::Day(_) => ByRuleKind::Day,
            ByRule::Hour(_) => ByRuleKind::Hour,
            ByRule::Minute(_) => ByRuleKind::Minute,
            ByRule::Second(_) => ByRuleKind::Second,
            ByRule::SetPos(_) => ByRuleKind::SetPos,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ByRule::Month(v) | ByRule::Hour(v) | ByRule::Minute(v) | ByRule::Second(v) => {
                v.is_empty()
            }
            ByRule::WeekNo(v) | ByRule::MonthDay(v) => v.is_empty(),
            ByRule::YearDay(v) | ByRule::SetPos(v) => v.is_empty(),
            ByRule::Day(v) => v.is_empty(),
        }
    }

    /// Transform one period's candidates.
    pub fn apply<'r>(&'r self, candidates: Candidates<'r>, period: &Period) -> Candidates<'r> {
        let granularity = candidates.granularity;
        match self {
            ByRule::Month(months) if granularity == Granularity::Year => {
                let items = candidates
                    .items
                    .iter()
                    .flat_map(|item| {
                        months.iter().filter_map(move |m| {
                            NaiveDate::from_ymd_opt(item.year(), u32::from(*m), 1)
                                .map(|d| d.and_time(item.time()))
                        })
                    })
                    .collect();
                candidates.refine(Granularity::Month, items, period)
            }
            ByRule::WeekNo(weeks) if granularity == Granularity::Year => {
                let items = candidates
                    .items
                    .iter()
                    .flat_map(|item| {
                        let year = item.year();
                        let in_year = iso_weeks_in_year(year);
                        weeks.iter().filter_map(move |w| {
                            let week = resolve_signed(i64::from(*w), in_year)?;
                            NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
                                .map(|d| d.and_time(item.time()))
                        })
                    })
                    .collect();
                candidates.refine(Granularity::Week, items, period)
            }
            ByRule::YearDay(days) if granularity == Granularity::Year => {
                let items = candidates
                    .items
                    .iter()
                    .flat_map(|item| {
                        let year = item.year();
                        let in_year = days_in_year(year);
                        days.iter().filter_map(move |d| {
                            let ordinal = resolve_signed(i64::from(*d), in_year)?;
                            NaiveDate::from_yo_opt(year, ordinal).map(|d| d.and_time(item.time()))
                        })
                    })
                    .collect();
                candidates.refine(Granularity::Day, items, period)
            }
            ByRule::MonthDay(days)
                if matches!(granularity, Granularity::Year | Granularity::Month) =>
            {
                let items = candidates
                    .items
                    .iter()
                    .flat_map(|item| {
                        let months = match granularity {
                            Granularity::Year => 1..=12,
                            _ => item.month()..=item.month(),
                        };
                        months.flat_map(move |month| {
                            let in_month = days_in_month(item.year(), month);
                            days.iter().filter_map(move |d| {
                                let day = resolve_signed(i64::from(*d), in_month?)?;
                                NaiveDate::from_ymd_opt(item.year(), month, day)
                                    .map(|d| d.and_time(item.time()))
                            })
                        })
                    })
                    .collect();
                candidates.refine(Granularity::Day, items, period)
            }
            ByRule::WeekNo(_) if granularity == Granularity::Month => {
                let weekday = period.start.weekday();
                candidates.expand_days(period, |dt| {
                    self.matches(dt, period) && (period.by_day || dt.weekday() == weekday)
                })
            }
            ByRule::YearDay(_) | ByRule::MonthDay(_)
                if matches!(granularity, Granularity::Month | Granularity::Week) =>
            {
                candidates.expand_days(period, |dt| self.matches(dt, period))
            }
            ByRule::Day(weekdays) if granularity != Granularity::Day => {
                let items = candidates
                    .items
                    .iter()
                    .flat_map(|item| {
                        let (first, last) = unit_span(item.date(), granularity);
                        weekdays.iter().flat_map(move |wd| {
                            weekdays_in_span(first, last, *wd)
                                .into_iter()
                                .map(move |d| d.and_time(item.time()))
                        })
                    })
                    .collect();
                candidates.refine(Granularity::Day, items, period)
            }
            ByRule::Hour(hours) => candidates.expand_time(hours, period, |dt, v| dt.with_hour(v)),
            ByRule::Minute(minutes) => {
                candidates.expand_time(minutes, period, |dt, v| dt.with_minute(v))
            }
            ByRule::Second(seconds) => {
                candidates.expand_time(seconds, period, |dt, v| dt.with_second(v))
            }
            ByRule::SetPos(positions) => {
                let days = candidates.into_days(period);
                let mut all = days.items.clone();
                all.sort_unstable();
                all.dedup();
                let mut selected: Vec<NaiveDateTime> = positions
                    .iter()
                    .filter_map(|p| {
                        let index = resolve_signed(i64::from(*p), u32::try_from(all.len()).ok()?)?;
                        all.get(usize::try_from(index).ok()? - 1).copied()
                    })
                    .collect();
                selected.sort_unstable();
                selected.dedup();
                days.refine(Granularity::Day, selected, period)
            }
            _ => candidates.limit(self, period),
        }
    }

    /// Whether a single day satisfies this rule in limit mode.
    fn matches(&self, dt: NaiveDateTime, period: &Period) -> bool {
        let date = dt.date();
        match self {
            ByRule::Month(months) => months.iter().any(|m| u32::from(*m) == date.month()),
            ByRule::WeekNo(weeks) => {
                let iso = date.iso_week();
                let in_year = iso_weeks_in_year(iso.year());
                weeks
                    .iter()
                    .any(|w| resolve_signed(i64::from(*w), in_year) == Some(iso.week()))
            }
            ByRule::YearDay(days) => {
                let in_year = days_in_year(date.year());
                days.iter()
                    .any(|d| resolve_signed(i64::from(*d), in_year) == Some(date.ordinal()))
            }
            ByRule::MonthDay(days) => {
                let Some(in_month) = days_in_month(date.year(), date.month()) else {
                    return false;
                };
                days.iter()
                    .any(|d| resolve_signed(i64::from(*d), in_month) == Some(date.day()))
            }
            ByRule::Day(weekdays) => weekdays.iter().any(|wd| {
                if wd.weekday != date.weekday() {
                    return false;
                }
                match wd.ordinal {
                    None => true,
                    Some(n) => {
                        let (first, last) = limit_scope(date, period);
                        nth_weekday(first, last, wd.weekday, i64::from(n)) == Some(date)
                    }
                }
            }),
            ByRule::Hour(hours) => hours.iter().any(|h| u32::from(*h) == dt.hour()),
            ByRule::Minute(minutes) => minutes.iter().any(|m| u32::from(*m) == dt.minute()),
            ByRule::Second(seconds) => seconds.iter().any(|s| u32::from(*s) == dt.second()),
            ByRule::SetPos(_) => true,
        }
    }
}

impl fmt::Display for ByRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(values: &[T]) -> String {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        }

        let values = match self {
            ByRule::Month(v) | ByRule::Hour(v) | ByRule::Minute(v) | ByRule::Second(v) => join(v),
            ByRule::WeekNo(v) | ByRule::MonthDay(v) => join(v),
            ByRule::YearDay(v) | ByRule::SetPos(v) => join(v),
            ByRule::Day(v) => join(v),
        };
        write!(f, "{}={}", self.kind(), values)
    }
}

/// Turn a coarse candidate into the day the start implies for it.
fn settle_day(
    item: NaiveDateTime,
    granularity: Granularity,
    start: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let date = match granularity {
        Granularity::Day => item.date(),
        Granularity::Week => item
            .date()
            .checked_add_days(Days::new(u64::from(start.weekday().num_days_from_monday())))?,
        Granularity::Month => NaiveDate::from_ymd_opt(item.year(), item.month(), start.day())?,
        Granularity::Year => NaiveDate::from_ymd_opt(item.year(), start.month(), start.day())?,
    };
    Some(date.and_time(item.time()))
}

/// Resolve a signed 1-based index against a collection of `len` members.
fn resolve_signed(value: i64, len: u32) -> Option<u32> {
    let len = i64::from(len);
    let resolved = if value < 0 { len + value + 1 } else { value };
    if (1..=len).contains(&resolved) {
        u32::try_from(resolved).ok()
    } else {
        None
    }
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = match month {
        12 => NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?,
        _ => NaiveDate::from_ymd_opt(year, month + 1, 1)?,
    };
    u32::try_from((next - first).num_days()).ok()
}

fn iso_weeks_in_year(year: i32) -> u32 {
    if NaiveDate::from_isoywd_opt(year, 53, Weekday::Mon).is_some() {
        53
    } else {
        52
    }
}

fn month_span(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = days_in_month(date.year(), date.month())
        .and_then(|n| date.with_day(n))
        .unwrap_or(date);
    (first, last)
}

fn year_span(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_ordinal(1).unwrap_or(date);
    let last = date.with_ordinal(days_in_year(date.year())).unwrap_or(date);
    (first, last)
}

/// Monday to Sunday around `date`, clamped to the representable range.
fn week_span(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date
        .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(NaiveDate::MIN);
    let last = first.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    (first, last)
}

/// First and last day of the unit a coarse candidate stands for.
fn unit_span(first_day: NaiveDate, granularity: Granularity) -> (NaiveDate, NaiveDate) {
    match granularity {
        Granularity::Year => year_span(first_day),
        Granularity::Month => month_span(first_day),
        Granularity::Week | Granularity::Day => week_span(first_day),
    }
}

/// Range a BYDAY ordinal counts within when it only limits single days.
fn limit_scope(date: NaiveDate, period: &Period) -> (NaiveDate, NaiveDate) {
    match period.frequency {
        Frequency::Yearly if !period.by_month => year_span(date),
        Frequency::Weekly => week_span(date),
        _ => month_span(date),
    }
}

fn weekdays_in_span(first: NaiveDate, last: NaiveDate, wd: WeekdayNum) -> Vec<NaiveDate> {
    match wd.ordinal {
        Some(n) => nth_weekday(first, last, wd.weekday, i64::from(n))
            .into_iter()
            .collect(),
        None => {
            let offset = days_until(first.weekday(), wd.weekday);
            let mut days = Vec::new();
            let mut day = first.checked_add_days(Days::new(offset));
            while let Some(current) = day.filter(|d| *d <= last) {
                days.push(current);
                day = current.checked_add_days(Days::new(7));
            }
            days
        }
    }
}

/// The `n`-th `weekday` between `first` and `last` inclusive; negative counts back from `last`.
fn nth_weekday(first: NaiveDate, last: NaiveDate, weekday: Weekday, n: i64) -> Option<NaiveDate> {
    let weeks = n.unsigned_abs().checked_sub(1)?;
    if n > 0 {
        let skip = days_until(first.weekday(), weekday) + weeks * 7;
        let day = first.checked_add_days(Days::new(skip))?;
        (day <= last).then_some(day)
    } else {
        let back = days_until(weekday, last.weekday()) + weeks * 7;
        let day = last.checked_sub_days(Days::new(back))?;
        (day >= first).then_some(day)
    }
}

/// Days from `from` forward to the next `to` (0 when equal).
fn days_until(from: Weekday, to: Weekday) -> u64 {
    u64::from((7 + to.num_days_from_monday() - from.num_days_from_monday()) % 7)
}
