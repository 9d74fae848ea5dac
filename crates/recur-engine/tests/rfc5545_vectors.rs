//! RFC 5545 compliance test vectors, derived from the Section 3.8.5.3 examples.
//!
//! Every vector starts from a floating DTSTART (the RFC uses TZID=America/New_York,
//! which does not change the wall-clock results). Vectors that rely on WKST=SU are
//! left out because WKST is not supported.

use chrono::{Datelike, Weekday};
use recur_engine::{RecurrenceRule, Temporal};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn expand(rule: &str, dtstart: &str, limit: usize) -> Vec<Temporal> {
    let rule: RecurrenceRule = rule.parse().expect("rule should parse");
    let start = Temporal::parse(dtstart, None).expect("DTSTART should parse");
    rule.stream(&start).take(limit).collect()
}

/// Basic-format tokens of the expanded values, for compact comparison.
fn tokens(values: &[Temporal]) -> Vec<String> {
    values.iter().map(Temporal::to_ical).collect()
}

fn dates(values: &[Temporal]) -> Vec<(i32, u32, u32)> {
    values
        .iter()
        .map(|t| {
            let civil = t.civil();
            (civil.year(), civil.month(), civil.day())
        })
        .collect()
}

// ===========================================================================
// 1. Daily
// ===========================================================================

#[test]
fn daily_for_10_occurrences() {
    let result = expand("FREQ=DAILY;COUNT=10", "19970902T090000", 100);
    assert_eq!(result.len(), 10);
    assert_eq!(dates(&result)[0], (1997, 9, 2));
    assert_eq!(dates(&result)[9], (1997, 9, 11));
}

#[test]
fn every_other_day_forever() {
    let result = expand("FREQ=DAILY;INTERVAL=2", "19970902T090000", 5);
    assert_eq!(
        dates(&result),
        vec![
            (1997, 9, 2),
            (1997, 9, 4),
            (1997, 9, 6),
            (1997, 9, 8),
            (1997, 9, 10)
        ]
    );
}

#[test]
fn every_10_days_5_occurrences() {
    let result = expand("FREQ=DAILY;INTERVAL=10;COUNT=5", "19970902T090000", 100);
    assert_eq!(
        tokens(&result),
        vec![
            "19970902T090000",
            "19970912T090000",
            "19970922T090000",
            "19971002T090000",
            "19971012T090000",
        ]
    );
}

#[test]
fn every_day_in_january_for_3_years() {
    // Same set, once as a YEARLY rule and once as a DAILY rule.
    let yearly = expand(
        "FREQ=YEARLY;UNTIL=20000131T140000Z;BYMONTH=1;BYDAY=SU,MO,TU,WE,TH,FR,SA",
        "19980101T090000",
        1000,
    );
    let daily = expand(
        "FREQ=DAILY;UNTIL=20000131T140000Z;BYMONTH=1",
        "19980101T090000",
        1000,
    );

    assert_eq!(yearly.len(), 93, "31 days x 3 years");
    assert_eq!(yearly, daily);
    assert!(dates(&yearly).iter().all(|(_, month, _)| *month == 1));
    assert_eq!(dates(&yearly)[92], (2000, 1, 31));
}

// ===========================================================================
// 2. Weekly
// ===========================================================================

#[test]
fn weekly_for_10_occurrences() {
    let result = expand("FREQ=WEEKLY;COUNT=10", "19970902T090000", 100);
    assert_eq!(
        dates(&result),
        vec![
            (1997, 9, 2),
            (1997, 9, 9),
            (1997, 9, 16),
            (1997, 9, 23),
            (1997, 9, 30),
            (1997, 10, 7),
            (1997, 10, 14),
            (1997, 10, 21),
            (1997, 10, 28),
            (1997, 11, 4),
        ]
    );
}

#[test]
fn weekly_on_tuesday_and_thursday_for_five_weeks() {
    let result = expand("FREQ=WEEKLY;COUNT=10;BYDAY=TU,TH", "19970902T090000", 100);
    assert_eq!(
        dates(&result),
        vec![
            (1997, 9, 2),
            (1997, 9, 4),
            (1997, 9, 9),
            (1997, 9, 11),
            (1997, 9, 16),
            (1997, 9, 18),
            (1997, 9, 23),
            (1997, 9, 25),
            (1997, 9, 30),
            (1997, 10, 2),
        ]
    );
}

#[test]
fn biweekly_tue_thu_alternating_weeks() {
    // Week of Jan 5, skip, week of Jan 19, skip, week of Feb 2, ...
    let result = expand("FREQ=WEEKLY;INTERVAL=2;BYDAY=TU,TH", "20260106T100000", 8);
    assert_eq!(
        dates(&result),
        vec![
            (2026, 1, 6),
            (2026, 1, 8),
            (2026, 1, 20),
            (2026, 1, 22),
            (2026, 2, 3),
            (2026, 2, 5),
            (2026, 2, 17),
            (2026, 2, 19),
        ]
    );
}

// ===========================================================================
// 3. Monthly
// ===========================================================================

#[test]
fn monthly_on_the_first_friday_for_10_occurrences() {
    let result = expand("FREQ=MONTHLY;COUNT=10;BYDAY=1FR", "19970905T090000", 100);
    assert_eq!(
        dates(&result),
        vec![
            (1997, 9, 5),
            (1997, 10, 3),
            (1997, 11, 7),
            (1997, 12, 5),
            (1998, 1, 2),
            (1998, 2, 6),
            (1998, 3, 6),
            (1998, 4, 3),
            (1998, 5, 1),
            (1998, 6, 5),
        ]
    );
}

#[test]
fn monthly_on_the_second_to_last_monday_for_6_months() {
    let result = expand("FREQ=MONTHLY;COUNT=6;BYDAY=-2MO", "19970922T090000", 100);
    assert_eq!(
        dates(&result),
        vec![
            (1997, 9, 22),
            (1997, 10, 20),
            (1997, 11, 17),
            (1997, 12, 22),
            (1998, 1, 19),
            (1998, 2, 16),
        ]
    );
}

#[test]
fn monthly_on_the_third_to_last_day() {
    let result = expand("FREQ=MONTHLY;BYMONTHDAY=-3", "19970928T090000", 6);
    assert_eq!(
        dates(&result),
        vec![
            (1997, 9, 28),
            (1997, 10, 29),
            (1997, 11, 28),
            (1997, 12, 29),
            (1998, 1, 29),
            (1998, 2, 26),
        ]
    );
}

#[test]
fn monthly_on_the_2nd_and_15th_for_10_occurrences() {
    let result = expand("FREQ=MONTHLY;COUNT=10;BYMONTHDAY=2,15", "19970902T090000", 100);
    assert_eq!(result.len(), 10);
    assert_eq!(dates(&result)[1], (1997, 9, 15));
    assert_eq!(dates(&result)[9], (1998, 1, 15));
}

#[test]
fn every_friday_the_13th() {
    // DTSTART itself is a Tuesday and is not generated.
    let result = expand("FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13", "19970902T090000", 5);
    assert_eq!(
        dates(&result),
        vec![
            (1998, 2, 13),
            (1998, 3, 13),
            (1998, 11, 13),
            (1999, 8, 13),
            (2000, 10, 13),
        ]
    );
}

#[test]
fn first_saturday_that_follows_the_first_sunday() {
    let result = expand(
        "FREQ=MONTHLY;BYDAY=SA;BYMONTHDAY=7,8,9,10,11,12,13",
        "19970913T090000",
        10,
    );
    assert_eq!(
        dates(&result),
        vec![
            (1997, 9, 13),
            (1997, 10, 11),
            (1997, 11, 8),
            (1997, 12, 13),
            (1998, 1, 10),
            (1998, 2, 7),
            (1998, 3, 7),
            (1998, 4, 11),
            (1998, 5, 9),
            (1998, 6, 13),
        ]
    );
}

#[test]
fn third_tuesday_wednesday_or_thursday_for_3_months() {
    let result = expand(
        "FREQ=MONTHLY;COUNT=3;BYDAY=TU,WE,TH;BYSETPOS=3",
        "19970904T090000",
        100,
    );
    assert_eq!(
        tokens(&result),
        vec!["19970904T090000", "19971007T090000", "19971106T090000"]
    );
}

#[test]
fn second_to_last_weekday_of_the_month() {
    let result = expand(
        "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-2",
        "19970929T090000",
        7,
    );
    assert_eq!(
        dates(&result),
        vec![
            (1997, 9, 29),
            (1997, 10, 30),
            (1997, 11, 27),
            (1997, 12, 30),
            (1998, 1, 29),
            (1998, 2, 26),
            (1998, 3, 30),
        ]
    );
}

#[test]
fn last_weekday_of_month_bysetpos_neg1() {
    // Jan 31 2026 is a Saturday, Feb 28 a Saturday, Mar 31 a Tuesday.
    let result = expand(
        "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",
        "20260130T170000",
        4,
    );
    assert_eq!(
        dates(&result),
        vec![(2026, 1, 30), (2026, 2, 27), (2026, 3, 31), (2026, 4, 30)]
    );
}

#[test]
fn second_tuesday_of_jan_and_jun() {
    let result = expand(
        "FREQ=MONTHLY;BYMONTH=1,6;BYDAY=TU;BYSETPOS=2",
        "20260113T140000",
        3,
    );
    assert_eq!(
        dates(&result),
        vec![(2026, 1, 13), (2026, 6, 9), (2027, 1, 12)]
    );
}

#[test]
fn invalid_dates_are_skipped_not_clamped() {
    // February has no 30th; the instance is dropped rather than moved.
    let result = expand("FREQ=MONTHLY;BYMONTHDAY=15,30;COUNT=5", "20070115T090000", 100);
    assert_eq!(
        dates(&result),
        vec![
            (2007, 1, 15),
            (2007, 1, 30),
            (2007, 2, 15),
            (2007, 3, 15),
            (2007, 3, 30),
        ]
    );
}

#[test]
fn monthly_on_the_31st_skips_short_months() {
    let result = expand("FREQ=MONTHLY;COUNT=4", "20260131T080000", 100);
    assert_eq!(
        dates(&result),
        vec![(2026, 1, 31), (2026, 3, 31), (2026, 5, 31), (2026, 7, 31)]
    );
}

#[test]
fn monthly_interval_three_quarterly() {
    let result = expand("FREQ=MONTHLY;INTERVAL=3", "20260315T090000", 4);
    assert_eq!(
        dates(&result),
        vec![(2026, 3, 15), (2026, 6, 15), (2026, 9, 15), (2026, 12, 15)]
    );
}

// ===========================================================================
// 4. Yearly
// ===========================================================================

#[test]
fn yearly_in_june_and_july_for_10_occurrences() {
    let result = expand("FREQ=YEARLY;COUNT=10;BYMONTH=6,7", "19970610T090000", 100);
    assert_eq!(result.len(), 10);
    assert_eq!(dates(&result)[0], (1997, 6, 10));
    assert_eq!(dates(&result)[1], (1997, 7, 10));
    assert_eq!(dates(&result)[8], (2001, 6, 10));
    assert_eq!(dates(&result)[9], (2001, 7, 10));
}

#[test]
fn every_20th_monday_of_the_year() {
    let result = expand("FREQ=YEARLY;BYDAY=20MO", "19970519T090000", 3);
    assert_eq!(
        dates(&result),
        vec![(1997, 5, 19), (1998, 5, 18), (1999, 5, 17)]
    );
}

#[test]
fn monday_of_week_number_20() {
    let result = expand("FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO", "19970512T090000", 3);
    assert_eq!(
        dates(&result),
        vec![(1997, 5, 12), (1998, 5, 11), (1999, 5, 17)]
    );
}

#[test]
fn every_thursday_in_march() {
    let result = expand("FREQ=YEARLY;BYMONTH=3;BYDAY=TH", "19970313T090000", 11);
    assert_eq!(
        dates(&result),
        vec![
            (1997, 3, 13),
            (1997, 3, 20),
            (1997, 3, 27),
            (1998, 3, 5),
            (1998, 3, 12),
            (1998, 3, 19),
            (1998, 3, 26),
            (1999, 3, 4),
            (1999, 3, 11),
            (1999, 3, 18),
            (1999, 3, 25),
        ]
    );
    assert!(result
        .iter()
        .all(|t| t.civil().weekday() == Weekday::Thu));
}

#[test]
fn us_presidential_election_day() {
    let result = expand(
        "FREQ=YEARLY;INTERVAL=4;BYMONTH=11;BYDAY=TU;BYMONTHDAY=2,3,4,5,6,7,8",
        "19961105T090000",
        3,
    );
    assert_eq!(
        dates(&result),
        vec![(1996, 11, 5), (2000, 11, 7), (2004, 11, 2)]
    );
}

#[test]
fn yearly_on_day_1_100_200() {
    let result = expand(
        "FREQ=YEARLY;INTERVAL=3;COUNT=10;BYYEARDAY=1,100,200",
        "19970101T090000",
        100,
    );
    assert_eq!(
        dates(&result),
        vec![
            (1997, 1, 1),
            (1997, 4, 10),
            (1997, 7, 19),
            (2000, 1, 1),
            (2000, 4, 9),
            (2000, 7, 18),
            (2003, 1, 1),
            (2003, 4, 10),
            (2003, 7, 19),
            (2006, 1, 1),
        ]
    );
}

#[test]
fn leap_year_feb_29() {
    // Non-leap years have no Feb 29 and contribute nothing.
    let result = expand("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29", "20240229T080000", 3);
    assert_eq!(
        dates(&result),
        vec![(2024, 2, 29), (2028, 2, 29), (2032, 2, 29)]
    );
}

#[test]
fn yearly_june_15() {
    let result = expand("FREQ=YEARLY;BYMONTH=6;BYMONTHDAY=15", "20260615T120000", 4);
    assert_eq!(
        tokens(&result),
        vec![
            "20260615T120000",
            "20270615T120000",
            "20280615T120000",
            "20290615T120000",
        ]
    );
}

// ===========================================================================
// 5. Time-of-day expansion
// ===========================================================================

#[test]
fn daily_at_9_and_17() {
    let result = expand("FREQ=DAILY;BYHOUR=9,17;COUNT=4", "20260301T090000", 100);
    assert_eq!(
        tokens(&result),
        vec![
            "20260301T090000",
            "20260301T170000",
            "20260302T090000",
            "20260302T170000",
        ]
    );
}

#[test]
fn hour_and_minute_cross_product() {
    let result = expand(
        "FREQ=DAILY;BYHOUR=9,10;BYMINUTE=0,30;COUNT=4",
        "20260301T090000",
        100,
    );
    assert_eq!(
        tokens(&result),
        vec![
            "20260301T090000",
            "20260301T093000",
            "20260301T100000",
            "20260301T103000",
        ]
    );
}

// ===========================================================================
// 6. Combined BY-rules
// ===========================================================================

#[test]
fn yearday_inside_bymonth() {
    // The 2020 occurrence precedes DTSTART.
    let result = expand("FREQ=YEARLY;BYMONTH=1;BYYEARDAY=1", "20200105T090000", 3);
    assert_eq!(
        tokens(&result),
        vec!["20210101T090000", "20220101T090000", "20230101T090000"]
    );
}

#[test]
fn yearday_outside_bymonth_is_dropped() {
    // Day 60 of a leap year is Feb 29.
    let result = expand("FREQ=YEARLY;BYMONTH=3;BYYEARDAY=60,61", "20200101T090000", 5);
    assert_eq!(
        dates(&result),
        vec![
            (2020, 3, 1),
            (2021, 3, 1),
            (2021, 3, 2),
            (2022, 3, 1),
            (2022, 3, 2),
        ]
    );
}

#[test]
fn weekno_inside_bymonth() {
    // ISO week 1 of 2026 starts on Monday 2025-12-29, outside January.
    let result = expand("FREQ=YEARLY;BYMONTH=1;BYWEEKNO=1;BYDAY=MO", "20260101T090000", 2);
    assert_eq!(dates(&result), vec![(2027, 1, 4), (2028, 1, 3)]);
}

#[test]
fn weekno_inside_bymonth_uses_start_weekday() {
    let result = expand("FREQ=YEARLY;BYMONTH=1;BYWEEKNO=2", "20260105T090000", 3);
    assert_eq!(dates(&result), vec![(2026, 1, 5), (2027, 1, 11), (2028, 1, 10)]);
    assert!(result.iter().all(|t| t.civil().weekday() == Weekday::Mon));
}

#[test]
fn setpos_counts_within_the_year_across_week_numbers() {
    let result = expand(
        "FREQ=YEARLY;BYWEEKNO=1,2;BYDAY=MO,FR;BYSETPOS=-1",
        "20260101T090000",
        3,
    );
    assert_eq!(dates(&result), vec![(2026, 1, 9), (2027, 1, 15), (2028, 1, 14)]);
}

#[test]
fn setpos_selection_before_start_is_not_replaced() {
    // The first candidate of 2026 is Monday 2025-12-29, which precedes DTSTART.
    let result = expand(
        "FREQ=YEARLY;BYWEEKNO=1;BYDAY=MO,FR;BYSETPOS=1",
        "20260101T090000",
        2,
    );
    assert_eq!(dates(&result), vec![(2027, 1, 4), (2028, 1, 3)]);
}

#[test]
fn setpos_over_year_days() {
    let result = expand(
        "FREQ=YEARLY;BYYEARDAY=1,100,200,-1;BYSETPOS=2,-2",
        "20260101T090000",
        6,
    );
    assert_eq!(
        dates(&result),
        vec![
            (2026, 4, 10),
            (2026, 7, 19),
            (2027, 4, 10),
            (2027, 7, 19),
            (2028, 4, 9),
            (2028, 7, 18),
        ]
    );
}

#[test]
fn setpos_beyond_the_period_selects_nothing() {
    // Only months with five Tuesdays have a fifth candidate.
    let result = expand("FREQ=MONTHLY;BYDAY=TU;BYSETPOS=5", "20260101T090000", 3);
    assert_eq!(dates(&result), vec![(2026, 3, 31), (2026, 6, 30), (2026, 9, 29)]);

    let result = expand("FREQ=MONTHLY;BYDAY=TU;BYSETPOS=6", "20260101T090000", 3);
    assert!(result.is_empty());
}
