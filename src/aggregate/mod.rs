//! Rental aggregations.
//!
//! Every function here is pure: it takes records already restricted to the
//! selected date range and returns a derived summary. None of them can fail;
//! empty input yields an empty summary.
//!
//! Grouping goes through `BTreeMap`, so outputs come back ordered by their key
//! (date bucket, season, weather, year).

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::{CategoryAverage, PeriodTotals, RentalRecord, Season, Weather, YearSplit};

/// Sum registered/casual/total per exact date.
///
/// One row per distinct date present in the input; missing days are not filled.
pub fn daily_totals(records: &[RentalRecord]) -> Vec<PeriodTotals> {
    sum_by_period(records, |r| r.date)
}

/// Sum registered/casual/total per calendar month.
///
/// The bucket of each row is the last day of its month.
pub fn monthly_totals(records: &[RentalRecord]) -> Vec<PeriodTotals> {
    sum_by_period(records, |r| month_end(r.date))
}

/// Mean daily `total` per season, rounded to 2 decimals.
pub fn average_by_season(records: &[RentalRecord]) -> Vec<CategoryAverage<Season>> {
    mean_total_by(records, |r| r.season)
}

/// Mean daily `total` per weather situation, rounded to 2 decimals.
pub fn average_by_weather(records: &[RentalRecord]) -> Vec<CategoryAverage<Weather>> {
    mean_total_by(records, |r| r.weather)
}

/// Registered vs casual sums per calendar year.
pub fn yearly_split(records: &[RentalRecord]) -> Vec<YearSplit> {
    let mut years: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
    for r in records {
        let entry = years.entry(r.date.year()).or_default();
        entry.0 += r.registered;
        entry.1 += r.casual;
    }
    years
        .into_iter()
        .map(|(year, (registered, casual))| YearSplit { year, registered, casual })
        .collect()
}

/// Round to 2 decimal places, ties to the even digit (12.125 -> 12.12).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

fn sum_by_period(records: &[RentalRecord], bucket: impl Fn(&RentalRecord) -> NaiveDate) -> Vec<PeriodTotals> {
    let mut groups: BTreeMap<NaiveDate, PeriodTotals> = BTreeMap::new();
    for r in records {
        let period = bucket(r);
        let row = groups.entry(period).or_insert(PeriodTotals {
            period,
            registered: 0,
            casual: 0,
            total: 0,
        });
        row.registered += r.registered;
        row.casual += r.casual;
        row.total += r.total;
    }
    groups.into_values().collect()
}

fn mean_total_by<K: Ord + Copy>(records: &[RentalRecord], key: impl Fn(&RentalRecord) -> K) -> Vec<CategoryAverage<K>> {
    let mut groups: BTreeMap<K, (u64, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry(key(r)).or_default();
        entry.0 += r.total;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(key, (sum, days))| CategoryAverage {
            key,
            mean_total: round2(sum as f64 / days as f64),
            days,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, season: Season, weather: Weather, registered: u64, casual: u64) -> RentalRecord {
        RentalRecord {
            date,
            season,
            weather,
            registered,
            casual,
            total: registered + casual,
        }
    }

    fn scenario() -> Vec<RentalRecord> {
        vec![
            rec(d(2011, 1, 1), Season::Spring, Weather::Clear, 10, 5),
            rec(d(2011, 1, 2), Season::Spring, Weather::Clear, 8, 2),
            rec(d(2011, 2, 1), Season::Summer, Weather::Misty, 20, 0),
        ]
    }

    #[test]
    fn three_record_scenario() {
        let records = scenario();

        let daily = daily_totals(&records);
        assert_eq!(daily.len(), 3);

        let monthly = monthly_totals(&records);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].period, d(2011, 1, 31));
        assert_eq!(monthly[0].total, 25);
        assert_eq!(monthly[0].registered, 18);
        assert_eq!(monthly[0].casual, 7);
        assert_eq!(monthly[1].period, d(2011, 2, 28));
        assert_eq!(monthly[1].total, 20);

        let seasons = average_by_season(&records);
        assert_eq!(seasons.len(), 2);
        assert_eq!((seasons[0].key, seasons[0].mean_total), (Season::Spring, 12.50));
        assert_eq!((seasons[1].key, seasons[1].mean_total), (Season::Summer, 20.00));
        assert_eq!(seasons[0].days, 2);

        let weather = average_by_weather(&records);
        assert_eq!(weather.len(), 2);
        assert_eq!((weather[0].key, weather[0].mean_total), (Weather::Clear, 12.50));
        assert_eq!((weather[1].key, weather[1].mean_total), (Weather::Misty, 20.00));
    }

    #[test]
    fn empty_input_yields_empty_summaries() {
        assert!(daily_totals(&[]).is_empty());
        assert!(monthly_totals(&[]).is_empty());
        assert!(average_by_season(&[]).is_empty());
        assert!(average_by_weather(&[]).is_empty());
        assert!(yearly_split(&[]).is_empty());
    }

    #[test]
    fn daily_grouping_conserves_totals_and_merges_same_day() {
        let mut records = scenario();
        records.push(rec(d(2011, 1, 2), Season::Spring, Weather::Misty, 3, 4));

        let daily = daily_totals(&records);
        assert_eq!(daily.len(), 3);
        let jan2 = daily.iter().find(|r| r.period == d(2011, 1, 2)).unwrap();
        assert_eq!((jan2.registered, jan2.casual, jan2.total), (11, 6, 17));

        let input_sum: u64 = records.iter().map(|r| r.total).sum();
        assert_eq!(daily.iter().map(|r| r.total).sum::<u64>(), input_sum);
        assert_eq!(monthly_totals(&records).iter().map(|r| r.total).sum::<u64>(), input_sum);
    }

    #[test]
    fn daily_rows_are_sorted_even_for_unsorted_input() {
        let mut records = scenario();
        records.reverse();
        let dates: Vec<_> = daily_totals(&records).iter().map(|r| r.period).collect();
        assert_eq!(dates, vec![d(2011, 1, 1), d(2011, 1, 2), d(2011, 2, 1)]);
    }

    #[test]
    fn monthly_never_exceeds_distinct_months_and_skips_gaps() {
        let records = vec![
            rec(d(2011, 1, 5), Season::Spring, Weather::Clear, 1, 1),
            rec(d(2011, 3, 5), Season::Spring, Weather::Clear, 1, 1),
            rec(d(2012, 1, 5), Season::Spring, Weather::Clear, 1, 1),
        ];
        let distinct: BTreeSet<_> = records.iter().map(|r| (r.date.year(), r.date.month())).collect();
        let monthly = monthly_totals(&records);
        assert!(monthly.len() <= distinct.len());
        assert_eq!(
            monthly.iter().map(|r| r.period).collect::<Vec<_>>(),
            vec![d(2011, 1, 31), d(2011, 3, 31), d(2012, 1, 31)]
        );
    }

    #[test]
    fn month_end_handles_leap_years_and_december() {
        assert_eq!(month_end(d(2012, 2, 10)), d(2012, 2, 29));
        assert_eq!(month_end(d(2011, 2, 10)), d(2011, 2, 28));
        assert_eq!(month_end(d(2011, 12, 1)), d(2011, 12, 31));
        assert_eq!(month_end(d(2011, 4, 30)), d(2011, 4, 30));
    }

    #[test]
    fn averages_round_to_two_decimals() {
        let records = vec![
            rec(d(2011, 1, 1), Season::Fall, Weather::LightPrecipitation, 3, 0),
            rec(d(2011, 1, 2), Season::Fall, Weather::LightPrecipitation, 4, 0),
            rec(d(2011, 1, 3), Season::Fall, Weather::LightPrecipitation, 4, 0),
        ];
        let seasons = average_by_season(&records);
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].mean_total, 3.67);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(12.5), 12.5);
    }

    #[test]
    fn halfway_means_round_to_even() {
        // 97 / 8 = 12.125 exactly.
        let mut totals = vec![12; 7];
        totals.push(13);
        let records: Vec<_> = totals
            .into_iter()
            .enumerate()
            .map(|(i, total)| rec(d(2011, 3, i as u32 + 1), Season::Spring, Weather::Clear, total, 0))
            .collect();
        let seasons = average_by_season(&records);
        assert_eq!(seasons[0].days, 8);
        assert_eq!(seasons[0].mean_total, 12.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn one_row_per_category_present() {
        let records = vec![
            rec(d(2011, 1, 1), Season::Winter, Weather::Clear, 1, 0),
            rec(d(2011, 1, 2), Season::Fall, Weather::HeavyPrecipitation, 1, 0),
            rec(d(2011, 1, 3), Season::Winter, Weather::Clear, 1, 0),
        ];
        let seasons: Vec<_> = average_by_season(&records).iter().map(|r| r.key).collect();
        assert_eq!(seasons, vec![Season::Fall, Season::Winter]);
        let weather: Vec<_> = average_by_weather(&records).iter().map(|r| r.key).collect();
        assert_eq!(weather, vec![Weather::Clear, Weather::HeavyPrecipitation]);
    }

    #[test]
    fn yearly_split_groups_by_calendar_year() {
        let records = vec![
            rec(d(2012, 6, 1), Season::Summer, Weather::Clear, 100, 40),
            rec(d(2011, 6, 1), Season::Summer, Weather::Clear, 80, 20),
            rec(d(2011, 12, 31), Season::Winter, Weather::Misty, 20, 0),
        ];
        let split = yearly_split(&records);
        assert_eq!(
            split,
            vec![
                YearSplit { year: 2011, registered: 100, casual: 20 },
                YearSplit { year: 2012, registered: 100, casual: 40 },
            ]
        );
    }
}
