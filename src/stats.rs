use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::districts::OTHER_DISTRICT;
use crate::error::StatsError;
use crate::models::{DistrictCount, StatsRow, YearStats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub year: YearStats,
    /// Current-year bookings per district, highest count first.
    pub districts: Vec<DistrictCount>,
    /// Current-year bookings per calendar month, keys `1..=12`.
    pub months: BTreeMap<u32, usize>,
}

impl Stats {
    pub fn busiest_district(&self) -> Option<&DistrictCount> {
        self.districts.first()
    }

    /// Lowest count among districts that had at least one booking.
    pub fn quietest_district(&self) -> Option<&DistrictCount> {
        self.districts
            .iter()
            .filter(|entry| entry.count > 0)
            .min_by_key(|entry| entry.count)
    }
}

/// Date range `[Jan 1 last year, Jan 1 next year)` the stats are drawn from.
pub fn stats_window(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let year = today.year();
    Some((
        NaiveDate::from_ymd_opt(year - 1, 1, 1)?,
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
    ))
}

pub fn parse_row_date(row: &StatsRow) -> Result<NaiveDate, StatsError> {
    NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d").map_err(|_| StatsError::DateParse {
        value: row.date.clone(),
    })
}

/// Buckets non-cancelled bookings into last-year / this-year counts, and
/// breaks this year's bookings down by district and month.
///
/// Every district in `known_districts` appears in the result, zero-filled.
/// Bookings without a district are counted under [`OTHER_DISTRICT`]. Districts
/// with equal counts keep the order they were first seen in, followed by the
/// order of `known_districts`.
pub fn compute_stats(
    rows: &[StatsRow],
    known_districts: &[String],
    today: NaiveDate,
) -> Result<Stats, StatsError> {
    let current_year = today.year();
    let mut year = YearStats::default();
    let mut districts: Vec<DistrictCount> = Vec::new();
    let mut months: BTreeMap<u32, usize> = (1..=12).map(|month| (month, 0)).collect();

    for row in rows {
        let date = parse_row_date(row)?;
        if row.is_cancelled {
            continue;
        }

        if date.year() == current_year - 1 {
            year.previous += 1;
            continue;
        }
        if date.year() != current_year {
            continue;
        }

        year.current += 1;
        *months.entry(date.month()).or_insert(0) += 1;

        let name = row.district.as_deref().unwrap_or(OTHER_DISTRICT);
        match districts.iter_mut().find(|entry| entry.district == name) {
            Some(entry) => entry.count += 1,
            None => districts.push(DistrictCount {
                district: name.to_string(),
                count: 1,
            }),
        }
    }

    for name in known_districts {
        if !districts.iter().any(|entry| &entry.district == name) {
            districts.push(DistrictCount {
                district: name.clone(),
                count: 0,
            });
        }
    }

    districts.sort_by(|a, b| b.count.cmp(&a.count));

    tracing::debug!(
        previous = year.previous,
        current = year.current,
        rows = rows.len(),
        "computed booking stats"
    );

    Ok(Stats {
        year,
        districts,
        months,
    })
}
