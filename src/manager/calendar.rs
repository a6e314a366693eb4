//! Month arithmetic for the organizer calendar.
//!
//! Everything works on the naive local calendar: mission dates carry no
//! timezone and neither do the day spans they are compared against.

use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate, NaiveTime};

use super::Mission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn days_in_month(&self) -> u32 {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .map(|next| next.signed_duration_since(first).num_days() as u32)
            .unwrap_or(31)
    }

    /// Previous/next navigation; saturates at the ends of chrono's range.
    pub fn shift(&self, delta: i32) -> Self {
        let first = self.first_day();
        let shifted = if delta >= 0 {
            first.checked_add_months(Months::new(delta.unsigned_abs()))
        } else {
            first.checked_sub_months(Months::new(delta.unsigned_abs()))
        };
        shifted.map_or(*self, Self::of)
    }

    pub fn label(&self) -> String {
        const MONTHS: [&str; 12] = [
            "Janvier", "Février", "Mars", "Avril", "Mai", "Juin", "Juillet", "Août",
            "Septembre", "Octobre", "Novembre", "Décembre",
        ];
        format!("{} {}", MONTHS[(self.month - 1) as usize], self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthGrid {
    pub days_in_month: u32,
    /// Empty cells before day 1 in a Monday-first week.
    pub leading_offset: u32,
}

impl MonthGrid {
    pub fn of(month: YearMonth) -> Self {
        Self {
            days_in_month: month.days_in_month(),
            leading_offset: (month.first_day().weekday().num_days_from_sunday() + 6) % 7,
        }
    }
}

fn overlaps(day: NaiveDate, mission: &Mission) -> bool {
    let day_start = day.and_time(NaiveTime::MIN);
    let day_end = day.and_time(
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    );
    day_start <= mission.date_end && day_end >= mission.date_start
}

/// Day numbers of `month` that intersect at least one mission.
pub fn days_with_missions(month: YearMonth, missions: &[Mission]) -> BTreeSet<u32> {
    (1..=month.days_in_month())
        .filter(|&d| {
            month
                .day(d)
                .is_some_and(|day| missions.iter().any(|m| overlaps(day, m)))
        })
        .collect()
}

pub fn missions_on(day: NaiveDate, missions: &[Mission]) -> Vec<&Mission> {
    missions.iter().filter(|m| overlaps(day, m)).collect()
}
