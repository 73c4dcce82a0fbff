//! Cohort filters.
//!
//! Each filter borrows a slice of rows and returns the rows belonging to a
//! named sub-population. Filters never copy or mutate records and compose
//! by feeding one filter's output into the next.

use crate::models::{Dimension, Granularity, Record};

/// Named sub-populations, so callers can describe a universe as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cohort {
    /// Civilians with a labor force status.
    InUniverse,
    LaborForce,
    Employed,
    Unemployed,
    Youth,
    PrimeAge,
    EmployedHourlyPrivate,
    ValidWage,
    FullTime,
    PartTime,
    WithActualHours,
    Discouraged,
}

impl Cohort {
    /// Whether a single record belongs to this cohort.
    pub fn contains(&self, record: &Record) -> bool {
        match self {
            Cohort::InUniverse => record.employment_status.is_some(),
            Cohort::LaborForce => record
                .employment_status
                .is_some_and(|s| s.in_labor_force()),
            Cohort::Employed => record.employment_status.is_some_and(|s| s.is_employed()),
            Cohort::Unemployed => record.employment_status.is_some_and(|s| s.is_unemployed()),
            Cohort::Youth => record.age.is_some_and(|age| age < 18),
            Cohort::PrimeAge => record.age.is_some_and(|age| (25..=54).contains(&age)),
            Cohort::EmployedHourlyPrivate => {
                Cohort::Employed.contains(record)
                    && record.paid_hourly == Some(true)
                    && record.class_of_worker.is_some_and(|c| c.is_private())
            }
            Cohort::ValidWage => record.hourly_earnings.is_some_and(|w| w > 0.0),
            Cohort::FullTime => record.usual_hours.is_some_and(|h| h.is_full_time()),
            Cohort::PartTime => record.usual_hours.is_some_and(|h| h.is_part_time()),
            Cohort::WithActualHours => record.actual_hours.is_some(),
            Cohort::Discouraged => record.discouraged == Some(true),
        }
    }

    /// Keep the rows that belong to this cohort.
    pub fn apply<'a>(&self, rows: &[&'a Record]) -> Vec<&'a Record> {
        rows.iter().copied().filter(|r| self.contains(r)).collect()
    }
}

/// Apply several cohorts in order.
pub fn select<'a>(rows: &[&'a Record], cohorts: &[Cohort]) -> Vec<&'a Record> {
    rows.iter()
        .copied()
        .filter(|r| cohorts.iter().all(|c| c.contains(r)))
        .collect()
}

pub fn in_universe<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::InUniverse.apply(rows)
}

pub fn labor_force<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::LaborForce.apply(rows)
}

pub fn employed<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::Employed.apply(rows)
}

pub fn unemployed<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::Unemployed.apply(rows)
}

pub fn youth<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::Youth.apply(rows)
}

pub fn prime_age<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::PrimeAge.apply(rows)
}

pub fn employed_hourly_private<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::EmployedHourlyPrivate.apply(rows)
}

/// Rows with a usable hourly wage. Missing wages are dropped, never zeroed.
pub fn valid_wage<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::ValidWage.apply(rows)
}

pub fn full_time<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::FullTime.apply(rows)
}

pub fn part_time<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::PartTime.apply(rows)
}

pub fn with_actual_hours<'a>(rows: &[&'a Record]) -> Vec<&'a Record> {
    Cohort::WithActualHours.apply(rows)
}

/// Rows that carry an applicable code for the dimension and granularity.
pub fn with_code<'a>(
    rows: &[&'a Record],
    dimension: Dimension,
    granularity: Granularity,
) -> Vec<&'a Record> {
    rows.iter()
        .copied()
        .filter(|r| r.code(dimension, granularity).is_some())
        .collect()
}
