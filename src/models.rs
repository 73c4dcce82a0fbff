//! Data models for the CPS indicator report.
//!
//! This module contains the typed microdata rows produced by the fetch
//! layer, the code enums they carry, and the output structures that end
//! up in the JSON report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A survey reference month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Create a new year/month, returning `None` for an out-of-range month.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month immediately before this one.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The month immediately after this one.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Lowercase three-letter month name used in the Census API path.
    pub fn month_abbrev(&self) -> &'static str {
        const NAMES: [&str; 12] = [
            "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
        ];
        NAMES[(self.month.clamp(1, 12) - 1) as usize]
    }

    /// The `count` months ending at (and including) `end`, oldest first.
    pub fn window_ending(end: YearMonth, count: usize) -> Vec<YearMonth> {
        let mut months = Vec::with_capacity(count);
        let mut current = end;
        for _ in 0..count {
            months.push(current);
            current = current.previous();
        }
        months.reverse();
        months
    }

    /// All months from `start` to `end` inclusive, oldest first.
    ///
    /// Returns an empty list when `start` is after `end`.
    pub fn range(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
        let mut months = Vec::new();
        let mut current = start;
        while current <= end {
            months.push(current);
            current = current.next();
        }
        months
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Expected YYYY-MM, got '{}'", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in '{}'", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("Month out of range in '{}'", s))
    }
}

/// Monthly labor force recode (PEMLR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmploymentStatus {
    EmployedAtWork,
    EmployedAbsent,
    UnemployedLayoff,
    UnemployedLooking,
    NotInLaborForceRetired,
    NotInLaborForceDisabled,
    NotInLaborForceOther,
}

impl EmploymentStatus {
    /// Map a raw PEMLR code. Not-in-universe and unknown codes map to `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::EmployedAtWork),
            2 => Some(Self::EmployedAbsent),
            3 => Some(Self::UnemployedLayoff),
            4 => Some(Self::UnemployedLooking),
            5 => Some(Self::NotInLaborForceRetired),
            6 => Some(Self::NotInLaborForceDisabled),
            7 => Some(Self::NotInLaborForceOther),
            _ => None,
        }
    }

    pub fn is_employed(&self) -> bool {
        matches!(self, Self::EmployedAtWork | Self::EmployedAbsent)
    }

    pub fn is_unemployed(&self) -> bool {
        matches!(self, Self::UnemployedLayoff | Self::UnemployedLooking)
    }

    pub fn in_labor_force(&self) -> bool {
        self.is_employed() || self.is_unemployed()
    }
}

/// Class of worker on the main job (PEIO1COW).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassOfWorker {
    FederalGovernment,
    StateGovernment,
    LocalGovernment,
    PrivateForProfit,
    PrivateNonprofit,
    SelfEmployedIncorporated,
    SelfEmployedUnincorporated,
    WithoutPay,
}

impl ClassOfWorker {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::FederalGovernment),
            2 => Some(Self::StateGovernment),
            3 => Some(Self::LocalGovernment),
            4 => Some(Self::PrivateForProfit),
            5 => Some(Self::PrivateNonprofit),
            6 => Some(Self::SelfEmployedIncorporated),
            7 => Some(Self::SelfEmployedUnincorporated),
            8 => Some(Self::WithoutPay),
            _ => None,
        }
    }

    /// Private-sector wage and salary workers.
    pub fn is_private(&self) -> bool {
        matches!(self, Self::PrivateForProfit | Self::PrivateNonprofit)
    }
}

/// Usual hours worked recode (PRHRUSL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsualHours {
    Hours0To20,
    Hours21To34,
    Hours35To39,
    Hours40,
    Hours41To49,
    Hours50Plus,
    VariesFullTime,
    VariesPartTime,
}

impl UsualHours {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Hours0To20),
            2 => Some(Self::Hours21To34),
            3 => Some(Self::Hours35To39),
            4 => Some(Self::Hours40),
            5 => Some(Self::Hours41To49),
            6 => Some(Self::Hours50Plus),
            7 => Some(Self::VariesFullTime),
            8 => Some(Self::VariesPartTime),
            _ => None,
        }
    }

    /// The "35+" codes, including hours-vary-but-usually-full-time.
    pub fn is_full_time(&self) -> bool {
        matches!(
            self,
            Self::Hours35To39
                | Self::Hours40
                | Self::Hours41To49
                | Self::Hours50Plus
                | Self::VariesFullTime
        )
    }

    pub fn is_part_time(&self) -> bool {
        !self.is_full_time()
    }
}

/// Classification dimension used for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Industry,
    Occupation,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Industry => write!(f, "Industry"),
            Dimension::Occupation => write!(f, "Occupation"),
        }
    }
}

/// Code granularity. Detailed and major-group codes are separate code
/// spaces and never share an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Detailed,
    Major,
}

/// One respondent row from a CPS basic monthly file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Composited final weight, used for counts.
    pub count_weight: f64,
    /// Outgoing rotation weight, used for earnings statistics.
    pub outgoing_rotation_weight: f64,
    /// Hourly earnings in dollars, `None` when not applicable.
    pub hourly_earnings: Option<f64>,
    pub employment_status: Option<EmploymentStatus>,
    pub class_of_worker: Option<ClassOfWorker>,
    pub paid_hourly: Option<bool>,
    pub usual_hours: Option<UsualHours>,
    /// Actual hours worked last week at all jobs.
    pub actual_hours: Option<u16>,
    pub industry_detailed: Option<u16>,
    pub industry_major: Option<u16>,
    pub occupation_detailed: Option<u16>,
    pub occupation_major: Option<u16>,
    pub age: Option<u8>,
    /// Discouraged-worker flag; only present in some vintages.
    pub discouraged: Option<bool>,
}

impl Record {
    /// Classification code for a dimension at one granularity.
    pub fn code(&self, dimension: Dimension, granularity: Granularity) -> Option<u16> {
        match (dimension, granularity) {
            (Dimension::Industry, Granularity::Detailed) => self.industry_detailed,
            (Dimension::Industry, Granularity::Major) => self.industry_major,
            (Dimension::Occupation, Granularity::Detailed) => self.occupation_detailed,
            (Dimension::Occupation, Granularity::Major) => self.occupation_major,
        }
    }
}

/// One month of parsed microdata. Immutable once built.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    period: YearMonth,
    records: Vec<Record>,
}

impl RecordBatch {
    pub fn new(period: YearMonth, records: Vec<Record>) -> Self {
        Self { period, records }
    }

    pub fn period(&self) -> YearMonth {
        self.period
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any row carries the discouraged-worker field.
    pub fn has_discouraged(&self) -> bool {
        self.records.iter().any(|r| r.discouraged.is_some())
    }

    /// Borrow every row, the starting point for cohort filters.
    pub fn rows(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }
}

/// A concatenation of several monthly batches. Owns its own copy of the
/// rows; the source batches are left untouched.
#[derive(Debug, Clone)]
pub struct CombinedBatch {
    periods: Vec<YearMonth>,
    records: Vec<Record>,
}

impl CombinedBatch {
    pub fn combine(batches: &[RecordBatch]) -> Self {
        let total: usize = batches.iter().map(RecordBatch::len).sum();
        let mut records = Vec::with_capacity(total);
        let mut periods = Vec::with_capacity(batches.len());
        for batch in batches {
            periods.push(batch.period());
            records.extend(batch.records().iter().cloned());
        }
        periods.sort();
        Self { periods, records }
    }

    pub fn periods(&self) -> &[YearMonth] {
        &self.periods
    }

    /// Number of months that contributed rows.
    pub fn month_count(&self) -> usize {
        self.periods.len()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn rows(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }
}

/// Unemployment rate for one industry or occupation group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUnemployment {
    pub code: u16,
    pub name: String,
    pub unemployment_rate: Option<f64>,
    /// Weighted labor force in the group, rounded for display.
    pub labor_force: u64,
    pub sample_size: usize,
}

/// A group ranked by weighted employment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEmployment {
    pub code: u16,
    pub name: String,
    pub employment: u64,
}

/// Weighted wage deciles and quartiles for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WagePercentiles {
    pub name: String,
    pub p10: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
    pub sample_size: usize,
}

/// Five-number wage summary for one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WageQuartiles {
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub q2: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// Indicators for a single survey month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    /// Raw rows in the month's batch.
    pub sample_size: usize,
    pub unemployment_rate: Option<f64>,
    #[serde(alias = "min_wage_percentage")]
    pub min_wage_pct: Option<f64>,
    pub labor_force_participation_rate: Option<f64>,
    pub median_hourly_wage: Option<f64>,
    pub parttime_employment_rate: Option<f64>,
    pub youth_participation_rate: Option<f64>,
    pub prime_age_participation_rate: Option<f64>,
    pub median_overtime_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discouraged_rate_per_100k: Option<f64>,
    pub unemployment_by_industry: Vec<GroupUnemployment>,
    pub unemployment_by_occupation: Vec<GroupUnemployment>,
    pub top_industries: Vec<RankedEmployment>,
    pub top_occupations: Vec<RankedEmployment>,
    pub wage_percentiles_by_industry: BTreeMap<u16, WagePercentiles>,
    pub wage_percentiles_by_occupation: BTreeMap<u16, WagePercentiles>,
}

impl MonthlyStats {
    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// Long-window figures for one group over the combined batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    pub code: u16,
    pub name: String,
    pub avg_monthly_employment: Option<f64>,
    /// Percentage of all employment with a valid code.
    pub employment_share: Option<f64>,
    pub wage_quartiles: WageQuartiles,
    pub sample_size: usize,
}

/// A group ranked by median hourly wage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageRank {
    pub code: u16,
    pub name: String,
    pub median_hourly_wage: f64,
    pub sample_size: usize,
}

/// Aggregate section for one dimension, computed over all fetched months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSection {
    pub granularity: Granularity,
    pub months: usize,
    pub groups: Vec<GroupAggregate>,
    pub highest_paying: Vec<WageRank>,
    pub lowest_paying: Vec<WageRank>,
}

/// The complete report artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: String,
    /// Months that actually contributed data.
    pub lookback_months: usize,
    /// Months the run asked for.
    pub requested_months: usize,
    pub monthly: Vec<MonthlyStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industries: Option<AggregateSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupations: Option<AggregateSection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_parse_and_display() {
        let ym: YearMonth = "2024-03".parse().unwrap();
        assert_eq!(ym, YearMonth { year: 2024, month: 3 });
        assert_eq!(ym.to_string(), "2024-03");
        assert_eq!(ym.month_abbrev(), "mar");

        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024".parse::<YearMonth>().is_err());
        assert!("abcd-01".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_window_ending_crosses_year() {
        let end = YearMonth::new(2024, 2).unwrap();
        let window = YearMonth::window_ending(end, 4);
        let labels: Vec<String> = window.iter().map(|m| m.to_string()).collect();
        assert_eq!(labels, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_range_inclusive() {
        let start = YearMonth::new(2023, 11).unwrap();
        let end = YearMonth::new(2024, 1).unwrap();
        assert_eq!(YearMonth::range(start, end).len(), 3);
        assert!(YearMonth::range(end, start).is_empty());
    }

    #[test]
    fn test_status_groups() {
        assert!(EmploymentStatus::from_code(2).unwrap().is_employed());
        assert!(EmploymentStatus::from_code(3).unwrap().is_unemployed());
        assert!(!EmploymentStatus::from_code(5).unwrap().in_labor_force());
        assert_eq!(EmploymentStatus::from_code(-1), None);
    }

    #[test]
    fn test_usual_hours_sets() {
        for code in 3..=7 {
            assert!(UsualHours::from_code(code).unwrap().is_full_time());
        }
        for code in [1, 2, 8] {
            assert!(UsualHours::from_code(code).unwrap().is_part_time());
        }
    }

    #[test]
    fn test_combine_leaves_sources_untouched() {
        let a = RecordBatch::new(
            YearMonth::new(2024, 2).unwrap(),
            vec![Record::default(), Record::default()],
        );
        let b = RecordBatch::new(YearMonth::new(2024, 1).unwrap(), vec![Record::default()]);

        let combined = CombinedBatch::combine(&[a.clone(), b.clone()]);

        assert_eq!(combined.records().len(), 3);
        assert_eq!(combined.month_count(), 2);
        assert_eq!(combined.periods()[0], YearMonth::new(2024, 1).unwrap());
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_min_wage_alias_deserializes() {
        let json = r#"{
            "year": 2024, "month": 1, "sample_size": 0,
            "unemployment_rate": null, "min_wage_percentage": 1.5,
            "labor_force_participation_rate": null, "median_hourly_wage": null,
            "parttime_employment_rate": null, "youth_participation_rate": null,
            "prime_age_participation_rate": null, "median_overtime_hours": null,
            "unemployment_by_industry": [], "unemployment_by_occupation": [],
            "top_industries": [], "top_occupations": [],
            "wage_percentiles_by_industry": {}, "wage_percentiles_by_occupation": {}
        }"#;
        let stats: MonthlyStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.min_wage_pct, Some(1.5));
        assert_eq!(stats.discouraged_rate_per_100k, None);
    }
}
