//! Monthly indicator records and report assembly.
//!
//! `MonthlyReportBuilder` turns one month's batch into a `MonthlyStats`
//! record and a combined multi-month batch into the aggregate sections.
//! `assemble` folds fetch outcomes into the final `Report`.
//!
//! Code granularity is fixed per metric: unemployment breakdowns and monthly
//! wage percentile tables use major groups, top-N employment rankings and the
//! aggregate sections use detailed codes.

use crate::analysis::aggregator::{
    average_monthly, employment_by_group, median_wage_by_group, percentiles_by_group,
    quartiles_by_group, rank_groups, unemployment_by_group, GroupStat, RankOrder,
};
use crate::analysis::filters::{self, Cohort};
use crate::analysis::weighted::{
    hours_values, round2, round2_opt, wage_values, weighted_median, weighted_rate, weighted_total,
    Scale, WeightColumn, WeightedCount,
};
use crate::config::StatsConfig;
use crate::fetch::MonthOutcome;
use crate::lookup::CodeLookup;
use crate::models::{
    AggregateSection, CombinedBatch, Dimension, GroupAggregate, GroupUnemployment, Granularity,
    MonthlyStats, RankedEmployment, Record, RecordBatch, Report, WagePercentiles, WageQuartiles,
    WageRank,
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Granularity for per-group unemployment and monthly wage tables.
const BREAKDOWN_GRANULARITY: Granularity = Granularity::Major;
/// Granularity for employment rankings and long-window sections.
const RANKING_GRANULARITY: Granularity = Granularity::Detailed;

/// Reasons a report cannot be produced.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("none of the {requested} requested months could be fetched")]
    NoMonthsFetched { requested: usize },
}

/// Statistic parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSettings {
    pub min_wage: f64,
    pub min_group_size: usize,
    pub top_n: usize,
    pub overtime_baseline: f64,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self::from(&StatsConfig::default())
    }
}

impl From<&StatsConfig> for StatsSettings {
    fn from(config: &StatsConfig) -> Self {
        Self {
            min_wage: config.min_wage,
            min_group_size: config.min_group_size,
            top_n: config.top_n,
            overtime_baseline: config.overtime_baseline,
        }
    }
}

/// Unemployed share of the labor force.
pub fn unemployment_rate(rows: &[&Record]) -> Option<f64> {
    let labor_force = filters::labor_force(rows);
    let unemployed = filters::unemployed(&labor_force);
    weighted_rate(
        &unemployed,
        WeightColumn::Count,
        &labor_force,
        WeightColumn::Count,
        Scale::Percent,
    )
}

/// Labor force share of the in-universe population in `rows`.
pub fn participation_rate(rows: &[&Record]) -> Option<f64> {
    let population = filters::in_universe(rows);
    let labor_force = filters::labor_force(&population);
    weighted_rate(
        &labor_force,
        WeightColumn::Count,
        &population,
        WeightColumn::Count,
        Scale::Percent,
    )
}

/// Share of hourly private-sector workers paid at or below `threshold`.
///
/// The numerator is weighted with the outgoing rotation weight and the
/// denominator with the count weight.
pub fn min_wage_pct(rows: &[&Record], threshold: f64) -> Option<f64> {
    let hourly_private = filters::employed_hourly_private(rows);
    let at_or_below: Vec<&Record> = filters::valid_wage(&hourly_private)
        .into_iter()
        .filter(|r| r.hourly_earnings.is_some_and(|w| w <= threshold))
        .collect();
    weighted_rate(
        &at_or_below,
        WeightColumn::OutgoingRotation,
        &hourly_private,
        WeightColumn::Count,
        Scale::Percent,
    )
}

/// Median hourly wage among employed wage earners.
pub fn median_hourly_wage(rows: &[&Record]) -> Option<f64> {
    let earners = filters::select(rows, &[Cohort::Employed, Cohort::ValidWage]);
    weighted_median(&wage_values(&earners, WeightColumn::OutgoingRotation))
}

/// Part-time share of employment.
pub fn parttime_employment_rate(rows: &[&Record]) -> Option<f64> {
    let employed = filters::employed(rows);
    let part_time = filters::part_time(&employed);
    weighted_rate(
        &part_time,
        WeightColumn::Count,
        &employed,
        WeightColumn::Count,
        Scale::Percent,
    )
}

/// Median actual hours of full-time workers minus `baseline`. May be negative.
pub fn median_overtime_hours(rows: &[&Record], baseline: f64) -> Option<f64> {
    let full_time = filters::full_time(&filters::employed(rows));
    let with_hours = filters::with_actual_hours(&full_time);
    weighted_median(&hours_values(&with_hours, WeightColumn::Count)).map(|h| h - baseline)
}

/// Discouraged workers per 100,000 in-universe persons.
pub fn discouraged_rate_per_100k(rows: &[&Record]) -> Option<f64> {
    let population = filters::in_universe(rows);
    let discouraged = Cohort::Discouraged.apply(&population);
    weighted_rate(
        &discouraged,
        WeightColumn::Count,
        &population,
        WeightColumn::Count,
        Scale::Per100k,
    )
}

/// Builds monthly records and aggregate sections.
pub struct MonthlyReportBuilder<'a> {
    lookup: &'a CodeLookup,
    settings: &'a StatsSettings,
}

impl<'a> MonthlyReportBuilder<'a> {
    pub fn new(lookup: &'a CodeLookup, settings: &'a StatsSettings) -> Self {
        Self { lookup, settings }
    }

    /// Compute every indicator for one month.
    pub fn build(&self, batch: &RecordBatch) -> MonthlyStats {
        let period = batch.period();
        // Every labor-force metric shares this universe
        let universe = filters::in_universe(&batch.rows());
        let labor_force = filters::labor_force(&universe);
        let employed = filters::employed(&universe);

        debug!(
            "{}: {} in universe, {} in labor force, {} employed",
            period,
            universe.len(),
            labor_force.len(),
            employed.len()
        );

        let discouraged = if batch.has_discouraged() {
            discouraged_rate_per_100k(&universe)
        } else {
            None
        };

        let wage_earners = filters::valid_wage(&employed);

        MonthlyStats {
            year: period.year,
            month: period.month,
            sample_size: batch.len(),
            unemployment_rate: round2_opt(unemployment_rate(&universe)),
            min_wage_pct: round2_opt(min_wage_pct(&universe, self.settings.min_wage)),
            labor_force_participation_rate: round2_opt(participation_rate(&universe)),
            median_hourly_wage: round2_opt(median_hourly_wage(&universe)),
            parttime_employment_rate: round2_opt(parttime_employment_rate(&universe)),
            youth_participation_rate: round2_opt(participation_rate(&filters::youth(&universe))),
            prime_age_participation_rate: round2_opt(participation_rate(&filters::prime_age(
                &universe,
            ))),
            median_overtime_hours: round2_opt(median_overtime_hours(
                &universe,
                self.settings.overtime_baseline,
            )),
            discouraged_rate_per_100k: round2_opt(discouraged),
            unemployment_by_industry: self.unemployment_table(&labor_force, Dimension::Industry),
            unemployment_by_occupation: self
                .unemployment_table(&labor_force, Dimension::Occupation),
            top_industries: self.top_employment(&employed, Dimension::Industry),
            top_occupations: self.top_employment(&employed, Dimension::Occupation),
            wage_percentiles_by_industry: self.percentile_table(&wage_earners, Dimension::Industry),
            wage_percentiles_by_occupation: self
                .percentile_table(&wage_earners, Dimension::Occupation),
        }
    }

    fn unemployment_table(
        &self,
        labor_force: &[&Record],
        dimension: Dimension,
    ) -> Vec<GroupUnemployment> {
        unemployment_by_group(labor_force, dimension, BREAKDOWN_GRANULARITY)
            .into_iter()
            .map(|g| GroupUnemployment {
                code: g.code,
                name: self.lookup.name(dimension, BREAKDOWN_GRANULARITY, g.code),
                unemployment_rate: round2_opt(g.rate),
                labor_force: g.labor_force.rounded(),
                sample_size: g.sample_size,
            })
            .collect()
    }

    fn top_employment(&self, employed: &[&Record], dimension: Dimension) -> Vec<RankedEmployment> {
        let groups = employment_by_group(employed, dimension, RANKING_GRANULARITY);
        rank_groups(
            &groups,
            RankOrder::Most,
            self.settings.top_n,
            self.settings.min_group_size,
        )
        .into_iter()
        .map(|g| RankedEmployment {
            code: g.code,
            name: self.lookup.name(dimension, RANKING_GRANULARITY, g.code),
            employment: WeightedCount(g.value).rounded(),
        })
        .collect()
    }

    fn percentile_table(
        &self,
        wage_earners: &[&Record],
        dimension: Dimension,
    ) -> BTreeMap<u16, WagePercentiles> {
        percentiles_by_group(
            wage_earners,
            dimension,
            BREAKDOWN_GRANULARITY,
            WeightColumn::OutgoingRotation,
        )
        .into_iter()
        .map(|(code, p)| {
            let row = WagePercentiles {
                name: self.lookup.name(dimension, BREAKDOWN_GRANULARITY, code),
                p10: round2_opt(p.p10),
                p25: round2_opt(p.p25),
                p50: round2_opt(p.p50),
                p75: round2_opt(p.p75),
                p90: round2_opt(p.p90),
                sample_size: p.sample_size,
            };
            (code, row)
        })
        .collect()
    }

    /// Long-window section for one dimension over a combined batch.
    pub fn build_aggregates(
        &self,
        combined: &CombinedBatch,
        dimension: Dimension,
    ) -> AggregateSection {
        let rows = combined.rows();
        let employed = filters::employed(&rows);
        let coded = filters::with_code(&employed, dimension, RANKING_GRANULARITY);
        let coded_total = weighted_total(&coded, WeightColumn::Count);
        let months = combined.month_count();

        let wage_earners = filters::valid_wage(&employed);
        let mut quartiles = quartiles_by_group(
            &wage_earners,
            dimension,
            RANKING_GRANULARITY,
            WeightColumn::OutgoingRotation,
        );

        let employment = employment_by_group(&coded, dimension, RANKING_GRANULARITY);
        let groups: Vec<GroupAggregate> = employment
            .into_iter()
            .map(|g| {
                let wage_quartiles = quartiles
                    .remove(&g.code)
                    .map(|(q, _)| round_quartiles(q))
                    .unwrap_or_default();
                GroupAggregate {
                    code: g.code,
                    name: self.lookup.name(dimension, RANKING_GRANULARITY, g.code),
                    avg_monthly_employment: round2_opt(average_monthly(g.value, months)),
                    employment_share: (coded_total > 0.0)
                        .then(|| round2(100.0 * g.value / coded_total)),
                    wage_quartiles,
                    sample_size: g.sample_size,
                }
            })
            .collect();

        let medians = median_wage_by_group(
            &wage_earners,
            dimension,
            RANKING_GRANULARITY,
            WeightColumn::OutgoingRotation,
        );

        AggregateSection {
            granularity: RANKING_GRANULARITY,
            months,
            groups,
            highest_paying: self.wage_ranking(&medians, RankOrder::Most, dimension),
            lowest_paying: self.wage_ranking(&medians, RankOrder::Lowest, dimension),
        }
    }

    fn wage_ranking(
        &self,
        medians: &[GroupStat],
        order: RankOrder,
        dimension: Dimension,
    ) -> Vec<WageRank> {
        rank_groups(
            medians,
            order,
            self.settings.top_n,
            self.settings.min_group_size,
        )
        .into_iter()
        .map(|g| WageRank {
            code: g.code,
            name: self.lookup.name(dimension, RANKING_GRANULARITY, g.code),
            median_hourly_wage: round2(g.value),
            sample_size: g.sample_size,
        })
        .collect()
    }
}

fn round_quartiles(q: WageQuartiles) -> WageQuartiles {
    WageQuartiles {
        min: round2_opt(q.min),
        q1: round2_opt(q.q1),
        q2: round2_opt(q.q2),
        q3: round2_opt(q.q3),
        max: round2_opt(q.max),
    }
}

/// Fold fetch outcomes into the final report.
///
/// Failed months are dropped and logged. Monthly records come out sorted by
/// (year, month) whatever order the outcomes arrived in.
pub fn assemble(
    outcomes: Vec<MonthOutcome>,
    requested: usize,
    builder: &MonthlyReportBuilder<'_>,
    include_aggregates: bool,
    generated_at: DateTime<Utc>,
) -> Result<Report, ReportError> {
    let mut batches: Vec<RecordBatch> = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.result {
            Ok(batch) if batch.is_empty() => warn!("Skipping {}: empty batch", outcome.period),
            Ok(batch) => batches.push(batch),
            Err(e) => warn!("Skipping {}: {}", outcome.period, e),
        }
    }

    if batches.is_empty() {
        return Err(ReportError::NoMonthsFetched { requested });
    }

    batches.sort_by_key(RecordBatch::period);

    let monthly: Vec<MonthlyStats> = batches
        .iter()
        .map(|batch| {
            info!("Computing statistics for {}", batch.period());
            builder.build(batch)
        })
        .collect();

    let (industries, occupations) = if include_aggregates {
        let combined = CombinedBatch::combine(&batches);
        let periods = combined.periods();
        if let (Some(first), Some(last)) = (periods.first(), periods.last()) {
            info!(
                "Computing aggregates over {} months, {} to {} ({} rows)",
                combined.month_count(),
                first,
                last,
                combined.records().len()
            );
        }
        (
            Some(builder.build_aggregates(&combined, Dimension::Industry)),
            Some(builder.build_aggregates(&combined, Dimension::Occupation)),
        )
    } else {
        (None, None)
    };

    Ok(Report {
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        lookback_months: batches.len(),
        requested_months: requested,
        monthly,
        industries,
        occupations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::models::{ClassOfWorker, EmploymentStatus, UsualHours, YearMonth};

    fn employed_hourly_private(wage: f64, weight: f64) -> Record {
        Record {
            count_weight: weight,
            outgoing_rotation_weight: weight,
            hourly_earnings: Some(wage),
            employment_status: Some(EmploymentStatus::EmployedAtWork),
            class_of_worker: Some(ClassOfWorker::PrivateForProfit),
            paid_hourly: Some(true),
            age: Some(30),
            ..Record::default()
        }
    }

    fn person(status: i64, age: u8, weight: f64) -> Record {
        Record {
            count_weight: weight,
            outgoing_rotation_weight: weight,
            employment_status: EmploymentStatus::from_code(status),
            age: Some(age),
            ..Record::default()
        }
    }

    fn rows(records: &[Record]) -> Vec<&Record> {
        records.iter().collect()
    }

    fn period(month: u32) -> YearMonth {
        YearMonth::new(2024, month).unwrap()
    }

    #[test]
    fn test_min_wage_scenario() {
        let records = vec![
            employed_hourly_private(7.00, 100.0),
            employed_hourly_private(15.00, 200.0),
            person(5, 70, 500.0),
        ];

        let pct = min_wage_pct(&rows(&records), 7.25).unwrap();
        assert_eq!(round2(pct), 33.33);
    }

    #[test]
    fn test_min_wage_uses_orw_over_count_weight() {
        let mut low = employed_hourly_private(7.00, 100.0);
        low.outgoing_rotation_weight = 50.0;
        let high = employed_hourly_private(15.00, 100.0);
        let records = vec![low, high];

        // 50 (ORW) / 200 (count weight)
        assert_eq!(min_wage_pct(&rows(&records), 7.25), Some(25.0));
    }

    #[test]
    fn test_min_wage_without_hourly_workers_is_none() {
        let records = vec![person(1, 30, 10.0), person(5, 70, 10.0)];
        assert_eq!(min_wage_pct(&rows(&records), 7.25), None);
    }

    #[test]
    fn test_unemployment_and_participation() {
        let records = vec![
            person(1, 30, 60.0),
            person(2, 40, 20.0),
            person(4, 22, 20.0),
            person(5, 70, 100.0),
        ];
        let rows = rows(&records);

        assert_eq!(unemployment_rate(&rows), Some(20.0));
        assert_eq!(participation_rate(&rows), Some(50.0));
    }

    #[test]
    fn test_under_sixteen_counts_in_every_labor_force_metric() {
        let lookup = CodeLookup::cps();
        let settings = StatsSettings::default();
        let builder = MonthlyReportBuilder::new(&lookup, &settings);
        let records = vec![person(4, 15, 100.0), person(1, 30, 100.0)];

        let stats = builder.build(&RecordBatch::new(period(6), records));

        // one labor force of 200 behind both rates
        assert_eq!(stats.unemployment_rate, Some(50.0));
        assert_eq!(stats.labor_force_participation_rate, Some(100.0));
        assert_eq!(stats.youth_participation_rate, Some(100.0));
        assert_eq!(stats.prime_age_participation_rate, Some(100.0));
    }

    #[test]
    fn test_count_weight_rates_stay_within_percent_bounds() {
        let lookup = CodeLookup::cps();
        let settings = StatsSettings::default();
        let builder = MonthlyReportBuilder::new(&lookup, &settings);
        let records: Vec<Record> = (0..300i64)
            .map(|i| Record {
                usual_hours: UsualHours::from_code(i % 8 + 1),
                ..person(i % 7 + 1, (15 + (i * 7) % 60) as u8, ((i * 37) % 101) as f64 + 0.5)
            })
            .collect();

        let stats = builder.build(&RecordBatch::new(period(7), records));

        for rate in [
            stats.unemployment_rate,
            stats.labor_force_participation_rate,
            stats.youth_participation_rate,
            stats.prime_age_participation_rate,
            stats.parttime_employment_rate,
        ] {
            let rate = rate.unwrap();
            assert!((0.0..=100.0).contains(&rate), "rate {} out of bounds", rate);
        }
    }

    #[test]
    fn test_sentinel_rows_do_not_change_median() {
        let mut records = vec![
            employed_hourly_private(5.0, 10.0),
            employed_hourly_private(10.0, 10.0),
            employed_hourly_private(20.0, 10.0),
        ];
        let before = median_hourly_wage(&rows(&records));

        for _ in 0..5 {
            records.push(Record {
                hourly_earnings: None,
                ..employed_hourly_private(0.0, 50.0)
            });
        }
        let after = median_hourly_wage(&rows(&records));

        assert_eq!(before, Some(10.0));
        assert_eq!(after, before);
    }

    #[test]
    fn test_overtime_may_be_negative() {
        let make = |hours: u16, usual: i64| Record {
            actual_hours: Some(hours),
            usual_hours: UsualHours::from_code(usual),
            ..person(1, 40, 1.0)
        };
        let records = vec![make(32, 4), make(36, 3), make(38, 4), make(60, 8)];

        // part-time row (code 8) is excluded; median of 32, 36, 38 is 36
        assert_eq!(median_overtime_hours(&rows(&records), 40.0), Some(-4.0));
        assert_eq!(median_overtime_hours(&[], 40.0), None);
    }

    #[test]
    fn test_parttime_rate() {
        let make = |usual: i64, weight: f64| Record {
            usual_hours: UsualHours::from_code(usual),
            ..person(1, 40, weight)
        };
        let records = vec![make(1, 25.0), make(8, 25.0), make(4, 50.0), person(5, 40, 80.0)];
        assert_eq!(parttime_employment_rate(&rows(&records)), Some(50.0));
    }

    #[test]
    fn test_build_month() {
        let lookup = CodeLookup::cps();
        let settings = StatsSettings::default();
        let builder = MonthlyReportBuilder::new(&lookup, &settings);

        let mut records: Vec<Record> = (0..40)
            .map(|i| Record {
                industry_major: Some(4),
                industry_detailed: Some(7),
                occupation_major: Some(9),
                occupation_detailed: Some(21),
                ..employed_hourly_private(10.0 + i as f64, 100.0)
            })
            .collect();
        records.push(person(4, 17, 100.0));
        records.push(Record {
            industry_major: Some(99),
            ..person(3, 30, 100.0)
        });

        let batch = RecordBatch::new(period(3), records);
        let stats = builder.build(&batch);

        assert_eq!(stats.year, 2024);
        assert_eq!(stats.month, 3);
        assert_eq!(stats.sample_size, 42);
        assert_eq!(stats.unemployment_rate, Some(4.76));
        assert_eq!(stats.min_wage_pct, Some(0.0));
        assert_eq!(stats.median_hourly_wage, Some(29.0));
        assert_eq!(stats.median_overtime_hours, None);
        assert_eq!(stats.discouraged_rate_per_100k, None);

        assert_eq!(stats.top_industries.len(), 1);
        assert_eq!(stats.top_industries[0].code, 7);
        assert_eq!(stats.top_industries[0].name, "Machinery manufacturing");
        assert_eq!(stats.top_industries[0].employment, 4000);

        assert_eq!(stats.unemployment_by_industry.len(), 2);
        assert_eq!(stats.unemployment_by_industry[0].unemployment_rate, Some(0.0));
        assert_eq!(stats.unemployment_by_industry[1].name, "Industry 99");
        assert_eq!(stats.unemployment_by_industry[1].unemployment_rate, Some(100.0));

        let manufacturing = &stats.wage_percentiles_by_industry[&4];
        assert_eq!(manufacturing.name, "Manufacturing");
        assert_eq!(manufacturing.sample_size, 40);
        assert_eq!(manufacturing.p50, Some(29.0));
    }

    #[test]
    fn test_top_rankings_skip_small_groups() {
        let lookup = CodeLookup::default();
        let settings = StatsSettings::default();
        let builder = MonthlyReportBuilder::new(&lookup, &settings);

        let mut records: Vec<Record> = (0..30)
            .map(|_| Record {
                industry_detailed: Some(1),
                ..person(1, 40, 10.0)
            })
            .collect();
        // heavily weighted but only 5 raw rows
        records.extend((0..5).map(|_| Record {
            industry_detailed: Some(2),
            ..person(1, 40, 10_000.0)
        }));

        let stats = builder.build(&RecordBatch::new(period(1), records));

        assert_eq!(stats.top_industries.len(), 1);
        assert_eq!(stats.top_industries[0].code, 1);
    }

    #[test]
    fn test_aggregates_use_fetched_month_count() {
        let lookup = CodeLookup::cps();
        let settings = StatsSettings::default();
        let builder = MonthlyReportBuilder::new(&lookup, &settings);

        let month = |m: u32| {
            let records = vec![
                Record {
                    industry_detailed: Some(36),
                    ..employed_hourly_private(30.0, 300.0)
                },
                Record {
                    industry_detailed: Some(46),
                    ..employed_hourly_private(12.0, 100.0)
                },
                Record {
                    industry_detailed: None,
                    ..employed_hourly_private(12.0, 1000.0)
                },
            ];
            RecordBatch::new(period(m), records)
        };
        let outcomes = vec![
            MonthOutcome {
                period: period(3),
                result: Ok(month(3)),
            },
            MonthOutcome {
                period: period(2),
                result: Err(FetchError::NoData),
            },
            MonthOutcome {
                period: period(1),
                result: Ok(month(1)),
            },
        ];

        let report = assemble(outcomes, 3, &builder, true, Utc::now()).unwrap();

        assert_eq!(report.lookback_months, 2);
        assert_eq!(report.requested_months, 3);
        let months: Vec<u32> = report.monthly.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 3]);

        let industries = report.industries.unwrap();
        assert_eq!(industries.months, 2);
        assert_eq!(industries.groups.len(), 2);
        let professional = &industries.groups[0];
        assert_eq!(professional.code, 36);
        assert_eq!(professional.avg_monthly_employment, Some(300.0));
        assert_eq!(professional.employment_share, Some(75.0));
        assert_eq!(professional.wage_quartiles.q2, Some(30.0));
        // two rows per group is below the ranking threshold
        assert!(industries.highest_paying.is_empty());
    }

    #[test]
    fn test_assemble_without_aggregates() {
        let lookup = CodeLookup::cps();
        let settings = StatsSettings::default();
        let builder = MonthlyReportBuilder::new(&lookup, &settings);
        let outcomes = vec![MonthOutcome {
            period: period(5),
            result: Ok(RecordBatch::new(period(5), vec![person(1, 30, 1.0)])),
        }];

        let report = assemble(outcomes, 1, &builder, false, Utc::now()).unwrap();

        assert!(report.industries.is_none());
        assert!(report.occupations.is_none());
        assert!(report.generated_at.ends_with('Z'));
    }

    #[test]
    fn test_assemble_fails_when_nothing_fetched() {
        let lookup = CodeLookup::cps();
        let settings = StatsSettings::default();
        let builder = MonthlyReportBuilder::new(&lookup, &settings);
        let outcomes = vec![MonthOutcome {
            period: period(1),
            result: Err(FetchError::NoData),
        }];

        let err = assemble(outcomes, 1, &builder, true, Utc::now()).unwrap_err();
        assert!(matches!(err, ReportError::NoMonthsFetched { requested: 1 }));
    }

    #[test]
    fn test_discouraged_rate_when_field_present() {
        let lookup = CodeLookup::cps();
        let settings = StatsSettings::default();
        let builder = MonthlyReportBuilder::new(&lookup, &settings);
        let records = vec![
            Record {
                discouraged: Some(true),
                ..person(7, 40, 1.0)
            },
            Record {
                discouraged: Some(false),
                ..person(1, 40, 999.0)
            },
        ];

        let stats = builder.build(&RecordBatch::new(period(1), records));
        assert_eq!(stats.discouraged_rate_per_100k, Some(100.0));
    }
}
