//! Grouped statistics by industry or occupation code.
//!
//! This module partitions a filtered population by one classification code
//! at one granularity and computes weighted statistics per group. Rows
//! without an applicable code are left out of every group.

use crate::analysis::filters;
use crate::analysis::weighted::{
    wage_values, weighted_count, weighted_max, weighted_min, weighted_percentile, weighted_rate,
    Quantile, Scale, WeightColumn, WeightedCount,
};
use crate::models::{Dimension, Granularity, Record, WageQuartiles};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Groups smaller than this are left out of rankings.
pub const MIN_GROUP_SAMPLE: usize = 30;

/// One group's value for a single metric.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStat {
    pub code: u16,
    pub value: f64,
    /// Raw (unweighted) rows in the group.
    pub sample_size: usize,
}

/// Direction of a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Highest values first.
    Most,
    /// Lowest values first.
    Lowest,
}

/// Unemployment figures for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupUnemploymentStat {
    pub code: u16,
    pub rate: Option<f64>,
    pub labor_force: WeightedCount,
    pub sample_size: usize,
}

/// Weighted wage deciles for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPercentiles {
    pub p10: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
    pub sample_size: usize,
}

/// Partition rows by code. Keys come out in ascending code order.
pub fn group_by_code<'a>(
    rows: &[&'a Record],
    dimension: Dimension,
    granularity: Granularity,
) -> BTreeMap<u16, Vec<&'a Record>> {
    let mut grouped: BTreeMap<u16, Vec<&'a Record>> = BTreeMap::new();

    for record in rows {
        if let Some(code) = record.code(dimension, granularity) {
            grouped.entry(code).or_default().push(*record);
        }
    }

    grouped
}

/// Rank groups, dropping those with fewer than `min_sample` rows.
///
/// Ties on value are broken by code ascending.
pub fn rank_groups(
    stats: &[GroupStat],
    order: RankOrder,
    n: usize,
    min_sample: usize,
) -> Vec<GroupStat> {
    let mut eligible: Vec<GroupStat> = stats
        .iter()
        .filter(|s| s.sample_size >= min_sample)
        .cloned()
        .collect();

    eligible.sort_by(|a, b| {
        let by_value = match order {
            RankOrder::Most => b.value.partial_cmp(&a.value),
            RankOrder::Lowest => a.value.partial_cmp(&b.value),
        };
        by_value
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });
    eligible.truncate(n);
    eligible
}

/// Weighted employment per group. Expects already-employed rows.
pub fn employment_by_group(
    employed: &[&Record],
    dimension: Dimension,
    granularity: Granularity,
) -> Vec<GroupStat> {
    group_by_code(employed, dimension, granularity)
        .into_iter()
        .map(|(code, rows)| GroupStat {
            code,
            value: weighted_count(&rows, WeightColumn::Count).value(),
            sample_size: rows.len(),
        })
        .collect()
}

/// Unemployment rate per group over a labor-force population.
pub fn unemployment_by_group(
    labor_force: &[&Record],
    dimension: Dimension,
    granularity: Granularity,
) -> Vec<GroupUnemploymentStat> {
    group_by_code(labor_force, dimension, granularity)
        .into_iter()
        .map(|(code, rows)| {
            let unemployed = filters::unemployed(&rows);
            GroupUnemploymentStat {
                code,
                rate: weighted_rate(
                    &unemployed,
                    WeightColumn::Count,
                    &rows,
                    WeightColumn::Count,
                    Scale::Percent,
                ),
                labor_force: weighted_count(&rows, WeightColumn::Count),
                sample_size: rows.len(),
            }
        })
        .collect()
}

/// Wage deciles per group, using the given weight column.
pub fn percentiles_by_group(
    wage_earners: &[&Record],
    dimension: Dimension,
    granularity: Granularity,
    column: WeightColumn,
) -> BTreeMap<u16, GroupPercentiles> {
    group_by_code(wage_earners, dimension, granularity)
        .into_iter()
        .map(|(code, rows)| {
            let values = wage_values(&rows, column);
            let stats = GroupPercentiles {
                p10: weighted_percentile(&values, Quantile::P10),
                p25: weighted_percentile(&values, Quantile::P25),
                p50: weighted_percentile(&values, Quantile::P50),
                p75: weighted_percentile(&values, Quantile::P75),
                p90: weighted_percentile(&values, Quantile::P90),
                sample_size: values.len(),
            };
            (code, stats)
        })
        .collect()
}

/// Five-number wage summary per group with its raw sample size.
pub fn quartiles_by_group(
    wage_earners: &[&Record],
    dimension: Dimension,
    granularity: Granularity,
    column: WeightColumn,
) -> BTreeMap<u16, (WageQuartiles, usize)> {
    group_by_code(wage_earners, dimension, granularity)
        .into_iter()
        .map(|(code, rows)| {
            let values = wage_values(&rows, column);
            let quartiles = WageQuartiles {
                min: weighted_min(&values),
                q1: weighted_percentile(&values, Quantile::P25),
                q2: weighted_percentile(&values, Quantile::P50),
                q3: weighted_percentile(&values, Quantile::P75),
                max: weighted_max(&values),
            };
            (code, (quartiles, values.len()))
        })
        .collect()
}

/// Median wage per group. Groups without a computable median are skipped.
pub fn median_wage_by_group(
    wage_earners: &[&Record],
    dimension: Dimension,
    granularity: Granularity,
    column: WeightColumn,
) -> Vec<GroupStat> {
    percentiles_by_group(wage_earners, dimension, granularity, column)
        .into_iter()
        .filter_map(|(code, p)| {
            p.p50.map(|value| GroupStat {
                code,
                value,
                sample_size: p.sample_size,
            })
        })
        .collect()
}

/// Divide a multi-month total by the number of months actually fetched.
pub fn average_monthly(total: f64, months_fetched: usize) -> Option<f64> {
    if months_fetched == 0 {
        None
    } else {
        Some(total / months_fetched as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::weighted::weighted_total;
    use crate::models::EmploymentStatus;

    fn worker(status: i64, industry: Option<u16>, weight: f64) -> Record {
        Record {
            count_weight: weight,
            outgoing_rotation_weight: weight,
            employment_status: EmploymentStatus::from_code(status),
            industry_major: industry,
            ..Record::default()
        }
    }

    fn stat(code: u16, value: f64, sample_size: usize) -> GroupStat {
        GroupStat {
            code,
            value,
            sample_size,
        }
    }

    #[test]
    fn test_group_by_code_excludes_not_applicable() {
        let records = vec![
            worker(1, Some(3), 10.0),
            worker(1, None, 5.0),
            worker(1, Some(1), 2.0),
            worker(1, Some(3), 1.0),
        ];
        let rows: Vec<&Record> = records.iter().collect();

        let grouped = group_by_code(&rows, Dimension::Industry, Granularity::Major);

        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(grouped[&3].len(), 2);
    }

    #[test]
    fn test_employment_sum_matches_total_minus_not_applicable() {
        let records = vec![
            worker(1, Some(3), 10.0),
            worker(2, None, 5.0),
            worker(1, Some(1), 2.5),
            worker(2, Some(3), 1.5),
            worker(4, Some(3), 100.0),
        ];
        let rows: Vec<&Record> = records.iter().collect();
        let employed = filters::employed(&rows);

        let groups = employment_by_group(&employed, Dimension::Industry, Granularity::Major);
        let group_sum: f64 = groups.iter().map(|g| g.value).sum();

        let total = weighted_total(&employed, WeightColumn::Count);
        assert_eq!(total, 19.0);
        assert_eq!(group_sum, total - 5.0);
    }

    #[test]
    fn test_rank_excludes_small_groups() {
        let stats = vec![stat(1, 500.0, 29), stat(2, 100.0, 30), stat(3, 200.0, 45)];

        let top = rank_groups(&stats, RankOrder::Most, 2, MIN_GROUP_SAMPLE);

        assert_eq!(top.iter().map(|s| s.code).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn test_rank_ties_break_by_code() {
        let stats = vec![stat(9, 10.0, 40), stat(2, 10.0, 40), stat(5, 3.0, 40)];

        let most = rank_groups(&stats, RankOrder::Most, 3, MIN_GROUP_SAMPLE);
        assert_eq!(most.iter().map(|s| s.code).collect::<Vec<_>>(), vec![2, 9, 5]);

        let lowest = rank_groups(&stats, RankOrder::Lowest, 3, MIN_GROUP_SAMPLE);
        assert_eq!(lowest.iter().map(|s| s.code).collect::<Vec<_>>(), vec![5, 2, 9]);
    }

    #[test]
    fn test_unemployment_by_group() {
        let records = vec![
            worker(1, Some(3), 30.0),
            worker(3, Some(3), 10.0),
            worker(1, Some(4), 0.0),
        ];
        let rows: Vec<&Record> = records.iter().collect();

        let stats = unemployment_by_group(&rows, Dimension::Industry, Granularity::Major);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].code, 3);
        assert_eq!(stats[0].rate, Some(25.0));
        assert_eq!(stats[0].labor_force.rounded(), 40);
        assert_eq!(stats[0].sample_size, 2);
        // zero-weight group: rate is absent rather than NaN
        assert_eq!(stats[1].rate, None);
    }

    #[test]
    fn test_percentiles_by_group() {
        let records: Vec<Record> = (1..=10)
            .map(|i| Record {
                hourly_earnings: Some(i as f64),
                ..worker(1, Some(7), 1.0)
            })
            .collect();
        let rows: Vec<&Record> = records.iter().collect();

        let table = percentiles_by_group(
            &rows,
            Dimension::Industry,
            Granularity::Major,
            WeightColumn::OutgoingRotation,
        );
        let p = &table[&7];
        assert_eq!(p.p10, Some(1.0));
        assert_eq!(p.p50, Some(5.0));
        assert_eq!(p.p90, Some(9.0));
        assert_eq!(p.sample_size, 10);

        let quartiles = quartiles_by_group(
            &rows,
            Dimension::Industry,
            Granularity::Major,
            WeightColumn::OutgoingRotation,
        );
        let (q, n) = &quartiles[&7];
        assert_eq!(q.min, Some(1.0));
        assert_eq!(q.max, Some(10.0));
        assert_eq!(q.q1, Some(3.0));
        assert_eq!(*n, 10);
    }

    #[test]
    fn test_average_monthly_uses_fetched_count() {
        assert_eq!(average_monthly(300.0, 3), Some(100.0));
        assert_eq!(average_monthly(300.0, 0), None);
    }
}
