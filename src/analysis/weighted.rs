//! Weighted statistics over filtered populations.
//!
//! Every function takes the weight column explicitly. Count-type
//! statistics use the composited final weight, earnings statistics use the
//! outgoing rotation weight, and minimum-wage incidence uses one for each
//! side of the ratio. Nothing here rounds; rounding happens in the report
//! layer via [`round2`].

use crate::models::Record;
use std::cmp::Ordering;

/// Which weight column to sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightColumn {
    Count,
    OutgoingRotation,
}

impl Record {
    /// The weight for a column. Negative weights are treated as zero.
    pub fn weight(&self, column: WeightColumn) -> f64 {
        let w = match column {
            WeightColumn::Count => self.count_weight,
            WeightColumn::OutgoingRotation => self.outgoing_rotation_weight,
        };
        if w.is_finite() && w > 0.0 {
            w
        } else {
            0.0
        }
    }
}

/// Multiplier applied to a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Percent,
    Per100k,
}

impl Scale {
    pub fn factor(&self) -> f64 {
        match self {
            Scale::Percent => 100.0,
            Scale::Per100k => 100_000.0,
        }
    }
}

/// Supported weighted quantiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantile {
    P10,
    P25,
    P50,
    P75,
    P90,
}

impl Quantile {
    pub fn fraction(&self) -> f64 {
        match self {
            Quantile::P10 => 0.10,
            Quantile::P25 => 0.25,
            Quantile::P50 => 0.50,
            Quantile::P75 => 0.75,
            Quantile::P90 => 0.90,
        }
    }
}

/// A weighted population count. Kept as a float for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedCount(pub f64);

impl WeightedCount {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Nearest whole person, for display only.
    pub fn rounded(&self) -> u64 {
        self.0.max(0.0).round() as u64
    }
}

/// Sum of a weight column over the rows.
pub fn weighted_total(rows: &[&Record], column: WeightColumn) -> f64 {
    rows.iter().map(|r| r.weight(column)).sum()
}

pub fn weighted_count(rows: &[&Record], column: WeightColumn) -> WeightedCount {
    WeightedCount(weighted_total(rows, column))
}

/// `scale * weighted(numerator) / weighted(denominator)`.
///
/// Returns `None` when the denominator has no weight. The numerator rows are
/// expected to be a subset of the denominator population.
pub fn weighted_rate(
    numerator: &[&Record],
    numerator_column: WeightColumn,
    denominator: &[&Record],
    denominator_column: WeightColumn,
    scale: Scale,
) -> Option<f64> {
    let denom = weighted_total(denominator, denominator_column);
    if denom <= 0.0 {
        return None;
    }
    let num = weighted_total(numerator, numerator_column);
    Some(scale.factor() * num / denom)
}

/// Weighted order-statistic quantile over `(value, weight)` pairs.
///
/// Sorts by value, accumulates weight, and returns the value at the first
/// position where the running total reaches `q * total`. No interpolation.
pub fn weighted_percentile(values: &[(f64, f64)], q: Quantile) -> Option<f64> {
    percentile_at(values, q.fraction())
}

pub fn weighted_median(values: &[(f64, f64)]) -> Option<f64> {
    weighted_percentile(values, Quantile::P50)
}

fn percentile_at(values: &[(f64, f64)], fraction: f64) -> Option<f64> {
    let sorted = sorted_positive(values);
    let total: f64 = sorted.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return None;
    }

    let threshold = fraction * total;
    let mut cumulative = 0.0;
    for (value, weight) in &sorted {
        cumulative += weight;
        if cumulative >= threshold {
            return Some(*value);
        }
    }
    // Floating-point shortfall at the top end
    sorted.last().map(|(v, _)| *v)
}

/// Smallest value carrying positive weight.
pub fn weighted_min(values: &[(f64, f64)]) -> Option<f64> {
    sorted_positive(values).first().map(|(v, _)| *v)
}

/// Largest value carrying positive weight.
pub fn weighted_max(values: &[(f64, f64)]) -> Option<f64> {
    sorted_positive(values).last().map(|(v, _)| *v)
}

fn sorted_positive(values: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<(f64, f64)> = values
        .iter()
        .copied()
        .filter(|(v, w)| v.is_finite() && w.is_finite() && *w > 0.0)
        .collect();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    sorted
}

/// Pair each row's valid hourly wage with its weight. Rows without a wage
/// are skipped.
pub fn wage_values(rows: &[&Record], column: WeightColumn) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|r| match r.hourly_earnings {
            Some(w) if w > 0.0 => Some((w, r.weight(column))),
            _ => None,
        })
        .collect()
}

/// Pair each row's actual hours with its weight.
pub fn hours_values(rows: &[&Record], column: WeightColumn) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|r| r.actual_hours.map(|h| (f64::from(h), r.weight(column))))
        .collect()
}

/// Round to two decimals for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round2_opt(value: Option<f64>) -> Option<f64> {
    value.map(round2)
}
