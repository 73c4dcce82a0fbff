//! Survey-weighted analysis.
//!
//! Cohort filters select sub-populations, weighted statistics reduce them to
//! rates and quantiles, and the aggregator repeats that per industry or
//! occupation group.

pub mod aggregator;
pub mod filters;
pub mod weighted;
