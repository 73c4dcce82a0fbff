//! Industry and occupation display names.
//!
//! The tables are built once at startup and handed to the report builder,
//! so aggregation code never reaches for global state.

use crate::models::{Dimension, Granularity};
use std::collections::HashMap;

const INDUSTRY_MAJOR: &[(u16, &str)] = &[
    (1, "Agriculture, forestry, fishing, and hunting"),
    (2, "Mining"),
    (3, "Construction"),
    (4, "Manufacturing"),
    (5, "Wholesale and retail trade"),
    (6, "Transportation and utilities"),
    (7, "Information"),
    (8, "Financial activities"),
    (9, "Professional and business services"),
    (10, "Educational and health services"),
    (11, "Leisure and hospitality"),
    (12, "Other services"),
    (13, "Public administration"),
    (14, "Armed Forces"),
];

const INDUSTRY_DETAILED: &[(u16, &str)] = &[
    (1, "Agriculture"),
    (2, "Forestry, logging, fishing, hunting, and trapping"),
    (3, "Mining, quarrying, and oil and gas extraction"),
    (4, "Construction"),
    (5, "Nonmetallic mineral product manufacturing"),
    (6, "Primary metals and fabricated metal products"),
    (7, "Machinery manufacturing"),
    (8, "Computer and electronic product manufacturing"),
    (9, "Electrical equipment, appliance manufacturing"),
    (10, "Transportation equipment manufacturing"),
    (11, "Wood products"),
    (12, "Furniture and fixtures manufacturing"),
    (13, "Miscellaneous and not specified manufacturing"),
    (14, "Food manufacturing"),
    (15, "Beverage and tobacco products"),
    (16, "Textile, apparel, and leather manufacturing"),
    (17, "Paper and printing"),
    (18, "Petroleum and coal products manufacturing"),
    (19, "Chemical manufacturing"),
    (20, "Plastics and rubber products"),
    (21, "Wholesale trade"),
    (22, "Retail trade"),
    (23, "Transportation and warehousing"),
    (24, "Utilities"),
    (25, "Publishing industries (except internet)"),
    (26, "Motion picture and sound recording industries"),
    (27, "Broadcasting (except internet)"),
    (28, "Internet publishing and broadcasting"),
    (29, "Telecommunications"),
    (30, "Internet service providers and data processing services"),
    (31, "Other information services"),
    (32, "Finance"),
    (33, "Insurance"),
    (34, "Real estate"),
    (35, "Rental and leasing services"),
    (36, "Professional and technical services"),
    (37, "Management of companies and enterprises"),
    (38, "Administrative and support services"),
    (39, "Waste management and remediation services"),
    (40, "Educational services"),
    (41, "Hospitals"),
    (42, "Health care services, except hospitals"),
    (43, "Social assistance"),
    (44, "Arts, entertainment, and recreation"),
    (45, "Accommodation"),
    (46, "Food services and drinking places"),
    (47, "Repair and maintenance"),
    (48, "Personal and laundry services"),
    (49, "Membership associations and organizations"),
    (50, "Private households"),
    (51, "Public administration"),
    (52, "Armed forces"),
];

const OCCUPATION_MAJOR: &[(u16, &str)] = &[
    (1, "Management, business, and financial occupations"),
    (2, "Professional and related occupations"),
    (3, "Service occupations"),
    (4, "Sales and related occupations"),
    (5, "Office and administrative support occupations"),
    (6, "Farming, fishing, and forestry occupations"),
    (7, "Construction and extraction occupations"),
    (8, "Installation, maintenance, and repair occupations"),
    (9, "Production occupations"),
    (10, "Transportation and material moving occupations"),
    (11, "Armed Forces"),
];

const OCCUPATION_DETAILED: &[(u16, &str)] = &[
    (1, "Management occupations"),
    (2, "Business and financial operations occupations"),
    (3, "Computer and mathematical science occupations"),
    (4, "Architecture and engineering occupations"),
    (5, "Life, physical, and social science occupations"),
    (6, "Community and social service occupations"),
    (7, "Legal occupations"),
    (8, "Education, training, and library occupations"),
    (9, "Arts, design, entertainment, sports, and media occupations"),
    (10, "Healthcare practitioner and technical occupations"),
    (11, "Healthcare support occupations"),
    (12, "Protective service occupations"),
    (13, "Food preparation and serving related occupations"),
    (14, "Building and grounds cleaning and maintenance occupations"),
    (15, "Personal care and service occupations"),
    (16, "Sales and related occupations"),
    (17, "Office and administrative support occupations"),
    (18, "Farming, fishing, and forestry occupations"),
    (19, "Construction and extraction occupations"),
    (20, "Installation, maintenance, and repair occupations"),
    (21, "Production occupations"),
    (22, "Transportation and material moving occupations"),
    (23, "Armed Forces"),
];

/// Code-to-name tables for both dimensions at both granularities.
#[derive(Debug, Clone, Default)]
pub struct CodeLookup {
    tables: HashMap<(Dimension, Granularity), HashMap<u16, String>>,
}

impl CodeLookup {
    /// Tables for the current CPS recodes (PRDTIND1, PRMJIND1, PRDTOCC1, PRMJOCC1).
    pub fn cps() -> Self {
        let mut lookup = Self::default();
        lookup.insert_table(Dimension::Industry, Granularity::Major, INDUSTRY_MAJOR);
        lookup.insert_table(Dimension::Industry, Granularity::Detailed, INDUSTRY_DETAILED);
        lookup.insert_table(Dimension::Occupation, Granularity::Major, OCCUPATION_MAJOR);
        lookup.insert_table(
            Dimension::Occupation,
            Granularity::Detailed,
            OCCUPATION_DETAILED,
        );
        lookup
    }

    fn insert_table(&mut self, dimension: Dimension, granularity: Granularity, rows: &[(u16, &str)]) {
        let table = rows
            .iter()
            .map(|(code, name)| (*code, name.to_string()))
            .collect();
        self.tables.insert((dimension, granularity), table);
    }

    /// Display name for a code. Unknown codes get a synthetic label.
    pub fn name(&self, dimension: Dimension, granularity: Granularity, code: u16) -> String {
        self.tables
            .get(&(dimension, granularity))
            .and_then(|table| table.get(&code))
            .cloned()
            .unwrap_or_else(|| format!("{} {}", dimension, code))
    }

    /// Number of known codes for a dimension/granularity.
    #[cfg(test)]
    pub fn len(&self, dimension: Dimension, granularity: Granularity) -> usize {
        self.tables
            .get(&(dimension, granularity))
            .map_or(0, HashMap::len)
    }
}
