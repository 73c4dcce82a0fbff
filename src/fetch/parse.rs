//! Conversion of Census API tables into typed records.
//!
//! The API answers with a JSON array of rows whose first row is the header.
//! Every cell is decoded here, once; sentinels and unparseable cells become
//! `None` (or a zero weight) instead of aborting the batch.

use super::FetchError;
use crate::models::{ClassOfWorker, EmploymentStatus, Record, RecordBatch, UsualHours, YearMonth};
use serde_json::Value;
use std::collections::HashMap;

/// Variables every vintage must provide.
pub const CORE_VARIABLES: &[&str] = &[
    "PWCMPWGT", "PWORWGT", "PTERNHLY", "PEMLR", "PEIO1COW", "PEERNHRY", "PRHRUSL", "PEHRACTT",
    "PRDTIND1", "PRMJIND1", "PRDTOCC1", "PRMJOCC1", "PRTAGE",
];

/// Variables that only some vintages publish.
pub const OPTIONAL_VARIABLES: &[&str] = &["PRDISC"];

struct Columns {
    count_weight: usize,
    orw: usize,
    hourly_earnings: usize,
    status: usize,
    class_of_worker: usize,
    paid_hourly: usize,
    usual_hours: usize,
    actual_hours: usize,
    industry_detailed: usize,
    industry_major: usize,
    occupation_detailed: usize,
    occupation_major: usize,
    age: usize,
    discouraged: Option<usize>,
}

impl Columns {
    fn from_header(header: &[Value]) -> Result<Self, FetchError> {
        let index: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_str().map(|name| (name.trim().to_uppercase(), i)))
            .collect();

        let required = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| FetchError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            count_weight: required("PWCMPWGT")?,
            orw: required("PWORWGT")?,
            hourly_earnings: required("PTERNHLY")?,
            status: required("PEMLR")?,
            class_of_worker: required("PEIO1COW")?,
            paid_hourly: required("PEERNHRY")?,
            usual_hours: required("PRHRUSL")?,
            actual_hours: required("PEHRACTT")?,
            industry_detailed: required("PRDTIND1")?,
            industry_major: required("PRMJIND1")?,
            occupation_detailed: required("PRDTOCC1")?,
            occupation_major: required("PRMJOCC1")?,
            age: required("PRTAGE")?,
            discouraged: index.get("PRDISC").copied(),
        })
    }
}

/// Parse a Census API response body into a batch for `period`.
pub fn parse_table(period: YearMonth, body: &str) -> Result<RecordBatch, FetchError> {
    let table: Vec<Vec<Value>> =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    parse_rows(period, table)
}

/// Build a batch from already-decoded rows (header first).
pub fn parse_rows(period: YearMonth, table: Vec<Vec<Value>>) -> Result<RecordBatch, FetchError> {
    let mut rows = table.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| FetchError::Parse("empty response".to_string()))?;
    let columns = Columns::from_header(&header)?;

    let records: Vec<Record> = rows.map(|row| parse_record(&row, &columns)).collect();
    if records.is_empty() {
        return Err(FetchError::NoData);
    }

    Ok(RecordBatch::new(period, records))
}

fn parse_record(row: &[Value], columns: &Columns) -> Record {
    Record {
        count_weight: weight(row, columns.count_weight),
        outgoing_rotation_weight: weight(row, columns.orw),
        hourly_earnings: cell_f64(row, columns.hourly_earnings).filter(|w| *w >= 0.0),
        employment_status: cell_i64(row, columns.status).and_then(EmploymentStatus::from_code),
        class_of_worker: cell_i64(row, columns.class_of_worker).and_then(ClassOfWorker::from_code),
        paid_hourly: match cell_i64(row, columns.paid_hourly) {
            Some(1) => Some(true),
            Some(2) => Some(false),
            _ => None,
        },
        usual_hours: cell_i64(row, columns.usual_hours).and_then(UsualHours::from_code),
        actual_hours: cell_i64(row, columns.actual_hours).and_then(|h| u16::try_from(h).ok()),
        industry_detailed: code(row, columns.industry_detailed),
        industry_major: code(row, columns.industry_major),
        occupation_detailed: code(row, columns.occupation_detailed),
        occupation_major: code(row, columns.occupation_major),
        age: cell_i64(row, columns.age).and_then(|a| u8::try_from(a).ok()),
        discouraged: columns
            .discouraged
            .map(|idx| cell_i64(row, idx) == Some(1)),
    }
}

fn cell_f64(row: &[Value], idx: usize) -> Option<f64> {
    let value = match row.get(idx)? {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn cell_i64(row: &[Value], idx: usize) -> Option<i64> {
    match row.get(idx)? {
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

fn weight(row: &[Value], idx: usize) -> f64 {
    cell_f64(row, idx).filter(|w| *w > 0.0).unwrap_or(0.0)
}

/// Classification codes: 0 and negatives mean "not applicable".
fn code(row: &[Value], idx: usize) -> Option<u16> {
    cell_i64(row, idx)
        .filter(|c| *c > 0)
        .and_then(|c| u16::try_from(c).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"["PWCMPWGT","PWORWGT","PTERNHLY","PEMLR","PEIO1COW","PEERNHRY","PRHRUSL","PEHRACTT","PRDTIND1","PRMJIND1","PRDTOCC1","PRMJOCC1","PRTAGE""#;

    fn period() -> YearMonth {
        YearMonth::new(2024, 1).unwrap()
    }

    #[test]
    fn test_parse_typed_row() {
        let body = format!(
            "[{}],\n[\"1500.5\",\"3200.25\",\"18.50\",\"1\",\"4\",\"1\",\"4\",\"42\",\"22\",\"5\",\"16\",\"4\",\"34\"]]",
            HEADER
        );

        let batch = parse_table(period(), &body).unwrap();
        let r = &batch.records()[0];

        assert_eq!(batch.len(), 1);
        assert_eq!(r.count_weight, 1500.5);
        assert_eq!(r.outgoing_rotation_weight, 3200.25);
        assert_eq!(r.hourly_earnings, Some(18.5));
        assert_eq!(r.employment_status, Some(EmploymentStatus::EmployedAtWork));
        assert_eq!(r.class_of_worker, Some(ClassOfWorker::PrivateForProfit));
        assert_eq!(r.paid_hourly, Some(true));
        assert_eq!(r.usual_hours, Some(UsualHours::Hours40));
        assert_eq!(r.actual_hours, Some(42));
        assert_eq!(r.industry_detailed, Some(22));
        assert_eq!(r.occupation_major, Some(4));
        assert_eq!(r.age, Some(34));
        assert_eq!(r.discouraged, None);
    }

    #[test]
    fn test_sentinels_become_none() {
        let body = format!(
            "[{}],[\"-1\",\"0\",\"-.01\",\"-1\",\"-1\",\"-1\",\"-1\",\"-1\",\"0\",\"0\",\"-1\",\"0\",\"abc\"]]",
            HEADER
        );

        let batch = parse_table(period(), &body).unwrap();
        let r = &batch.records()[0];

        assert_eq!(r.count_weight, 0.0);
        assert_eq!(r.hourly_earnings, None);
        assert_eq!(r.employment_status, None);
        assert_eq!(r.paid_hourly, None);
        assert_eq!(r.actual_hours, None);
        assert_eq!(r.industry_major, None);
        assert_eq!(r.occupation_detailed, None);
        assert_eq!(r.age, None);
    }

    #[test]
    fn test_optional_columns() {
        let table = vec![
            vec![
                "PWCMPWGT", "PWORWGT", "PTERNHLY", "PEMLR", "PEIO1COW", "PEERNHRY", "PRHRUSL",
                "PEHRACTT", "PRDTIND1", "PRMJIND1", "PRDTOCC1", "PRMJOCC1", "PRTAGE", "PRDISC",
            ]
            .into_iter()
            .map(Value::from)
            .collect::<Vec<_>>(),
            vec!["10", "0", "-0.01", "7", "-1", "-1", "-1", "-1", "0", "0", "0", "0", "40", "1"]
                .into_iter()
                .map(Value::from)
                .collect(),
            // numeric cells and a short row
            vec![Value::from(5.0), Value::from(0), Value::from(-1)],
        ];

        let batch = parse_rows(period(), table).unwrap();

        assert!(batch.has_discouraged());
        assert_eq!(batch.records()[0].discouraged, Some(true));
        assert_eq!(batch.records()[1].count_weight, 5.0);
        assert_eq!(batch.records()[1].discouraged, Some(false));
        assert_eq!(batch.records()[1].age, None);
    }

    #[test]
    fn test_missing_core_column_is_error() {
        let table = vec![vec![Value::from("PWCMPWGT")], vec![Value::from("1")]];
        assert!(matches!(
            parse_rows(period(), table),
            Err(FetchError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_header_only_is_no_data() {
        let body = format!("[{}]]", HEADER);
        assert!(matches!(parse_table(period(), &body), Err(FetchError::NoData)));
    }

    #[test]
    fn test_garbage_body_is_parse_error() {
        assert!(matches!(
            parse_table(period(), "<html>error</html>"),
            Err(FetchError::Parse(_))
        ));
    }
}
