//! Typed train tickets derived from a loaded [`Table`].

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::config::ReportConfig;
use crate::data::filter::drop_missing;
use crate::data::loader::parse_datetime;
use crate::data::model::{Table, Value};

pub const INSERT_DATE: &str = "insert_date";
pub const START_DATE: &str = "start_date";
pub const END_DATE: &str = "end_date";
pub const PRICE: &str = "price";
pub const TRAIN_CLASS: &str = "train_class";
pub const FARE: &str = "fare";
pub const ORIGIN: &str = "origin";
pub const DESTINATION: &str = "destination";
pub const TRAIN_TYPE: &str = "train_type";

const REQUIRED: [&str; 9] = [
    INSERT_DATE,
    START_DATE,
    END_DATE,
    PRICE,
    TRAIN_CLASS,
    FARE,
    ORIGIN,
    DESTINATION,
    TRAIN_TYPE,
];

#[derive(Debug, Error, PartialEq)]
pub enum TicketError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: cannot read '{value}' in column '{column}' as a date")]
    BadDate {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: price '{value}' is not a finite number")]
    BadPrice { row: usize, value: String },
}

/// One priced ticket with its derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub insert_date: NaiveDateTime,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub price: f64,
    pub train_class: Option<String>,
    pub fare: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub train_type: Option<String>,
    /// `end_date - start_date` in hours.
    pub duration_hours: f64,
    pub is_premium: bool,
    pub is_flexible: bool,
}

impl Ticket {
    /// `(origin, destination)` when both ends are known.
    pub fn route(&self) -> Option<(&str, &str)> {
        Some((self.origin.as_deref()?, self.destination.as_deref()?))
    }
}

fn date_at(table: &Table, row: usize, column: &str) -> Result<NaiveDateTime, TicketError> {
    let value = table.value(row, column);
    let parsed = match value {
        Value::DateTime(dt) => Some(*dt),
        Value::String(s) => parse_datetime(s),
        _ => None,
    };
    parsed.ok_or_else(|| TicketError::BadDate {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

fn text_at(table: &Table, row: usize, column: &str) -> Option<String> {
    match table.value(row, column) {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Turn raw rows into tickets.
///
/// Rows with a missing price are dropped; every kept row must carry parseable
/// dates and a numeric price.
pub fn prepare(table: &Table, config: &ReportConfig) -> Result<Vec<Ticket>, TicketError> {
    if let Some(missing) = REQUIRED.iter().find(|c| !table.has_column(c)) {
        return Err(TicketError::MissingColumn(missing.to_string()));
    }

    let priced = drop_missing(table, PRICE);
    let dropped = table.len() - priced.len();
    if dropped > 0 {
        log::info!("dropped {dropped} rows with a missing price");
    }

    priced
        .into_iter()
        .map(|row| {
            let price_cell = table.value(row, PRICE);
            let price = price_cell
                .as_f64()
                .filter(|p| p.is_finite())
                .ok_or_else(|| TicketError::BadPrice {
                    row,
                    value: price_cell.to_string(),
                })?;

            let start_date = date_at(table, row, START_DATE)?;
            let end_date = date_at(table, row, END_DATE)?;
            let duration_hours = (end_date - start_date).num_milliseconds() as f64 / 3_600_000.0;

            let train_class = text_at(table, row, TRAIN_CLASS);
            let fare = text_at(table, row, FARE);
            let is_premium = train_class.as_deref() == Some(config.premium_class.as_str());
            let is_flexible = fare
                .as_deref()
                .is_some_and(|f| f.contains(config.flexible_marker.as_str()));

            Ok(Ticket {
                insert_date: date_at(table, row, INSERT_DATE)?,
                start_date,
                end_date,
                price,
                train_class,
                fare,
                origin: text_at(table, row, ORIGIN),
                destination: text_at(table, row, DESTINATION),
                train_type: text_at(table, row, TRAIN_TYPE),
                duration_hours,
                is_premium,
                is_flexible,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::guess_value;
    use crate::data::model::Row;

    fn table(rows: &[[&str; 9]]) -> Table {
        let rows: Vec<Row> = rows
            .iter()
            .map(|cells| {
                REQUIRED
                    .iter()
                    .zip(cells)
                    .map(|(col, cell)| (col.to_string(), guess_value(cell)))
                    .collect()
            })
            .collect();
        Table::with_columns(REQUIRED.iter().map(|c| c.to_string()).collect(), rows)
    }

    const A: [&str; 9] = [
        "2019-04-19 05:31:43",
        "2019-05-29 06:20:00",
        "2019-05-29 09:16:00",
        "38.55",
        "Turista",
        "Promo",
        "MADRID",
        "SEVILLA",
        "AV City",
    ];
    const B: [&str; 9] = [
        "2019-04-19 05:31:43",
        "2019-05-29 07:00:00",
        "2019-05-29 09:30:00",
        "",
        "Preferente",
        "Flexible",
        "MADRID",
        "BARCELONA",
        "AVE",
    ];
    const C: [&str; 9] = [
        "2019-04-19 05:31:43",
        "2019-05-29 07:00:00",
        "2019-05-29 09:30:00",
        "107.7",
        "Preferente",
        "Adulto ida Flexible",
        "MADRID",
        "BARCELONA",
        "AVE",
    ];

    #[test]
    fn test_prepare_drops_missing_prices_and_derives_fields() {
        let tickets = prepare(&table(&[A, B, C]), &ReportConfig::default()).unwrap();
        assert_eq!(tickets.len(), 2);

        let a = &tickets[0];
        assert!((a.duration_hours - (2.0 + 56.0 / 60.0)).abs() < 1e-9);
        assert!(!a.is_premium);
        assert!(!a.is_flexible);
        assert_eq!(a.route(), Some(("MADRID", "SEVILLA")));

        let c = &tickets[1];
        assert_eq!(c.price, 107.7);
        assert_eq!(c.duration_hours, 2.5);
        assert!(c.is_premium);
        assert!(c.is_flexible);
    }

    #[test]
    fn test_missing_categories_are_none() {
        let mut row = A;
        row[4] = "";
        row[5] = "";
        let tickets = prepare(&table(&[row]), &ReportConfig::default()).unwrap();
        assert_eq!(tickets[0].train_class, None);
        assert!(!tickets[0].is_premium);
        assert!(!tickets[0].is_flexible);
    }

    #[test]
    fn test_bad_date_reports_row_and_column() {
        let mut row = A;
        row[2] = "soon";
        let err = prepare(&table(&[row]), &ReportConfig::default()).unwrap_err();
        assert_eq!(
            err,
            TicketError::BadDate {
                row: 0,
                column: END_DATE.to_string(),
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_non_numeric_price() {
        let mut row = A;
        row[3] = "free";
        let err = prepare(&table(&[row]), &ReportConfig::default()).unwrap_err();
        assert!(matches!(err, TicketError::BadPrice { row: 0, .. }));
    }

    #[test]
    fn test_infinite_price_is_rejected() {
        for cell in ["inf", "-inf", "1e400"] {
            let mut row = A;
            row[3] = cell;
            let mut other = A;
            other[3] = "12.0";
            let err = prepare(&table(&[A, row, other]), &ReportConfig::default()).unwrap_err();
            assert!(matches!(err, TicketError::BadPrice { row: 1, .. }), "{cell}: {err}");
        }
    }

    #[test]
    fn test_missing_column() {
        let t = Table::from_rows(vec![Row::from([(PRICE.to_string(), Value::Float(1.0))])]);
        assert_eq!(
            prepare(&t, &ReportConfig::default()).unwrap_err(),
            TicketError::MissingColumn(INSERT_DATE.to_string())
        );
    }

    #[test]
    fn test_custom_premium_class() {
        let config = ReportConfig {
            premium_class: "Turista".to_string(),
            ..ReportConfig::default()
        };
        let tickets = prepare(&table(&[A]), &config).unwrap();
        assert!(tickets[0].is_premium);
    }
}
