//! The fixed weather / match dataset used to train the match predictor.

use super::model::{Row, Table, Value};

pub const OUTLOOK: &str = "Outlook";
pub const HUMIDITY: &str = "Humidity";
pub const WIND: &str = "Wind";
pub const PLAY: &str = "Play";

/// Feature columns, in the order a query lists them.
pub const FEATURES: [&str; 3] = [OUTLOOK, HUMIDITY, WIND];

const ROWS: [[&str; 4]; 10] = [
    ["Sunny", "High", "Weak", "Yes"],
    ["Sunny", "High", "Strong", "No"],
    ["Overcast", "High", "Weak", "Yes"],
    ["Rain", "High", "Weak", "No"],
    ["Rain", "Normal", "Weak", "Yes"],
    ["Rain", "Normal", "Strong", "No"],
    ["Overcast", "Normal", "Strong", "Yes"],
    ["Sunny", "High", "Weak", "Yes"],
    ["Sunny", "Normal", "Strong", "No"],
    ["Rain", "High", "Strong", "No"],
];

/// The 10-row training table with columns Outlook, Humidity, Wind, Play.
pub fn table() -> Table {
    let columns = [OUTLOOK, HUMIDITY, WIND, PLAY];
    let rows: Vec<Row> = ROWS
        .iter()
        .map(|cells| {
            columns
                .iter()
                .zip(cells)
                .map(|(col, cell)| (col.to_string(), Value::from(*cell)))
                .collect()
        })
        .collect();
    Table::with_columns(columns.iter().map(|c| c.to_string()).collect(), rows)
}
