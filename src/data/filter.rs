use std::collections::{BTreeMap, BTreeSet};

use super::model::{Table, Value};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection: maps column_name → set of accepted values.
/// Columns absent from the map are unconstrained.
pub type Filters = BTreeMap<String, BTreeSet<Value>>;

/// Build a [`Filters`] that pins each listed column to a single value.
pub fn equals<'a, I>(pairs: I) -> Filters
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    pairs
        .into_iter()
        .map(|(col, val)| (col.to_string(), BTreeSet::from([val.clone()])))
        .collect()
}

fn row_passes(table: &Table, row: usize, filters: &Filters) -> bool {
    filters.iter().all(|(col, selected)| {
        // An absent cell reads as Null, so it passes only if Null is selected.
        !selected.is_empty() && selected.contains(table.value(row, col))
    })
}

/// Return indices of rows that pass all filters.
///
/// A row passes a column filter when:
/// * The filter set for that column is empty → nothing selected → fails
/// * The row's value for that column is in the selected set → passes
pub fn filtered_indices(table: &Table, filters: &Filters) -> Vec<usize> {
    (0..table.len())
        .filter(|&i| row_passes(table, i, filters))
        .collect()
}

/// Number of rows that pass all filters.
pub fn count_matching(table: &Table, filters: &Filters) -> usize {
    filtered_indices(table, filters).len()
}

/// Indices of rows whose `column` holds a usable value: not `Null`, not an
/// empty string and not a NaN float.
pub fn drop_missing(table: &Table, column: &str) -> Vec<usize> {
    (0..table.len())
        .filter(|&i| match table.value(i, column) {
            Value::Null => false,
            Value::Float(f) => !f.is_nan(),
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
        .collect()
}
