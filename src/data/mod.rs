/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet        weather (static)
///        │                             │
///        ▼                             │
///   ┌──────────┐                       │
///   │  loader   │  parse file → Table   │
///   └──────────┘                       │
///        │                             │
///        ▼                             ▼
///   ┌──────────────────────────────────────┐
///   │ Table   Vec<Row>, column index        │
///   └──────────────────────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  column predicates → row indices / counts
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod weather;
