/// Data layer: core types, loading, cleaning and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (source columns, typed cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  decode genres, coerce year / runtime → MovieTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  counts, means, histograms, correlations, fits
///   └──────────┘
/// ```

pub mod clean;
pub mod genres;
pub mod loader;
pub mod model;
pub mod stats;
