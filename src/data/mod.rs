/// Data layer: core types, loading, querying and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<ListingRecord>, country index
///   └──────────┘
///        │                         │
///        ▼                         ▼
///   ┌──────────┐            ┌───────────┐
///   │  query   │ filter →   │ aggregate │  grouped means / sums
///   │          │ sort       └───────────┘
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod loader;
pub mod model;
pub mod query;
