/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  AB_US_2020.csv   AB_US_2023.csv   (.csv / .parquet)
///        │                │
///        ▼                ▼
///   ┌──────────┐
///   │  loader   │  parse + tag year → Vec<Listing> ×2
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ DatasetCache   │  load once → Arc<CombinedDataset>
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year ∧ room type ∧ price ∧ city → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, breakdowns, chart feeds
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
