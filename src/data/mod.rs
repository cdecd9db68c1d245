//! Data layer: storage access, normalisation, filtering and summaries.
//!
//! Architecture:
//! ```text
//!   SQLite file (imdbmovielist2024)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  store    │  one read-only connection per query → Table
//!   └──────────┘
//!        │  (loader: QueryCache keyed by SQL text)
//!        ▼
//!   ┌──────────────┐
//!   │ MovieDataset  │  normalize: Duration → minutes, Voting_Counts → count
//!   └──────────────┘
//!        │
//!        ├──▶ filter     conjunction of user predicates → new MovieDataset
//!        └──▶ aggregate  value counts, grouped mean/sum, histogram, …
//! ```
//!
//! `import` seeds the SQLite file from CSV/JSON movie lists.

pub mod aggregate;
pub mod filter;
pub mod import;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod store;
