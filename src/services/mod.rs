//! Service layer: one module per concern.
//!
//! - `discovery` — find and classify documents on disk.
//! - `placement` — frontmatter field placement, ordering, and field rules.
//! - `content` — body-text heuristics behind the `ContentCheck` trait.
//! - `graph` — dependency node extraction, resolution, and graph checks.
//! - `validate` — per-document orchestration.
//! - `report` — finding aggregation and output.

pub mod content;
pub mod discovery;
pub mod graph;
pub mod placement;
pub mod report;
pub mod validate;
