//! Shared data model layer (structs/constants only).
//!
//! Domain types are data-only: no filesystem side effects. Changes here
//! affect `--json` outputs, so keep them explicit and reviewable.

pub mod models;
