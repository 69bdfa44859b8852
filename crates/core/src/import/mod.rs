//! Pure stages of the spreadsheet import pipeline.
//!
//! Field parsing, row transformation, identity matching, and conflict
//! decisions — all without database dependencies. Persistence and batch
//! orchestration live in `opsboard-importer`.

pub mod candidate;
pub mod conflict;
pub mod identity;
pub mod issues;
pub mod outcome;
pub mod parse;
pub mod scorecard;
