//! Batch import pipeline for spreadsheet uploads.
//!
//! `opsboard-core` holds the pure stages (decoding, parsing, row
//! transformation, identity matching, conflict decisions); this crate owns
//! everything that touches the database:
//!
//! - [`CandidateStore`] — the persistence seam the engine drives.
//! - [`engine`] — the generic batch loop with per-row containment.
//! - [`preview`] — the dry-run mode sharing the execute stages.
//! - [`scorecard`] / [`issues`] — Postgres stores and the entry points
//!   the API layer calls.

pub mod engine;
pub mod error;
pub mod issues;
pub mod preview;
pub mod roster;
pub mod scorecard;
pub mod store;

pub use engine::ImportContext;
pub use error::ImportError;
pub use issues::{execute_issues, preview_issues, IssueImportReport};
pub use scorecard::{execute_scorecard, preview_scorecard, ScorecardImportReport};
pub use store::{CandidateStore, StoreError};
