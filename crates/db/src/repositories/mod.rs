//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Pool
//! reads accept `&PgPool`; anything that must run inside an import batch
//! transaction accepts `&mut PgConnection` instead, so every statement
//! lands on the caller's open transaction.

pub mod import_run_repo;
pub mod issue_repo;
pub mod scorecard_repo;
pub mod tenant_repo;
pub mod user_repo;

pub use import_run_repo::ImportRunRepo;
pub use issue_repo::IssueRepo;
pub use scorecard_repo::{GroupRepo, MetricRepo, ScoreRepo};
pub use tenant_repo::{OrganizationRepo, TeamRepo};
pub use user_repo::UserRepo;
