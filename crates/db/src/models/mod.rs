//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts

pub mod import_run;
pub mod issue;
pub mod scorecard;
pub mod tenant;
pub mod user;
