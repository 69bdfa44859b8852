//! Request handlers for the import API.
//!
//! Each submodule provides async handler functions for one resource area.
//! Handlers delegate to `opsboard-importer` for pipeline work and to the
//! repositories in `opsboard-db` for reads, mapping errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod imports;
