//! SQLite persistence for the reachable-user engine.
//!
//! The crate provides the schema used to persist users, campaigns and
//! matches, row writers for seeding it, and [`SqlitePopulationSource`], a
//! read-only [`PopulationSource`](reach_core::PopulationSource) that pushes
//! the cheap predicates into SQL and leaves the rest to the engine.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod schema;
pub mod source;

pub use error::{SchemaError, SqlitePopulationError};
pub use schema::{SCHEMA_VERSION, initialise_schema, insert_campaign, insert_match, insert_user};
pub use source::SqlitePopulationSource;
