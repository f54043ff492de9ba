//! Database module: models, filters and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `filter.rs`: equality filters shared by SQL and in-memory listing
//! - `schema.rs`: append-only SQL migrations (SQLite-first)
//! - `actor.rs`: the actor owning the SQLite pool

pub mod actor;
pub mod filter;
pub mod models;
pub mod patch;
pub mod schema;

mod patch_impl;

pub use filter::{AuthorFilter, QuoteFilter};
pub use models::{AuthorQuotes, DbAuthor, DbQuote, RecordKind};
pub use patch::{AuthorCreate, AuthorPatch, QuoteCreate, QuotePatch};
pub use schema::MIGRATIONS;

pub use actor::{DbActorHandle, spawn};
