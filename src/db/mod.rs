//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `tables.rs`: per-table column lists and bind order for the sortable tables
//! - `sqlite.rs`: `ContentStorage`, the CRUD facade over a pool

pub mod models;
pub mod schema;
pub mod sqlite;
pub mod tables;

pub use models::{
    AdminUser, Credential, FaqItem, GalleryPhoto, PLACEHOLDER_IMAGE, Service, SiteConfig,
    Specialty, Testimonial, User,
};
pub use schema::SQLITE_INIT;
pub use sqlite::{ContentStorage, SqlitePool, connect};
pub use tables::ContentTable;
