pub mod client;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod types;
pub mod uploads;
pub mod validation;

pub use client::AdminClient;
pub use db::ContentStorage;
pub use editor::{CollectionEditor, OrderedList, RollbackPolicy};
pub use error::CmsError;
