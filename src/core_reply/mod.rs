pub mod catalog;
pub mod codes;

pub use catalog::{fill_placeholders, format_reply, ReplyCatalog, ReplyCatalogError};
