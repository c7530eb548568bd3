pub mod article;
pub mod published;

pub use crate::types::identifiers::EntryId;
pub use article::{Article, EntryMetadata};
pub use published::{age_in_days, parse_published, PublishedDateError};
