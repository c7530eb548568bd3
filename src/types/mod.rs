pub mod identifiers;
pub mod selection_result;

pub use identifiers::{ArtifactDigest, EntryId};
pub use selection_result::{
    RelevanceDetails, SelectedArticle, SelectionError, SelectionMetadata, SelectionResult,
    SelectionStage,
};
