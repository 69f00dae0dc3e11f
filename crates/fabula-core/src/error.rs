//! Error types used throughout the crate.

/// Alias for `Result<T, StoryError>`.
pub type StoryResult<T> = Result<T, StoryError>;

/// Errors that can occur when loading, playing, or inspecting a story.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    /// An operation that needs a loaded story was called from the menu.
    #[error("no story is loaded")]
    NoStory,

    /// A named section does not exist in the story.
    #[error("section not found: \"{0}\"")]
    SectionNotFound(String),

    /// A choice index is out of range for the current section.
    #[error("invalid choice: {0}")]
    InvalidChoice(usize),

    /// A choice points at a section id that is not in the story.
    #[error("section \"{from}\" points at missing section \"{target}\"")]
    DanglingChoice {
        /// The section holding the dangling choice.
        from: String,
        /// The missing target id.
        target: String,
    },

    /// A section's `id` field does not match its key in the sections map.
    #[error("section key \"{key}\" holds a section with id \"{id}\"")]
    IdMismatch {
        /// The key in the sections map.
        key: String,
        /// The `id` field stored in the section.
        id: String,
    },

    /// The story JSON could not be parsed or serialized.
    #[error("invalid story JSON: {0}")]
    Json(#[from] serde_json::Error),
}
