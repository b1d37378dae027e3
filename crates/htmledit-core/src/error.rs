use thiserror::Error;

/// Why an editing operation left the tree alone.
///
/// Every `Err` returned by an operation in this crate means nothing was
/// mutated: neither the document nor the live selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no active selection")]
    NoSelection,
    #[error("selection is collapsed")]
    CollapsedSelection,
    #[error("selection is outside the editable root")]
    OutsideRoot,
    #[error("no block ancestor below the editable root")]
    NoBlock,
    #[error("selection contains no text")]
    EmptyText,
    #[error("value request was cancelled")]
    Cancelled,
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PathError(pub String);

impl From<PathError> for EditError {
    fn from(value: PathError) -> Self {
        EditError::InvalidPath(value.0)
    }
}
