//! Error types for building books and paper patterns.

/// Errors that abort [`Book::build`](crate::Book::build).
///
/// A failed build leaves the book cleared.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("The book is not built")]
    NotBuilt,

    #[error("The book has no content")]
    MissingContent,

    #[error("The book has no binding")]
    MissingBinding,

    #[error(
        "The book's height exceeds the maximum limit. Please consider using thinner paper, \
         increasing the width of the paper, or reducing the number of pages."
    )]
    BookHeight,

    #[error("The page content ({name}) is assigned to the book content multiple times.")]
    DuplicatedContent { name: String },

    #[error("Invalid paper pattern: {0}")]
    Pattern(#[from] PatternError),
}

/// Problems found by [`PaperPattern::validate`](crate::pattern::PaperPattern::validate).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("Node {0} does not exist")]
    InvalidNode(usize),

    #[error("Axis needs at least two nodes, got {0}")]
    TooFewNodes(usize),

    #[error("Axis values decrease at index {0}")]
    Decreasing(usize),

    #[error("Triangle list length {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    #[error("Vertex index {index} is out of range for {count} vertices")]
    VertexOutOfRange { index: u32, count: usize },

    #[error("Seam index {0} is outside the grid")]
    SeamOutOfRange(usize),
}
