/// Failure of a batch logging request.
#[derive(Debug, thiserror::Error)]
pub enum LogFoodError {
    /// Rejected before anything was resolved or written.
    #[error("validation error: {0}")]
    Validation(String),

    /// Catalog lookup failed while resolving references.
    #[error("{operation} failed: {source}")]
    Store {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Processing stopped at `index`. Entries logged before it are kept.
    #[error("item {index}: {source} ({persisted} item(s) already logged)")]
    Item {
        index: usize,
        persisted: usize,
        #[source]
        source: ItemError,
    },
}

/// Failure while turning one resolved item into a log entry.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("food '{food}' has no serving_size_g defined, cannot use serving_count")]
    MissingServingSize { food: String },

    #[error("food '{food}' has no nutrients data")]
    MissingNutrients { food: String },

    #[error("failed to save consumption log: {0}")]
    Store(#[source] anyhow::Error),
}
