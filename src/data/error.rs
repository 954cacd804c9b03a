use thiserror::Error;

/// Invalid arguments handed to the query engine or the aggregator.
///
/// These are programming errors at the UI boundary (a label that no widget
/// offers, a column name that does not exist) and are never defaulted away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown sort mode: {0:?}")]
    UnknownSortMode(String),

    #[error("unknown numeric field: {0:?}")]
    UnknownNumericField(String),

    #[error("unknown category field: {0:?}")]
    UnknownCategoryField(String),
}
