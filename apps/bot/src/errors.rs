use thiserror::Error;

/// Failure while turning a record into post text.
///
/// Everything here is fatal for the record being composed; tolerant misses
/// (building style, street suffix) never reach this type.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("No '{table}' mapping for code '{code}'")]
    UnmappedCode { table: String, code: String },

    #[error("Record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Cannot choose an article for an empty word")]
    EmptyWord,

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Side-table lookups require exactly one matching row per key.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("No row in {table} matches key '{key}'")]
    NotFound { table: &'static str, key: String },

    #[error("{count} rows in {table} match key '{key}', expected exactly one")]
    Ambiguous {
        table: &'static str,
        key: String,
        count: usize,
    },
}
