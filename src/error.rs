//! Error taxonomy for building, validating and decoding searches

use thiserror::Error;

/// Result type for query-builder operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Everything that can go wrong while composing, validating or decoding a search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Empty query value with a lookup other than `exact`
    #[error("{label}: a search value is required")]
    EmptyQuery { label: String },

    /// The lookup is not legal for one of the row's selected fields
    #[error("{label}: lookup '{lookup}' is not allowed for this field")]
    IllegalLookup { label: String, lookup: String },

    /// Numeric, date or boolean literal that does not parse
    #[error("{label}: '{value}' is not a valid {expected}")]
    InvalidLiteral {
        label: String,
        value: String,
        expected: String,
    },

    /// A row with nothing selected in its field list
    #[error("card {card}, row {row}: no field selected")]
    NoFieldSelected { card: u32, row: u32 },

    /// Field id missing from the catalog, or a section heading
    #[error("unknown search field '{0}'")]
    UnknownField(String),

    /// Wire parameter that cannot be decoded
    #[error("malformed search parameter: {0}")]
    MalformedParameter(String),

    #[error("card {0} not found")]
    CardNotFound(u32),

    #[error("row {row} not found in card {card}")]
    RowNotFound { card: u32, row: u32 },

    /// A card must keep at least one row
    #[error("cannot remove the last row of card {0}")]
    LastRow(u32),

    /// Index with no successor; the never-reused counters would overflow
    #[error("index {0} is out of range")]
    IndexOutOfRange(u32),

    #[error("unknown search model '{0}'")]
    UnknownModel(String),
}

impl QueryError {
    /// Create a malformed parameter error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedParameter(msg.into())
    }

    /// Create an invalid literal error.
    pub fn invalid_literal(label: &str, value: &str, expected: &str) -> Self {
        Self::InvalidLiteral {
            label: label.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }
}
