/// Nestable Error Types
///
/// All fallible engine operations return `Result<T, TableError>`. Every
/// error is local and synchronous; none of them is retryable, since each
/// one reports a structural contract violation rather than a transient
/// condition.

use crate::column::ColumnType;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = TableError> = std::result::Result<T, E>;

/// Errors raised by table, schema, and subtable operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// A row literal did not have exactly one value per schema column.
    #[error("row has {actual} values, schema expects {expected}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A value or access did not match the column's declared type.
    #[error("type mismatch at column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: usize,
        expected: ColumnType,
        actual: &'static str,
    },

    /// A column name is already taken at the same schema level.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// Schema mutation attempted through a row-scoped subtable view.
    /// The schema belongs to the column; obtain a `TableDefinition` from
    /// the owning table instead.
    #[error("schema of a row-scoped subtable is frozen; use the owning table's definition")]
    SchemaFrozen,

    /// A row or column index outside the current bounds.
    #[error("{what} index {index} out of range [0, {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Whole-schema replacement is only legal while the table is empty.
    #[error("cannot replace the schema of a table holding {0} row(s)")]
    PopulatedTable(usize),

    /// JSON export failed.
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TableError::ArityMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "row has 2 values, schema expects 3");

        let err = TableError::TypeMismatch {
            column: 1,
            expected: ColumnType::Int,
            actual: "string",
        };
        assert_eq!(
            err.to_string(),
            "type mismatch at column 1: expected int, got string"
        );

        let err = TableError::IndexOutOfRange {
            what: "row",
            index: 5,
            len: 2,
        };
        assert_eq!(err.to_string(), "row index 5 out of range [0, 2)");
    }
}
