// ⚠️ Errors that callers need to tell apart from plain I/O failures

use std::fmt;

/// The batch input lacks the column holding the text to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub column: String,
    pub available: Vec<String>,
}

impl SchemaError {
    pub fn missing_column(column: &str, available: &[String]) -> Self {
        SchemaError {
            column: column.to_string(),
            available: available.to_vec(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CSV must contain a column named '{}' (found: {})",
            self.column,
            if self.available.is_empty() {
                "no columns".to_string()
            } else {
                self.available.join(", ")
            }
        )
    }
}

impl std::error::Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_columns() {
        let err = SchemaError::missing_column("Comment", &["id".to_string(), "body".to_string()]);
        assert_eq!(
            err.to_string(),
            "CSV must contain a column named 'Comment' (found: id, body)"
        );

        let empty = SchemaError::missing_column("Comment", &[]);
        assert!(empty.to_string().ends_with("(found: no columns)"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = SchemaError::missing_column("Comment", &[]).into();
        assert!(err.downcast_ref::<SchemaError>().is_some());
    }
}
