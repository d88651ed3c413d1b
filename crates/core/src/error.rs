use std::fmt;

use serde::Serialize;

use crate::types::{DbId, Position};

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Invalid position {position}: must be between 1 and {group_size}")]
    InvalidPosition { position: Position, group_size: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation failure on a single field.
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::Validation(vec![FieldError {
            field,
            message: message.into(),
        }])
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_field() {
        let err = CoreError::Validation(vec![
            FieldError {
                field: "name",
                message: "cannot be blank".into(),
            },
            FieldError {
                field: "tracker_id",
                message: "is required".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: name cannot be blank; tracker_id is required"
        );
    }

    #[test]
    fn invalid_position_message_names_bounds() {
        let err = CoreError::InvalidPosition {
            position: 7,
            group_size: 3,
        };
        assert_eq!(
            err.to_string(),
            "Invalid position 7: must be between 1 and 3"
        );
    }
}
