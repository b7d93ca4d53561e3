//! Submission checks for routines and recipes.
//!
//! These run before a record is handed to the store; a failing record is never
//! written.

use thiserror::Error;

/// Reasons a record is rejected at submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record id must not be empty")]
    MissingId,

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("at least one exercise is required")]
    NoExercises,

    #[error("exercise {position}: {field} is required")]
    ExerciseFieldMissing {
        position: usize,
        field: &'static str,
    },

    #[error("exercise {position}: sets must be at least 1")]
    ExerciseSets { position: usize },

    #[error("at least one ingredient is required")]
    NoIngredients,

    #[error("'{0}' is preloaded and cannot be modified")]
    Preloaded(String),
}

/// Checks that `value` has at least `min` characters once trimmed.
pub(crate) fn require_len(
    field: &'static str,
    value: &str,
    min: usize,
) -> Result<(), ValidationError> {
    if value.trim().chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_len_counts_trimmed_chars() {
        assert!(require_len("name", "ab", 2).is_ok());
        assert_eq!(
            require_len("name", "  a  ", 2),
            Err(ValidationError::TooShort {
                field: "name",
                min: 2
            })
        );
    }

    #[test]
    fn test_require_len_counts_chars_not_bytes() {
        assert!(require_len("name", "é", 2).is_err());
        assert!(require_len("name", "éé", 2).is_ok());
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::TooShort {
            field: "description",
            min: 10,
        };
        assert_eq!(err.to_string(), "description must be at least 10 characters");
        assert_eq!(
            ValidationError::ExerciseSets { position: 2 }.to_string(),
            "exercise 2: sets must be at least 1"
        );
    }
}
