use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record_id::{generate_id, RecordKind};
use crate::validation::ValidationError;

/// A single exercise inside a routine.
///
/// `reps` is free-form: a count (`"10"`), a range (`"10-12"`) or a duration
/// (`"60 seconds"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_hint: String,
}

impl Exercise {
    pub fn new(name: impl Into<String>, sets: u32, reps: impl Into<String>) -> Self {
        Self {
            id: generate_id(RecordKind::Exercise),
            name: name.into(),
            sets,
            reps: reps.into(),
            description: String::new(),
            image: String::new(),
            image_hint: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, url: impl Into<String>, hint: impl Into<String>) -> Self {
        self.image = url.into();
        self.image_hint = hint.into();
        self
    }

    /// Checks the exercise at 1-based `position` within its routine.
    pub fn validate(&self, position: usize) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::ExerciseFieldMissing {
                position,
                field: "name",
            });
        }
        if self.sets < 1 {
            return Err(ValidationError::ExerciseSets { position });
        }
        if self.reps.trim().is_empty() {
            return Err(ValidationError::ExerciseFieldMissing {
                position,
                field: "reps",
            });
        }
        Ok(())
    }

    /// Parses the CLI shorthand `name:sets:reps[:description]`.
    pub fn parse_spec(spec: &str) -> Result<Self, String> {
        let parts: Vec<&str> = spec.splitn(4, ':').collect();
        if parts.len() < 3 {
            return Err(format!(
                "Invalid exercise '{}'. Use NAME:SETS:REPS[:DESCRIPTION]",
                spec
            ));
        }

        let sets: u32 = parts[1]
            .trim()
            .parse()
            .map_err(|_| format!("Invalid sets '{}' in exercise '{}'", parts[1], spec))?;

        let mut exercise = Exercise::new(parts[0].trim(), sets, parts[2].trim());
        if let Some(description) = parts.get(3) {
            exercise.description = description.trim().to_string();
        }
        Ok(exercise)
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} x {}", self.name, self.sets, self.reps)
    }
}
