use serde::{Deserialize, Serialize};
use std::fmt;

use super::exercise::Exercise;
use crate::record_id::{generate_id, RecordKind};
use crate::validation::{require_len, ValidationError};

/// A workout routine: an ordered list of exercises.
///
/// Seed routines are flagged `is_preloaded` and are never written to a user's
/// store. A user copy of a seed routine records the seed's id in
/// `source_seed_id`, which is what makes it shadow the seed in listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub description: String,
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_hint: Option<String>,
    #[serde(default)]
    pub is_preloaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_seed_id: Option<String>,
}

impl Routine {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: generate_id(RecordKind::Routine),
            name: name.into(),
            description: description.into(),
            exercises: Vec::new(),
            image_url: None,
            image_hint: None,
            is_preloaded: false,
            source_seed_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_exercises(mut self, exercises: Vec<Exercise>) -> Self {
        self.exercises = exercises;
        self
    }

    pub fn with_image(mut self, url: impl Into<String>, hint: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self.image_hint = Some(hint.into());
        self
    }

    pub fn preloaded(mut self) -> Self {
        self.is_preloaded = true;
        self
    }

    /// Makes an editable user copy of this routine.
    ///
    /// The copy gets fresh routine and exercise ids and remembers which seed it
    /// came from, so the seed is hidden once the copy is saved.
    pub fn customize(&self) -> Routine {
        let seed_id = self
            .source_seed_id
            .clone()
            .unwrap_or_else(|| self.id.clone());

        Routine {
            id: generate_id(RecordKind::Routine),
            exercises: self
                .exercises
                .iter()
                .map(|ex| ex.clone().with_id(generate_id(RecordKind::Exercise)))
                .collect(),
            is_preloaded: false,
            source_seed_id: Some(seed_id),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingId);
        }
        require_len("name", &self.name, 2)?;
        require_len("description", &self.description, 10)?;
        if self.exercises.is_empty() {
            return Err(ValidationError::NoExercises);
        }
        for (i, exercise) in self.exercises.iter().enumerate() {
            exercise.validate(i + 1)?;
        }
        Ok(())
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|ex| ex.sets).sum()
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.chars().count()))?;
        writeln!(f, "ID: {}", self.id)?;
        if self.is_preloaded {
            writeln!(f, "Preloaded: yes")?;
        }
        if let Some(seed) = &self.source_seed_id {
            writeln!(f, "Based on: {}", seed)?;
        }

        if !self.description.is_empty() {
            writeln!(f, "\n{}", self.description)?;
        }

        if !self.exercises.is_empty() {
            writeln!(f, "\nExercises:")?;
            for exercise in &self.exercises {
                writeln!(f, "  - {}", exercise)?;
                if !exercise.description.is_empty() {
                    writeln!(f, "    {}", exercise.description)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_routine() -> Routine {
        Routine::new("Morning Workout", "Quick wake-up circuit for weekdays")
            .with_exercises(vec![Exercise::new("Squats", 3, "10-12")])
    }

    #[test]
    fn test_routine_new() {
        let routine = Routine::new("Legs", "Leg day routine");
        assert!(routine.id.starts_with("routine-"));
        assert!(!routine.is_preloaded);
        assert!(routine.source_seed_id.is_none());
        assert!(routine.exercises.is_empty());
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_routine().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_exercise() {
        let routine = Routine::new("Empty", "A routine without any exercises");
        assert_eq!(routine.validate(), Err(ValidationError::NoExercises));
    }

    #[test]
    fn test_validate_short_name() {
        let mut routine = valid_routine();
        routine.name = "A".into();
        assert_eq!(
            routine.validate(),
            Err(ValidationError::TooShort {
                field: "name",
                min: 2
            })
        );
    }

    #[test]
    fn test_validate_short_description() {
        let mut routine = valid_routine();
        routine.description = "too short".into();
        assert!(matches!(
            routine.validate(),
            Err(ValidationError::TooShort {
                field: "description",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_reports_exercise_position() {
        let routine = valid_routine().with_exercises(vec![
            Exercise::new("Squats", 3, "10"),
            Exercise::new("Lunges", 0, "10"),
        ]);
        assert_eq!(
            routine.validate(),
            Err(ValidationError::ExerciseSets { position: 2 })
        );
    }

    #[test]
    fn test_customize_links_seed() {
        let seed = valid_routine().with_id("routine-1").preloaded();
        let copy = seed.customize();

        assert_ne!(copy.id, seed.id);
        assert!(!copy.is_preloaded);
        assert_eq!(copy.source_seed_id.as_deref(), Some("routine-1"));
        assert_eq!(copy.name, seed.name);
        assert_eq!(copy.exercises.len(), seed.exercises.len());
        assert_ne!(copy.exercises[0].id, seed.exercises[0].id);
    }

    #[test]
    fn test_customize_copy_keeps_original_seed() {
        let seed = valid_routine().with_id("routine-2").preloaded();
        let copy_of_copy = seed.customize().customize();
        assert_eq!(copy_of_copy.source_seed_id.as_deref(), Some("routine-2"));
    }

    #[test]
    fn test_total_sets() {
        let routine = valid_routine().with_exercises(vec![
            Exercise::new("Squats", 3, "10"),
            Exercise::new("Plank", 2, "60 seconds"),
        ]);
        assert_eq!(routine.total_sets(), 5);
    }

    #[test]
    fn test_json_omits_unset_optionals() {
        let json = serde_json::to_value(valid_routine()).unwrap();
        assert!(json.get("imageUrl").is_none());
        assert!(json.get("sourceSeedId").is_none());
        assert_eq!(json["isPreloaded"], false);
    }

    #[test]
    fn test_routine_display() {
        let output = format!("{}", valid_routine());
        assert!(output.contains("Morning Workout"));
        assert!(output.contains("Squats: 3 x 10-12"));
    }
}
