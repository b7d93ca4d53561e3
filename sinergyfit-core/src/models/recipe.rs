use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record_id::{generate_id, RecordKind};
use crate::validation::{require_len, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_hint: String,
    #[serde(default)]
    pub is_preloaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_seed_id: Option<String>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(RecordKind::Recipe),
            name: name.into(),
            ingredients: Vec::new(),
            instructions: String::new(),
            image: String::new(),
            image_hint: String::new(),
            is_preloaded: false,
            source_seed_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<String>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_image(mut self, url: impl Into<String>, hint: impl Into<String>) -> Self {
        self.image = url.into();
        self.image_hint = hint.into();
        self
    }

    pub fn preloaded(mut self) -> Self {
        self.is_preloaded = true;
        self
    }

    /// Splits a block of text into ingredient lines, dropping blank lines.
    pub fn parse_ingredients(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    /// Makes an editable user copy of this recipe, linked to its seed.
    pub fn customize(&self) -> Recipe {
        let seed_id = self
            .source_seed_id
            .clone()
            .unwrap_or_else(|| self.id.clone());

        Recipe {
            id: generate_id(RecordKind::Recipe),
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
        if self.ingredients.iter().all(|line| line.trim().is_empty()) {
            return Err(ValidationError::NoIngredients);
        }
        require_len("ingredients", &self.ingredients.join("\n"), 10)?;
        require_len("instructions", &self.instructions, 20)?;
        Ok(())
    }
}

impl fmt::Display for Recipe {
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

        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for ingredient in &self.ingredients {
                writeln!(f, "  - {}", ingredient)?;
            }
        }

        if !self.instructions.is_empty() {
            writeln!(f, "\nInstructions:\n{}", self.instructions)?;
        }

        Ok(())
    }
}
