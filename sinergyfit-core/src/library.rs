//! The routines and recipes a user sees: seed catalog plus their own records.

use crate::models::{Recipe, Routine};
use crate::reconcile::reconcile;
use crate::seed::{preloaded_recipes, preloaded_routines};
use crate::store::{RecordStore, StoreError, SubmitError, WriteHandle};

#[derive(Clone)]
pub struct Library {
    routines: RecordStore<Routine>,
    recipes: RecordStore<Recipe>,
}

impl Library {
    pub fn new(routines: RecordStore<Routine>, recipes: RecordStore<Recipe>) -> Self {
        Self { routines, recipes }
    }

    pub fn routine_store(&self) -> &RecordStore<Routine> {
        &self.routines
    }

    pub fn recipe_store(&self) -> &RecordStore<Recipe> {
        &self.recipes
    }

    /// Seed routines not overridden by the user, then the user's routines.
    pub async fn routines(&self) -> Result<Vec<Routine>, StoreError> {
        let user = self.routines.list().await?;
        Ok(reconcile(&preloaded_routines(), &user))
    }

    pub async fn recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        let user = self.recipes.list().await?;
        Ok(reconcile(&preloaded_recipes(), &user))
    }

    pub async fn find_routine(&self, id: &str) -> Result<Option<Routine>, StoreError> {
        Ok(self.routines().await?.into_iter().find(|r| r.id == id))
    }

    pub async fn find_recipe(&self, id: &str) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipes().await?.into_iter().find(|r| r.id == id))
    }

    /// Saves an editable copy of `routine` that replaces it in listings.
    pub fn customize_routine(
        &self,
        routine: &Routine,
    ) -> Result<(Routine, WriteHandle), SubmitError> {
        let copy = routine.customize();
        let handle = self.routines.add(copy.clone())?;
        Ok((copy, handle))
    }

    pub fn customize_recipe(&self, recipe: &Recipe) -> Result<(Recipe, WriteHandle), SubmitError> {
        let copy = recipe.customize();
        let handle = self.recipes.add(copy.clone())?;
        Ok((copy, handle))
    }
}
