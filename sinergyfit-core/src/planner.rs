//! The weekly meal plan of the signed-in user.
//!
//! Each user has exactly one plan document, `weekly-plan-<uid>`, in the
//! `mealPlans` collection. It is created once by [`MealPlanner::provision`]
//! and afterwards only changed one slot at a time: [`MealPlanner::set_slot`]
//! updates the single field `[day, slot]` in the store, so concurrent edits
//! of different slots never overwrite each other.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::automerge::Collection;
use crate::models::{DayPlan, MealSlot, Recipe, Weekday, WeeklyPlan};
use crate::session::{Session, UserId};
use crate::store::{DocumentStore, StoreError, SubmitError, WriteHandle, WriteOp, WriteQueue};
use crate::validation::ValidationError;

/// Id of a user's weekly plan document.
pub fn plan_id(uid: &UserId) -> String {
    format!("weekly-plan-{}", uid)
}

fn empty_plan_payload() -> Result<Map<String, Value>, serde_json::Error> {
    let empty_day = serde_json::to_value(DayPlan::default())?;
    Ok(Weekday::ALL
        .iter()
        .map(|day| (day.key().to_string(), empty_day.clone()))
        .collect())
}

#[derive(Clone)]
pub struct MealPlanner {
    session: Session,
    store: Arc<DocumentStore>,
    queue: WriteQueue,
}

impl MealPlanner {
    pub fn new(session: Session, store: Arc<DocumentStore>, queue: WriteQueue) -> Self {
        Self {
            session,
            store,
            queue,
        }
    }

    /// Creates the empty weekly plan unless the user already has one.
    pub fn provision(&self) -> Result<WriteHandle, SubmitError> {
        let Some(uid) = self.session.user_id() else {
            tracing::debug!("Not signed in, skipping plan provisioning");
            return Ok(WriteHandle::skipped());
        };

        let op = WriteOp::CreateIfAbsent {
            collection: Collection::MealPlans,
            id: plan_id(&uid),
            payload: empty_plan_payload()?,
        };
        Ok(self.queue.submit(uid, op))
    }

    /// Assigns `recipe` to one slot, or clears it with `None`.
    ///
    /// The recipe is stored as a snapshot; later edits to the recipe do not
    /// change the plan. Fails through the handle if the plan was never
    /// provisioned.
    pub fn set_slot(
        &self,
        day: Weekday,
        slot: MealSlot,
        recipe: Option<&Recipe>,
    ) -> Result<WriteHandle, SubmitError> {
        let value = match recipe {
            Some(recipe) if recipe.id.trim().is_empty() => {
                return Err(ValidationError::MissingId.into())
            }
            Some(recipe) => serde_json::to_value(recipe)?,
            None => Value::Null,
        };

        let Some(uid) = self.session.user_id() else {
            tracing::debug!("Not signed in, skipping {} {}", day, slot);
            return Ok(WriteHandle::skipped());
        };

        let op = WriteOp::UpdateField {
            collection: Collection::MealPlans,
            id: plan_id(&uid),
            path: vec![day.key().to_string(), slot.key().to_string()],
            value,
        };
        Ok(self.queue.submit(uid, op))
    }

    /// The whole weekly plan. Empty when signed out or not provisioned.
    pub async fn plan(&self) -> Result<WeeklyPlan, StoreError> {
        let Some(uid) = self.session.user_id() else {
            return Ok(WeeklyPlan::new());
        };

        let id = plan_id(&uid);
        let Some(value) = self.store.get(&uid, Collection::MealPlans, &id).await? else {
            return Ok(WeeklyPlan::new());
        };

        match serde_json::from_value(value) {
            Ok(plan) => Ok(plan),
            Err(e) => {
                tracing::warn!("Ignoring unreadable plan {}: {}", id, e);
                Ok(WeeklyPlan::new())
            }
        }
    }

    pub async fn get_slot(&self, day: Weekday, slot: MealSlot) -> Result<Option<Recipe>, StoreError> {
        Ok(self.plan().await?.slot(day, slot).cloned())
    }

    /// Whether the signed-in user has a plan document.
    pub async fn is_provisioned(&self) -> Result<bool, StoreError> {
        let Some(uid) = self.session.user_id() else {
            return Ok(false);
        };
        Ok(self
            .store
            .get(&uid, Collection::MealPlans, &plan_id(&uid))
            .await?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{find_recipe, preloaded_recipes};
    use crate::session::User;
    use crate::store::{wait_all, WriteError, WriteOutcome};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    struct Fixture {
        session: Session,
        planner: MealPlanner,
        failures: mpsc::UnboundedReceiver<crate::store::WriteFailure>,
        _temp: TempDir,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let session = Session::signed_in(User::new(UserId::new("alice").unwrap()));
        let store = Arc::new(DocumentStore::new(temp.path().to_path_buf()));
        let (sink, failures) = mpsc::unbounded_channel();
        let queue = WriteQueue::spawn(store.clone(), Some(sink));
        Fixture {
            planner: MealPlanner::new(session.clone(), store, queue),
            session,
            failures,
            _temp: temp,
        }
    }

    #[test]
    fn test_plan_id() {
        assert_eq!(plan_id(&UserId::new("abc").unwrap()), "weekly-plan-abc");
    }

    #[tokio::test]
    async fn test_provision_creates_empty_plan_once() {
        let f = fixture();
        assert!(!f.planner.is_provisioned().await.unwrap());

        let first = f.planner.provision().unwrap().wait().await;
        let second = f.planner.provision().unwrap().wait().await;
        assert_eq!(first, Ok(WriteOutcome::Written));
        assert_eq!(second, Ok(WriteOutcome::Unchanged));

        assert!(f.planner.is_provisioned().await.unwrap());
        assert!(f.planner.plan().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get_slot() {
        let f = fixture();
        f.planner.provision().unwrap().wait().await.unwrap();

        let smoothie = find_recipe("recipe-3").unwrap();
        f.planner
            .set_slot(Weekday::Monday, MealSlot::Breakfast, Some(&smoothie))
            .unwrap()
            .wait()
            .await
            .unwrap();

        let got = f.planner.get_slot(Weekday::Monday, MealSlot::Breakfast).await.unwrap();
        assert_eq!(got, Some(smoothie));
        assert!(f
            .planner
            .get_slot(Weekday::Monday, MealSlot::Lunch)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_back_to_back_slot_edits_keep_both() {
        let f = fixture();
        f.planner.provision().unwrap().wait().await.unwrap();
        let recipes = preloaded_recipes();

        // Both edits are issued before either is applied.
        let handles = vec![
            f.planner
                .set_slot(Weekday::Monday, MealSlot::Breakfast, Some(&recipes[2]))
                .unwrap(),
            f.planner
                .set_slot(Weekday::Monday, MealSlot::Lunch, Some(&recipes[1]))
                .unwrap(),
        ];
        for result in wait_all(handles).await {
            assert_eq!(result, Ok(WriteOutcome::Written));
        }

        let plan = f.planner.plan().await.unwrap();
        assert_eq!(plan.slot(Weekday::Monday, MealSlot::Breakfast), Some(&recipes[2]));
        assert_eq!(plan.slot(Weekday::Monday, MealSlot::Lunch), Some(&recipes[1]));
        assert_eq!(plan.assigned_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_slot() {
        let f = fixture();
        f.planner.provision().unwrap().wait().await.unwrap();
        let soup = find_recipe("recipe-2").unwrap();

        f.planner
            .set_slot(Weekday::Friday, MealSlot::Dinner, Some(&soup))
            .unwrap();
        f.planner
            .set_slot(Weekday::Friday, MealSlot::Dinner, None)
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert!(f.planner.plan().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_slot_without_plan_fails() {
        let mut f = fixture();
        let soup = find_recipe("recipe-2").unwrap();

        let result = f
            .planner
            .set_slot(Weekday::Tuesday, MealSlot::Lunch, Some(&soup))
            .unwrap()
            .wait()
            .await;
        assert!(matches!(result, Err(WriteError::DocumentNotFound { .. })));

        let failure = f.failures.recv().await.unwrap();
        assert_eq!(failure.op.id(), "weekly-plan-alice");
        assert!(!f.planner.is_provisioned().await.unwrap());
    }

    #[tokio::test]
    async fn test_set_slot_rejects_recipe_without_id() {
        let f = fixture();
        let recipe = Recipe::new("Nameless").with_id("");
        assert!(matches!(
            f.planner.set_slot(Weekday::Monday, MealSlot::Lunch, Some(&recipe)),
            Err(SubmitError::Validation(ValidationError::MissingId))
        ));
    }

    #[tokio::test]
    async fn test_signed_out_is_noop() {
        let f = fixture();
        f.session.sign_out();

        assert_eq!(
            f.planner.provision().unwrap().wait().await,
            Ok(WriteOutcome::Skipped)
        );
        assert_eq!(
            f.planner
                .set_slot(Weekday::Monday, MealSlot::Dinner, None)
                .unwrap()
                .wait()
                .await,
            Ok(WriteOutcome::Skipped)
        );
        assert!(f.planner.plan().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_users_have_separate_plans() {
        let f = fixture();
        f.planner.provision().unwrap().wait().await.unwrap();
        let soup = find_recipe("recipe-2").unwrap();
        f.planner
            .set_slot(Weekday::Sunday, MealSlot::Lunch, Some(&soup))
            .unwrap()
            .wait()
            .await
            .unwrap();

        f.session.sign_in(User::new(UserId::new("bob").unwrap()));
        assert!(!f.planner.is_provisioned().await.unwrap());
        assert!(f.planner.plan().await.unwrap().is_empty());
    }
}
