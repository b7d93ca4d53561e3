//! Wiring of session, store, write queue and the services built on them.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::library::Library;
use crate::planner::MealPlanner;
use crate::session::Session;
use crate::store::{
    DocumentStore, RecordStore, SubmitError, WriteFailure, WriteHandle, WriteQueue,
};

/// Everything a front end needs for one data directory.
///
/// All services share one session and one write queue, so writes from any of
/// them are applied in the order they were issued.
#[derive(Clone)]
pub struct Account {
    session: Session,
    store: Arc<DocumentStore>,
    library: Library,
    planner: MealPlanner,
}

impl Account {
    /// Opens the store in `data_dir` and starts its write worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(
        data_dir: PathBuf,
        session: Session,
        failures: Option<mpsc::UnboundedSender<WriteFailure>>,
    ) -> Self {
        let store = Arc::new(DocumentStore::new(data_dir));
        let queue = WriteQueue::spawn(store.clone(), failures);

        let library = Library::new(
            RecordStore::new(session.clone(), store.clone(), queue.clone()),
            RecordStore::new(session.clone(), store.clone(), queue.clone()),
        );
        let planner = MealPlanner::new(session.clone(), store.clone(), queue);

        Self {
            session,
            store,
            library,
            planner,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn planner(&self) -> &MealPlanner {
        &self.planner
    }

    /// Account setup after sign-in: makes sure the weekly plan exists.
    pub fn set_up(&self) -> Result<WriteHandle, SubmitError> {
        self.planner.provision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MealSlot, Weekday};
    use crate::session::{User, UserId};
    use crate::store::{WriteError, WriteOutcome};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_up_then_plan() {
        let temp = TempDir::new().unwrap();
        let session = Session::signed_in(User::new(UserId::new("alice").unwrap()));
        let account = Account::open(temp.path().to_path_buf(), session, None);

        assert_eq!(account.set_up().unwrap().wait().await, Ok(WriteOutcome::Written));

        let recipe = account.library().find_recipe("recipe-1").await.unwrap().unwrap();
        account
            .planner()
            .set_slot(Weekday::Wednesday, MealSlot::Dinner, Some(&recipe))
            .unwrap()
            .wait()
            .await
            .unwrap();

        let plan = account.planner().plan().await.unwrap();
        assert_eq!(plan.slot(Weekday::Wednesday, MealSlot::Dinner), Some(&recipe));
    }

    #[tokio::test]
    async fn test_failures_reach_sink() {
        let temp = TempDir::new().unwrap();
        let session = Session::signed_in(User::new(UserId::new("alice").unwrap()));
        let (sink, mut failures) = mpsc::unbounded_channel();
        let account = Account::open(temp.path().to_path_buf(), session, Some(sink));

        // No set_up: the plan does not exist yet.
        let handle = account
            .planner()
            .set_slot(Weekday::Monday, MealSlot::Lunch, None)
            .unwrap();
        drop(handle);

        let failure = failures.recv().await.unwrap();
        assert!(matches!(failure.error, WriteError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_sign_in_later() {
        let temp = TempDir::new().unwrap();
        let account = Account::open(temp.path().to_path_buf(), Session::new(), None);

        assert_eq!(account.set_up().unwrap().wait().await, Ok(WriteOutcome::Skipped));

        account
            .session()
            .sign_in(User::new(UserId::new("carol").unwrap()));
        assert_eq!(account.set_up().unwrap().wait().await, Ok(WriteOutcome::Written));
        assert!(account.planner().is_provisioned().await.unwrap());
    }
}
