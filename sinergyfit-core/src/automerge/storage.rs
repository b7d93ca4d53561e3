//! Automerge document storage for persisting per-user collections to disk.

use automerge::AutoCommit;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::Collection;
use crate::session::UserId;

/// Storage for per-user Automerge collection documents.
///
/// Layout: `<data_dir>/users/<uid>/<collection>.automerge`.
#[derive(Clone, Debug)]
pub struct UserDocStorage {
    data_dir: PathBuf,
}

impl UserDocStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding all collections of one user.
    pub fn user_dir(&self, uid: &UserId) -> PathBuf {
        self.data_dir.join("users").join(uid.as_str())
    }

    pub fn path(&self, uid: &UserId, collection: Collection) -> PathBuf {
        self.user_dir(uid).join(collection.filename())
    }

    pub fn exists(&self, uid: &UserId, collection: Collection) -> bool {
        self.path(uid, collection).exists()
    }

    /// Loads a document from disk.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(
        &self,
        uid: &UserId,
        collection: Collection,
    ) -> Result<Option<AutoCommit>, StorageError> {
        let path = self.path(uid, collection);

        match fs::read(&path) {
            Ok(bytes) => {
                let doc = AutoCommit::load(&bytes)
                    .map_err(|e| StorageError::LoadError(path, e.to_string()))?;
                Ok(Some(doc))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(path, e)),
        }
    }

    /// Loads a document or creates an empty one if it doesn't exist.
    pub fn load_or_create(
        &self,
        uid: &UserId,
        collection: Collection,
    ) -> Result<AutoCommit, StorageError> {
        match self.load(uid, collection)? {
            Some(doc) => Ok(doc),
            None => {
                tracing::debug!("No {} document for {}, starting empty", collection, uid);
                Ok(AutoCommit::new())
            }
        }
    }

    /// Merges the copy currently on disk into `doc`.
    ///
    /// Picks up changes saved by another process since `doc` was loaded.
    pub fn refresh(
        &self,
        uid: &UserId,
        collection: Collection,
        doc: &mut AutoCommit,
    ) -> Result<(), StorageError> {
        if let Some(mut on_disk) = self.load(uid, collection)? {
            doc.merge(&mut on_disk)
                .map_err(|e| StorageError::MergeError(self.path(uid, collection), e.to_string()))?;
        }
        Ok(())
    }

    /// Saves a document to disk, creating the user directory if needed.
    ///
    /// The on-disk copy is merged in first so concurrent writers keep each
    /// other's changes. The file is replaced through a rename, never written
    /// in place.
    pub fn save(
        &self,
        uid: &UserId,
        collection: Collection,
        doc: &mut AutoCommit,
    ) -> Result<(), StorageError> {
        let dir = self.user_dir(uid);
        fs::create_dir_all(&dir).map_err(|e| StorageError::IoError(dir, e))?;

        self.refresh(uid, collection, doc)?;

        let path = self.path(uid, collection);
        let tmp = path.with_extension("automerge.tmp");
        let bytes = doc.save();

        fs::write(&tmp, bytes).map_err(|e| StorageError::IoError(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::IoError(path, e))?;

        Ok(())
    }
}

/// Errors that can occur during document storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
    /// Error loading/parsing an Automerge document.
    LoadError(PathBuf, String),
    /// Error merging the on-disk copy into a document.
    MergeError(PathBuf, String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::LoadError(path, e) => {
                write!(f, "Failed to load document {}: {}", path.display(), e)
            }
            StorageError::MergeError(path, e) => {
                write!(f, "Failed to merge document {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(_, e) => Some(e),
            StorageError::LoadError(_, _) | StorageError::MergeError(_, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automerge::{transaction::Transactable, ReadDoc, ROOT};
    use tempfile::TempDir;

    fn test_storage() -> (UserDocStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = UserDocStorage::new(temp_dir.path().to_path_buf());
        (storage, temp_dir)
    }

    fn uid(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[test]
    fn test_storage_path() {
        let (storage, temp) = test_storage();
        let path = storage.path(&uid("alice"), Collection::Recipes);
        assert_eq!(
            path,
            temp.path().join("users").join("alice").join("recipes.automerge")
        );
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let (storage, _temp) = test_storage();
        assert!(storage.load(&uid("alice"), Collection::Routines).unwrap().is_none());
        assert!(!storage.exists(&uid("alice"), Collection::Routines));
    }

    #[test]
    fn test_load_or_create_nonexistent() {
        let (storage, _temp) = test_storage();
        let doc = storage
            .load_or_create(&uid("alice"), Collection::MealPlans)
            .unwrap();
        assert_eq!(doc.length(ROOT), 0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (storage, _temp) = test_storage();
        let alice = uid("alice");

        let mut doc = AutoCommit::new();
        doc.put(ROOT, "test_key", "test_value").unwrap();
        storage.save(&alice, Collection::Recipes, &mut doc).unwrap();
        assert!(storage.exists(&alice, Collection::Recipes));

        let loaded = storage.load(&alice, Collection::Recipes).unwrap().unwrap();
        let value: Option<String> = loaded
            .get(ROOT, "test_key")
            .unwrap()
            .map(|(v, _)| v.into_string().unwrap());
        assert_eq!(value, Some("test_value".to_string()));
    }

    #[test]
    fn test_users_are_isolated() {
        let (storage, _temp) = test_storage();

        let mut doc = AutoCommit::new();
        doc.put(ROOT, "owner", "alice").unwrap();
        storage.save(&uid("alice"), Collection::Routines, &mut doc).unwrap();

        assert!(storage.exists(&uid("alice"), Collection::Routines));
        assert!(!storage.exists(&uid("bob"), Collection::Routines));
        assert!(!storage.exists(&uid("alice"), Collection::Recipes));
    }

    #[test]
    fn test_save_keeps_changes_saved_by_another_writer() {
        let (storage, _temp) = test_storage();
        let alice = uid("alice");

        let mut base = AutoCommit::new();
        base.put(ROOT, "base", true).unwrap();
        storage.save(&alice, Collection::MealPlans, &mut base).unwrap();

        let mut first = storage.load(&alice, Collection::MealPlans).unwrap().unwrap();
        let mut second = storage.load(&alice, Collection::MealPlans).unwrap().unwrap();
        first.put(ROOT, "breakfast", "A").unwrap();
        storage.save(&alice, Collection::MealPlans, &mut first).unwrap();
        second.put(ROOT, "lunch", "B").unwrap();
        storage.save(&alice, Collection::MealPlans, &mut second).unwrap();

        let loaded = storage.load(&alice, Collection::MealPlans).unwrap().unwrap();
        assert!(loaded.get(ROOT, "base").unwrap().is_some());
        assert!(loaded.get(ROOT, "breakfast").unwrap().is_some());
        assert!(loaded.get(ROOT, "lunch").unwrap().is_some());
    }

    #[test]
    fn test_refresh_picks_up_saved_changes() {
        let (storage, _temp) = test_storage();
        let alice = uid("alice");

        let mut stale = storage.load_or_create(&alice, Collection::Recipes).unwrap();
        let mut other = AutoCommit::new();
        other.put(ROOT, "recipe-1", "Soup").unwrap();
        storage.save(&alice, Collection::Recipes, &mut other).unwrap();

        storage.refresh(&alice, Collection::Recipes, &mut stale).unwrap();
        assert!(stale.get(ROOT, "recipe-1").unwrap().is_some());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let (storage, _temp) = test_storage();
        let alice = uid("alice");

        let mut doc = AutoCommit::new();
        doc.put(ROOT, "k", "v").unwrap();
        storage.save(&alice, Collection::Routines, &mut doc).unwrap();

        let names: Vec<String> = fs::read_dir(storage.user_dir(&alice))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["routines.automerge"]);
    }

    #[test]
    fn test_stale_temp_file_is_ignored() {
        let (storage, _temp) = test_storage();
        let alice = uid("alice");
        fs::create_dir_all(storage.user_dir(&alice)).unwrap();
        let path = storage.path(&alice, Collection::Routines);
        fs::write(path.with_extension("automerge.tmp"), b"half written").unwrap();

        let mut doc = AutoCommit::new();
        doc.put(ROOT, "k", "v").unwrap();
        storage.save(&alice, Collection::Routines, &mut doc).unwrap();
        assert!(storage.load(&alice, Collection::Routines).unwrap().is_some());
    }

    #[test]
    fn test_corrupt_file_is_load_error() {
        let (storage, _temp) = test_storage();
        let alice = uid("alice");
        fs::create_dir_all(storage.user_dir(&alice)).unwrap();
        fs::write(storage.path(&alice, Collection::Recipes), b"not automerge").unwrap();

        let err = storage.load(&alice, Collection::Recipes).unwrap_err();
        assert!(matches!(err, StorageError::LoadError(_, _)));
    }
}
