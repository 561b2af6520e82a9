//! Reward persistence: coloring-page images earned by finishing sessions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::storage::Database;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub asset_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedReward {
    pub asset_path: String,
}

pub trait RewardStore: Send + Sync {
    /// Empty for users with no rewards.
    fn list_rewards(&self, user_id: &str) -> Result<Vec<RewardRecord>>;

    fn save_reward(&self, user_id: &str, session_id: &str, image: &[u8]) -> Result<SavedReward>;
}

/// Images under `<root>/rewards/<user>/<uuid>.png`, index rows in SQLite.
pub struct LocalRewardStore {
    db: Arc<Database>,
    root: PathBuf,
}

impl LocalRewardStore {
    pub fn new(db: Arc<Database>, root: impl Into<PathBuf>) -> Self {
        Self {
            db,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored `asset_path` to a file on disk.
    pub fn resolve(&self, asset_path: &str) -> PathBuf {
        self.root.join(asset_path)
    }
}

impl RewardStore for LocalRewardStore {
    fn list_rewards(&self, user_id: &str) -> Result<Vec<RewardRecord>> {
        require("userId", user_id)?;
        self.db.list_rewards(user_id)
    }

    fn save_reward(&self, user_id: &str, session_id: &str, image: &[u8]) -> Result<SavedReward> {
        require("userId", user_id)?;
        require("sessionId", session_id)?;
        if image.is_empty() {
            return Err(ValidationError::MissingField("imageData".into()).into());
        }
        path_safe("userId", user_id)?;

        let asset_path = format!("rewards/{user_id}/{}.png", Uuid::new_v4());
        let file = self.resolve(&asset_path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file, image)?;
        if let Err(err) = self
            .db
            .insert_reward(user_id, session_id, &asset_path, Utc::now())
        {
            // An unindexed image would never be listed.
            if let Err(cleanup) = std::fs::remove_file(&file) {
                warn!(path = %file.display(), error = %cleanup, "could not remove unindexed reward image");
            }
            return Err(err);
        }

        info!(user_id, session_id, asset_path = %asset_path, "reward saved");
        Ok(SavedReward { asset_path })
    }
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field.into()))
    } else {
        Ok(())
    }
}

/// The id becomes a directory name, so keep it to one plain path segment.
fn path_safe(field: &str, value: &str) -> Result<(), ValidationError> {
    let ok = value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            message: "may only contain letters, digits and - _ . @".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn store() -> (tempfile::TempDir, LocalRewardStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::open_memory().unwrap());
        let store = LocalRewardStore::new(db, dir.path());
        (dir, store)
    }

    #[test]
    fn unknown_user_has_no_rewards() {
        let (_dir, store) = store();
        assert!(store.list_rewards("nobody").unwrap().is_empty());
    }

    #[test]
    fn save_writes_png_and_indexes_it() {
        let (_dir, store) = store();
        let saved = store.save_reward("user-1", "session-1", b"\x89PNG").unwrap();

        assert!(saved.asset_path.starts_with("rewards/user-1/"));
        assert!(saved.asset_path.ends_with(".png"));
        assert_eq!(std::fs::read(store.resolve(&saved.asset_path)).unwrap(), b"\x89PNG");

        let listed = store.list_rewards("user-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].asset_path, saved.asset_path);
    }

    #[test]
    fn missing_fields_are_validation_errors() {
        let (_dir, store) = store();
        for (user, session, image) in [
            ("", "s", &b"x"[..]),
            ("u", " ", &b"x"[..]),
            ("u", "s", &b""[..]),
        ] {
            let err = store.save_reward(user, session, image).unwrap_err();
            assert!(matches!(
                err,
                CoreError::Validation(ValidationError::MissingField(_))
            ));
        }
    }

    #[test]
    fn failed_index_insert_leaves_no_image_behind() {
        let (dir, store) = store();
        store.db.execute_batch("DROP TABLE rewards;").unwrap();

        let err = store.save_reward("user-1", "session-1", b"\x89PNG").unwrap_err();
        assert!(matches!(err, CoreError::Database(_)));

        let user_dir = dir.path().join("rewards").join("user-1");
        let leftovers = std::fs::read_dir(&user_dir).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn traversal_in_user_id_is_rejected() {
        let (_dir, store) = store();
        for user in ["..", "a/b", "../etc"] {
            let err = store.save_reward(user, "s", b"x").unwrap_err();
            assert!(matches!(
                err,
                CoreError::Validation(ValidationError::InvalidValue { .. })
            ));
        }
    }
}
