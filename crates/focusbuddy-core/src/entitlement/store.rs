//! Storage ports for the subscription record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::record::SubscriptionRecord;
use crate::error::Result;

/// Where the single subscription record lives.
pub trait SubscriptionStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<SubscriptionRecord>>;

    /// Replace whatever is stored.
    fn save(&self, record: &SubscriptionRecord) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// In-process store, used by tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemorySubscriptionStore {
    slot: Mutex<Option<SubscriptionRecord>>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: SubscriptionRecord) -> Self {
        Self {
            slot: Mutex::new(Some(record)),
        }
    }
}

impl SubscriptionStore for MemorySubscriptionStore {
    fn load(&self) -> Result<Option<SubscriptionRecord>> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slot.clone())
    }

    fn save(&self, record: &SubscriptionRecord) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}

/// JSON file on disk, normally `<data dir>/subscription.json`.
#[derive(Debug, Clone)]
pub struct FileSubscriptionStore {
    path: PathBuf,
}

impl FileSubscriptionStore {
    pub const FILE_NAME: &'static str = "subscription.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubscriptionStore for FileSubscriptionStore {
    fn load(&self) -> Result<Option<SubscriptionRecord>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, record: &SubscriptionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash never leaves half a record behind.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::PlanId;
    use crate::entitlement::SubscriptionStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn record() -> SubscriptionRecord {
        let created = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        SubscriptionRecord {
            plan_id: PlanId::Premium,
            reference: "FB_REF".into(),
            status: SubscriptionStatus::Active,
            created_at: created,
            expires_at: created + Duration::days(30),
        }
    }

    #[test]
    fn file_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSubscriptionStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn file_store_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSubscriptionStore::in_dir(dir.path());

        store.save(&record()).unwrap();
        let mut second = record();
        second.plan_id = PlanId::Pro;
        second.reference = "FB_OTHER".into();
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), Some(second));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSubscriptionStore::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_err());
    }
}
