use std::sync::Arc;

use focusbuddy_core::billing::{PaymentVerifier, StubVerifier};
use focusbuddy_core::storage::data_dir;
use focusbuddy_core::{Config, CoreError, Database, LocalRewardStore, RewardStore, TipProvider};

/// Shared by every handler behind an `Arc`.
pub struct AppState {
    pub config: Config,
    pub tips: TipProvider,
    pub db: Arc<Database>,
    pub rewards: Arc<dyn RewardStore>,
    pub verifier: Arc<dyn PaymentVerifier>,
}

impl AppState {
    /// Open the on-disk database and reward directory under the data dir.
    pub fn new(config: Config) -> Result<Arc<Self>, CoreError> {
        let dir = data_dir()?;
        let db = Arc::new(Database::open()?);
        let rewards = Arc::new(LocalRewardStore::new(db.clone(), dir));
        let tips = TipProvider::from_config(&config.tips)?;

        Ok(Arc::new(Self {
            config,
            tips,
            db,
            rewards,
            verifier: Arc::new(StubVerifier),
        }))
    }
}
