use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::WagerRecord;
use crate::error::Result;

/// Where settlement reads wagers from and writes results back to
#[async_trait]
pub trait WagerStore: Send + Sync {
    async fn get(&self, wager_id: &str) -> Result<Option<WagerRecord>>;

    /// Insert or replace by id
    async fn save(&self, record: WagerRecord) -> Result<()>;

    /// Ids of every non-terminal wager, in insertion order
    async fn pending_ids(&self) -> Result<Vec<String>>;
}

/// Ordered in-memory store, loadable from and savable to a JSON array
#[derive(Default)]
pub struct InMemoryWagerStore {
    records: RwLock<Vec<WagerRecord>>,
}

impl InMemoryWagerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<WagerRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let records: Vec<WagerRecord> = serde_json::from_str(&raw)?;
        debug!(path = %path.as_ref().display(), count = records.len(), "loaded wagers");
        Ok(Self::from_records(records))
    }

    pub async fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let records = self.records.read().await;
        let raw = serde_json::to_string_pretty(&*records)?;
        tokio::fs::write(path.as_ref(), raw).await?;
        debug!(path = %path.as_ref().display(), count = records.len(), "saved wagers");
        Ok(())
    }

    pub async fn records(&self) -> Vec<WagerRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl WagerStore for InMemoryWagerStore {
    async fn get(&self, wager_id: &str) -> Result<Option<WagerRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == wager_id).cloned())
    }

    async fn save(&self, record: WagerRecord) -> Result<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    async fn pending_ids(&self) -> Result<Vec<String>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| !r.is_terminal())
            .map(|r| r.id.clone())
            .collect())
    }
}
