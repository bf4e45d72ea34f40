//! Migration ledger.
//!
//! The latest applied migration id lives in a dedicated single-partition
//! control topic on the cluster itself, appended under a fixed key. State
//! survives driver restarts, and any process can decide whether a migration
//! has already been applied by reading the last record. No writer
//! coordination: a single active migration driver is assumed.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::admin::{RecordConsumer, RecordProducer};
use crate::config::StewardConfig;
use crate::error::{Result, StewardError};

/// The latest ledger entry observed on the control topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub migration_id: u64,
    /// Offset of the record in the control topic.
    pub applied_at: i64,
}

pub struct MigrationLedger {
    producer: Arc<dyn RecordProducer>,
    consumer: Arc<dyn RecordConsumer>,
    topic: String,
    key: String,
    group: String,
}

impl MigrationLedger {
    pub fn new(
        producer: Arc<dyn RecordProducer>,
        consumer: Arc<dyn RecordConsumer>,
        config: &StewardConfig,
    ) -> Self {
        Self {
            producer,
            consumer,
            topic: config.ledger_topic.clone(),
            key: config.ledger_key.clone(),
            group: config.ledger_group.clone(),
        }
    }

    /// Appends `id` as the new latest applied migration. Failures propagate
    /// as `LedgerUnavailable`: silently proceeding would risk re-applying a
    /// migration on the next run.
    pub async fn record_applied(&self, id: u64) -> Result<()> {
        self.producer
            .send(&self.topic, &self.key, &id.to_string())
            .await
            .map_err(|e| StewardError::LedgerUnavailable(e.to_string()))?;
        tracing::info!(migration_id = id, topic = %self.topic, "recorded applied migration");
        Ok(())
    }

    /// Reads the control topic from the start to its current end (or until
    /// `timeout` elapses between records) and returns the last entry seen.
    /// An empty topic yields None.
    pub async fn latest_applied(&self, timeout: Duration) -> Result<Option<MigrationRecord>> {
        let mut cursor = self
            .consumer
            .open_cursor(&self.topic, &self.group)
            .await
            .map_err(|e| StewardError::LedgerUnavailable(e.to_string()))?;

        let mut latest = None;
        while let Some(record) = cursor
            .next(timeout)
            .await
            .map_err(|e| StewardError::LedgerUnavailable(e.to_string()))?
        {
            latest = Some(record);
        }

        match latest {
            None => Ok(None),
            Some(record) => {
                let migration_id = record.value.trim().parse::<u64>().map_err(|_| {
                    StewardError::LedgerUnavailable(format!(
                        "malformed ledger record at offset {}: {:?}",
                        record.offset, record.value
                    ))
                })?;
                Ok(Some(MigrationRecord {
                    migration_id,
                    applied_at: record.offset,
                }))
            }
        }
    }
}
