//! Safe delete and recreate orchestration.
//!
//! Every destructive call is preceded by a full snapshot-and-gate pass; a
//! denied gate returns before any mutation. Deletion is confirmed by a
//! bounded existence poll, and recreation replays only the settings an
//! operator deliberately overrode.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::admin::{ClusterAdmin, NewTopic};
use crate::config::StewardConfig;
use crate::error::{Result, StewardError};
use crate::gates::{evaluate_delete, GateInputs, PreconditionResult};
use crate::inspect::{ClusterInspector, TopicConfig};

/// Result of one guarded delete, with the pre-delete configuration echoed
/// for auditing and for replay on recreate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub allowed: bool,
    pub message: String,
    pub config: TopicConfig,
}

impl DeleteOutcome {
    fn from_verdict(verdict: PreconditionResult, config: TopicConfig) -> Self {
        Self {
            allowed: verdict.allowed,
            message: verdict.reason,
            config,
        }
    }
}

/// Per-topic entry in a batch result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicOutcome {
    pub success: bool,
    pub message: String,
    pub config: TopicConfig,
}

/// Aggregate of a batched operation. `success` is true only when every
/// topic succeeded; individual failures never abort the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub success: bool,
    pub results: BTreeMap<String, TopicOutcome>,
}

pub struct TopicSteward {
    admin: Arc<dyn ClusterAdmin>,
    inspector: ClusterInspector,
    config: StewardConfig,
}

impl TopicSteward {
    pub fn new(admin: Arc<dyn ClusterAdmin>, config: StewardConfig) -> Self {
        let inspector = ClusterInspector::new(admin.clone(), config.operation_timeout());
        Self {
            admin,
            inspector,
            config,
        }
    }

    pub fn inspector(&self) -> &ClusterInspector {
        &self.inspector
    }

    /// Guarded single-topic delete.
    ///
    /// Gate denials come back as `allowed=false` outcomes, not errors; only
    /// capability failures (unreachable cluster, failed delete call, timed
    /// out confirmation) are `Err`.
    pub async fn delete_topic(&self, topic: &str, dry_run: bool) -> Result<DeleteOutcome> {
        tracing::debug!(topic, dry_run, "gathering cluster and topic information");
        let cluster = self.inspector.snapshot_cluster().await?;
        let topic_snapshot = self.inspector.snapshot_topic(topic).await?;
        let broker_configs = self.inspector.snapshot_broker_configs(&cluster).await;
        let consumer_groups = self.inspector.consumer_groups(topic).await?;

        let verdict = evaluate_delete(&GateInputs {
            topic,
            topic_snapshot: &topic_snapshot,
            broker_configs: &broker_configs,
            consumer_groups: &consumer_groups,
        });

        if !verdict.allowed {
            tracing::info!(topic, reason = %verdict.reason, "delete precondition denied");
            return Ok(DeleteOutcome::from_verdict(verdict, topic_snapshot.config));
        }
        if !topic_snapshot.exists() {
            // Vacuous allow: nothing to delete, nothing to confirm.
            return Ok(DeleteOutcome::from_verdict(verdict, topic_snapshot.config));
        }

        if dry_run {
            return Ok(DeleteOutcome {
                allowed: true,
                message: format!("Dry run: topic {topic} would be deleted."),
                config: topic_snapshot.config,
            });
        }

        tracing::info!(topic, "deleting topic");
        self.admin.delete_topic(topic).await?;
        self.confirm_deleted(topic).await?;

        Ok(DeleteOutcome {
            allowed: true,
            message: format!("Topic {topic} has been deleted."),
            config: topic_snapshot.config,
        })
    }

    /// Re-checks existence at a fixed interval until the cluster confirms
    /// the topic is gone, bounded by `max_delete_checks`.
    async fn confirm_deleted(&self, topic: &str) -> Result<()> {
        for _ in 0..self.config.max_delete_checks {
            let partitions = self
                .admin
                .topic_partitions(topic, self.config.operation_timeout())
                .await?;
            if partitions.is_empty() {
                return Ok(());
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
        Err(StewardError::DeletionTimedOut {
            topic: topic.to_string(),
            attempts: self.config.max_delete_checks,
        })
    }

    /// Deletes each topic independently: one failure is recorded in that
    /// topic's entry and the batch carries on.
    pub async fn delete_topics(&self, topics: &[String], dry_run: bool) -> BatchOutcome {
        let mut results = BTreeMap::new();
        let mut success = true;

        for topic in topics {
            let outcome = match self.delete_topic(topic, dry_run).await {
                Ok(outcome) => TopicOutcome {
                    success: outcome.allowed,
                    message: outcome.message,
                    config: outcome.config,
                },
                Err(e) => TopicOutcome {
                    success: false,
                    message: e.to_string(),
                    config: TopicConfig::default(),
                },
            };
            if !outcome.success {
                success = false;
            }
            results.insert(topic.clone(), outcome);
        }

        BatchOutcome { success, results }
    }

    /// Delete-then-create. The create step runs only when the delete phase
    /// succeeded, and replays the captured non-default settings on a fresh
    /// single-partition topic.
    pub async fn recreate_topic(&self, topic: &str) -> Result<TopicOutcome> {
        let deleted = self.delete_topic(topic, false).await?;
        if !deleted.allowed {
            return Ok(TopicOutcome {
                success: false,
                message: deleted.message,
                config: deleted.config,
            });
        }

        let settings = deleted.config.non_default.clone();
        self.admin
            .create_topic(NewTopic {
                name: topic.to_string(),
                partitions: 1,
                replication_factor: 1,
                config: settings.clone(),
            })
            .await?;
        tracing::info!(topic, ?settings, "topic recreated");

        let create_message = format!("Topic {topic} created with options: {settings:?}.");
        Ok(TopicOutcome {
            success: true,
            message: format!("{} {}", deleted.message, create_message),
            config: deleted.config,
        })
    }

    /// Batched recreate with the same fail-independent aggregation as
    /// [`Self::delete_topics`].
    pub async fn recreate_topics(&self, topics: &[String]) -> BatchOutcome {
        let mut results = BTreeMap::new();
        let mut success = true;

        for topic in topics {
            let outcome = match self.recreate_topic(topic).await {
                Ok(outcome) => outcome,
                Err(e) => TopicOutcome {
                    success: false,
                    message: e.to_string(),
                    config: TopicConfig::default(),
                },
            };
            if !outcome.success {
                success = false;
            }
            results.insert(topic.clone(), outcome);
        }

        BatchOutcome { success, results }
    }
}
