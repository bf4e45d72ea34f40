//! Cluster Inspector: read-only snapshots of cluster, topic, and broker
//! state used by the delete preconditions. Every snapshot is produced fresh
//! per operation and never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::admin::{BrokerId, ClusterAdmin, ConfigEntry, ConfigResource, PartitionInfo};
use crate::error::Result;

/// Point-in-time view of broker ids and topic names.
#[derive(Debug, Clone)]
pub struct ClusterSnapshot {
    pub brokers: BTreeSet<BrokerId>,
    pub topics: BTreeSet<String>,
    pub taken_at: SystemTime,
}

/// Full and operator-overridden configuration of one topic.
///
/// `non_default` holds only keys whose value differs from the broker
/// default; it is the exact set replayed when a topic is recreated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicConfig {
    pub full: BTreeMap<String, String>,
    pub non_default: BTreeMap<String, String>,
}

impl TopicConfig {
    pub fn from_entries(entries: BTreeMap<String, ConfigEntry>) -> Self {
        let mut config = TopicConfig::default();
        for (key, entry) in entries {
            if !entry.is_default {
                config.non_default.insert(key.clone(), entry.value.clone());
            }
            config.full.insert(key, entry.value);
        }
        config
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }
}

/// Availability view of one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPartitionState {
    pub id: i32,
    pub online: bool,
    pub in_sync_replicas: usize,
}

impl From<&PartitionInfo> for TopicPartitionState {
    fn from(info: &PartitionInfo) -> Self {
        Self {
            id: info.id,
            online: info.leader.is_some(),
            in_sync_replicas: info.in_sync_replicas.len(),
        }
    }
}

/// Configuration and partition state of one topic. Empty for an absent
/// topic, which callers treat as a normal outcome.
#[derive(Debug, Clone, Default)]
pub struct TopicSnapshot {
    pub config: TopicConfig,
    pub partitions: Vec<TopicPartitionState>,
}

impl TopicSnapshot {
    pub fn exists(&self) -> bool {
        !self.partitions.is_empty()
    }
}

/// Outcome of describing one broker's configuration. A broker whose
/// describe call failed stays visible as `Unavailable` so the capability
/// guard can fail closed instead of treating it as an empty config.
#[derive(Debug, Clone)]
pub enum BrokerConfigState {
    Described(BTreeMap<String, String>),
    Unavailable(String),
}

impl BrokerConfigState {
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            BrokerConfigState::Described(config) => config.get(key).map(String::as_str),
            BrokerConfigState::Unavailable(_) => None,
        }
    }
}

pub type BrokerConfigs = BTreeMap<BrokerId, BrokerConfigState>;

pub struct ClusterInspector {
    admin: Arc<dyn ClusterAdmin>,
    timeout: Duration,
}

impl ClusterInspector {
    pub fn new(admin: Arc<dyn ClusterAdmin>, timeout: Duration) -> Self {
        Self { admin, timeout }
    }

    pub async fn snapshot_cluster(&self) -> Result<ClusterSnapshot> {
        let metadata = self.admin.cluster_metadata(self.timeout).await?;
        Ok(ClusterSnapshot {
            brokers: metadata.brokers,
            topics: metadata.topics.into_keys().collect(),
            taken_at: SystemTime::now(),
        })
    }

    /// Topic config plus partition availability. An absent topic yields an
    /// empty snapshot; a failed topic describe degrades to an empty config
    /// with a warning rather than aborting the safety check.
    pub async fn snapshot_topic(&self, topic: &str) -> Result<TopicSnapshot> {
        let partitions = self.admin.topic_partitions(topic, self.timeout).await?;
        if partitions.is_empty() {
            return Ok(TopicSnapshot::default());
        }

        let config = match self
            .admin
            .describe_configs(ConfigResource::Topic(topic.to_string()))
            .await
        {
            Ok(entries) => TopicConfig::from_entries(entries),
            Err(e) => {
                tracing::warn!(topic, error = %e, "failed to describe topic config");
                TopicConfig::default()
            }
        };

        Ok(TopicSnapshot {
            config,
            partitions: partitions.iter().map(TopicPartitionState::from).collect(),
        })
    }

    /// Describes every broker in the snapshot. Per-broker failures are
    /// recorded and logged, not escalated, so one unreachable broker does
    /// not abort the whole safety check.
    pub async fn snapshot_broker_configs(&self, cluster: &ClusterSnapshot) -> BrokerConfigs {
        let mut configs = BrokerConfigs::new();
        for &broker_id in &cluster.brokers {
            let state = match self
                .admin
                .describe_configs(ConfigResource::Broker(broker_id))
                .await
            {
                Ok(entries) => BrokerConfigState::Described(
                    entries.into_iter().map(|(k, e)| (k, e.value)).collect(),
                ),
                Err(e) => {
                    tracing::warn!(broker_id, error = %e, "failed to describe broker config");
                    BrokerConfigState::Unavailable(e.to_string())
                }
            };
            configs.insert(broker_id, state);
        }
        configs
    }

    pub async fn consumer_groups(&self, topic: &str) -> Result<Vec<String>> {
        self.admin.consumer_groups_for(topic).await
    }
}
