//! In-process cluster backend.
//!
//! Implements the capability traits over shared in-memory state. This is
//! the test double for the orchestrators and the `memory` backend of the
//! mgmt binary; a real deployment satisfies the same traits with an
//! external client library.
//!
//! Fault injection hooks: an unreachable cluster, per-broker describe
//! failures, and a mode that accepts delete calls without removing the
//! topic (for exercising the deletion-timeout path).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::admin::{
    BrokerId, ClusterAdmin, ClusterMetadata, ConfigEntry, ConfigResource, ConsumedRecord,
    NewTopic, PartitionInfo, RecordConsumer, RecordCursor, RecordProducer,
};
use crate::error::{Result, StewardError};

#[derive(Debug, Clone)]
struct StoredRecord {
    key: Option<String>,
    value: String,
}

#[derive(Debug, Default)]
struct TopicState {
    partitions: Vec<PartitionInfo>,
    config: BTreeMap<String, ConfigEntry>,
    records: Vec<StoredRecord>,
    consumer_groups: BTreeSet<String>,
}

#[derive(Default)]
struct Inner {
    brokers: BTreeMap<BrokerId, BTreeMap<String, ConfigEntry>>,
    topics: BTreeMap<String, TopicState>,
    failing_broker_describes: BTreeSet<BrokerId>,
    unreachable: bool,
    ignore_deletes: bool,
    delete_calls: Vec<String>,
    create_calls: Vec<String>,
}

#[derive(Clone)]
pub struct MemoryCluster {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryCluster {
    /// A cluster of `n` brokers, each with deletion enabled and topic
    /// auto-creation disabled as broker defaults.
    pub fn with_brokers(n: i32) -> Self {
        let mut brokers = BTreeMap::new();
        for id in 0..n {
            let mut config = BTreeMap::new();
            config.insert(
                String::from("delete.topic.enable"),
                ConfigEntry::new("true", true),
            );
            config.insert(
                String::from("auto.create.topics.enable"),
                ConfigEntry::new("false", true),
            );
            brokers.insert(id, config);
        }
        Self {
            inner: Arc::new(RwLock::new(Inner {
                brokers,
                ..Inner::default()
            })),
        }
    }

    pub async fn add_topic(&self, name: &str, partitions: i32) {
        let mut inner = self.inner.write().await;
        let broker_ids: Vec<BrokerId> = inner.brokers.keys().copied().collect();
        let state = TopicState {
            partitions: (0..partitions)
                .map(|id| {
                    let leader = broker_ids
                        .get(id as usize % broker_ids.len().max(1))
                        .copied()
                        .unwrap_or(0);
                    PartitionInfo::online(id, leader, vec![leader])
                })
                .collect(),
            ..TopicState::default()
        };
        inner.topics.insert(name.to_string(), state);
    }

    pub async fn set_topic_config(&self, topic: &str, key: &str, value: &str, is_default: bool) {
        let mut inner = self.inner.write().await;
        if let Some(state) = inner.topics.get_mut(topic) {
            state
                .config
                .insert(key.to_string(), ConfigEntry::new(value, is_default));
        }
    }

    pub async fn set_broker_config(&self, broker: BrokerId, key: &str, value: &str) {
        let mut inner = self.inner.write().await;
        if let Some(config) = inner.brokers.get_mut(&broker) {
            config.insert(key.to_string(), ConfigEntry::new(value, false));
        }
    }

    pub async fn set_partition_offline(&self, topic: &str, partition: i32) {
        let mut inner = self.inner.write().await;
        if let Some(state) = inner.topics.get_mut(topic) {
            if let Some(p) = state.partitions.iter_mut().find(|p| p.id == partition) {
                p.leader = None;
                p.in_sync_replicas.clear();
            }
        }
    }

    pub async fn subscribe_group(&self, topic: &str, group: &str) {
        let mut inner = self.inner.write().await;
        if let Some(state) = inner.topics.get_mut(topic) {
            state.consumer_groups.insert(group.to_string());
        }
    }

    pub async fn fail_broker_describe(&self, broker: BrokerId) {
        self.inner.write().await.failing_broker_describes.insert(broker);
    }

    pub async fn set_unreachable(&self, unreachable: bool) {
        self.inner.write().await.unreachable = unreachable;
    }

    /// Accept delete calls without removing the topic.
    pub async fn set_ignore_deletes(&self, ignore: bool) {
        self.inner.write().await.ignore_deletes = ignore;
    }

    pub async fn topic_exists(&self, name: &str) -> bool {
        self.inner.read().await.topics.contains_key(name)
    }

    pub async fn delete_calls(&self) -> Vec<String> {
        self.inner.read().await.delete_calls.clone()
    }

    pub async fn create_calls(&self) -> Vec<String> {
        self.inner.read().await.create_calls.clone()
    }

    pub async fn topic_config_entries(&self, name: &str) -> BTreeMap<String, ConfigEntry> {
        self.inner
            .read()
            .await
            .topics
            .get(name)
            .map(|s| s.config.clone())
            .unwrap_or_default()
    }
}

fn check_reachable(inner: &Inner) -> Result<()> {
    if inner.unreachable {
        return Err(StewardError::ClusterUnreachable(String::from(
            "connection refused",
        )));
    }
    Ok(())
}

fn auto_create_enabled(inner: &Inner) -> bool {
    inner.brokers.values().any(|config| {
        config
            .get("auto.create.topics.enable")
            .map(|e| e.value == "true")
            .unwrap_or(false)
    })
}

#[async_trait]
impl ClusterAdmin for MemoryCluster {
    async fn cluster_metadata(&self, _timeout: Duration) -> Result<ClusterMetadata> {
        let inner = self.inner.read().await;
        check_reachable(&inner)?;
        Ok(ClusterMetadata {
            brokers: inner.brokers.keys().copied().collect(),
            topics: inner
                .topics
                .iter()
                .map(|(name, state)| (name.clone(), state.partitions.clone()))
                .collect(),
        })
    }

    async fn topic_partitions(
        &self,
        topic: &str,
        _timeout: Duration,
    ) -> Result<Vec<PartitionInfo>> {
        let inner = self.inner.read().await;
        check_reachable(&inner)?;
        Ok(inner
            .topics
            .get(topic)
            .map(|s| s.partitions.clone())
            .unwrap_or_default())
    }

    async fn describe_configs(
        &self,
        resource: ConfigResource,
    ) -> Result<BTreeMap<String, ConfigEntry>> {
        let inner = self.inner.read().await;
        check_reachable(&inner)?;
        match resource {
            ConfigResource::Broker(id) => {
                if inner.failing_broker_describes.contains(&id) {
                    return Err(StewardError::admin(
                        format!("describe broker/{id}"),
                        "injected describe failure",
                    ));
                }
                Ok(inner.brokers.get(&id).cloned().unwrap_or_default())
            }
            ConfigResource::Topic(name) => Ok(inner
                .topics
                .get(&name)
                .map(|s| s.config.clone())
                .unwrap_or_default()),
        }
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<()> {
        let mut inner = self.inner.write().await;
        check_reachable(&inner)?;
        if inner.topics.contains_key(&topic.name) {
            return Err(StewardError::admin(
                format!("create topic/{}", topic.name),
                "topic already exists",
            ));
        }
        inner.create_calls.push(topic.name.clone());
        let broker_ids: Vec<BrokerId> = inner.brokers.keys().copied().collect();
        let leader = broker_ids.first().copied().unwrap_or(0);
        let state = TopicState {
            partitions: (0..topic.partitions)
                .map(|id| PartitionInfo::online(id, leader, vec![leader]))
                .collect(),
            config: topic
                .config
                .iter()
                .map(|(k, v)| (k.clone(), ConfigEntry::new(v.clone(), false)))
                .collect(),
            ..TopicState::default()
        };
        inner.topics.insert(topic.name, state);
        Ok(())
    }

    async fn delete_topic(&self, topic: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        check_reachable(&inner)?;
        inner.delete_calls.push(topic.to_string());
        if !inner.ignore_deletes {
            inner.topics.remove(topic);
        }
        Ok(())
    }

    async fn consumer_groups_for(&self, topic: &str) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        check_reachable(&inner)?;
        Ok(inner
            .topics
            .get(topic)
            .map(|s| s.consumer_groups.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl RecordProducer for MemoryCluster {
    async fn send(&self, topic: &str, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        check_reachable(&inner)?;
        if !inner.topics.contains_key(topic) {
            // Producing against a missing topic only works when the cluster
            // auto-creates it, which is exactly the resurrect hazard the
            // delete gates guard against.
            if !auto_create_enabled(&inner) {
                return Err(StewardError::admin(
                    format!("produce topic/{topic}"),
                    "unknown topic and auto-creation disabled",
                ));
            }
            let leader = inner.brokers.keys().next().copied().unwrap_or(0);
            inner.topics.insert(
                topic.to_string(),
                TopicState {
                    partitions: vec![PartitionInfo::online(0, leader, vec![leader])],
                    ..TopicState::default()
                },
            );
        }
        let state = inner.topics.entry(topic.to_string()).or_default();
        state.records.push(StoredRecord {
            key: Some(key.to_string()),
            value: value.to_string(),
        });
        Ok(())
    }
}

struct MemoryCursor {
    records: Vec<ConsumedRecord>,
    position: usize,
}

#[async_trait]
impl RecordCursor for MemoryCursor {
    async fn next(&mut self, _poll_timeout: Duration) -> Result<Option<ConsumedRecord>> {
        let record = self.records.get(self.position).cloned();
        if record.is_some() {
            self.position += 1;
        }
        Ok(record)
    }
}

#[async_trait]
impl RecordConsumer for MemoryCluster {
    async fn open_cursor(&self, topic: &str, _group: &str) -> Result<Box<dyn RecordCursor>> {
        let inner = self.inner.read().await;
        check_reachable(&inner)?;
        let records = inner
            .topics
            .get(topic)
            .map(|s| {
                s.records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| ConsumedRecord {
                        key: r.key.clone(),
                        value: r.value.clone(),
                        offset: i as i64,
                    })
                    .collect()
            })
            .unwrap_or_default();
        drop(inner);
        Ok(Box::new(MemoryCursor {
            records,
            position: 0,
        }))
    }
}
