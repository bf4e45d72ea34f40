//! Broker capability traits.
//!
//! The steward never speaks the Kafka wire protocol itself. Everything it
//! needs from the cluster goes through the traits below, which an external
//! admin/producer/consumer client implements. The in-process backend in
//! [`crate::memory`] implements the same traits for tests and development.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Broker node identifier as reported by cluster metadata.
pub type BrokerId = i32;

/// One configuration entry as described by the cluster, with enough
/// provenance to tell an operator override from a broker default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub value: String,
    pub is_default: bool,
    pub is_read_only: bool,
    pub is_sensitive: bool,
}

impl ConfigEntry {
    pub fn new(value: impl Into<String>, is_default: bool) -> Self {
        Self {
            value: value.into(),
            is_default,
            is_read_only: false,
            is_sensitive: false,
        }
    }
}

/// Target of a `describe_configs` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResource {
    Topic(String),
    Broker(BrokerId),
}

impl std::fmt::Display for ConfigResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigResource::Topic(name) => write!(f, "topic/{name}"),
            ConfigResource::Broker(id) => write!(f, "broker/{id}"),
        }
    }
}

/// Partition metadata as reported by the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionInfo {
    pub id: i32,
    /// Current leader broker, or None when the partition is offline.
    pub leader: Option<BrokerId>,
    pub replicas: Vec<BrokerId>,
    pub in_sync_replicas: Vec<BrokerId>,
}

impl PartitionInfo {
    pub fn online(id: i32, leader: BrokerId, replicas: Vec<BrokerId>) -> Self {
        Self {
            id,
            leader: Some(leader),
            in_sync_replicas: replicas.clone(),
            replicas,
        }
    }

    pub fn offline(id: i32, replicas: Vec<BrokerId>) -> Self {
        Self {
            id,
            leader: None,
            replicas,
            in_sync_replicas: Vec::new(),
        }
    }
}

/// Cluster-wide metadata returned by a list-topics call.
#[derive(Debug, Clone, Default)]
pub struct ClusterMetadata {
    pub brokers: BTreeSet<BrokerId>,
    pub topics: BTreeMap<String, Vec<PartitionInfo>>,
}

/// Request to create a topic.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTopic {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i16,
    pub config: BTreeMap<String, String>,
}

/// A record read back from a topic.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumedRecord {
    pub key: Option<String>,
    pub value: String,
    pub offset: i64,
}

/// Administrative view of the cluster.
///
/// `topic_partitions` returns an empty list for an unknown topic rather than
/// an error: absence is a normal, expected outcome for a delete-precondition
/// check.
#[async_trait]
pub trait ClusterAdmin: Send + Sync {
    async fn cluster_metadata(&self, timeout: Duration) -> Result<ClusterMetadata>;

    async fn topic_partitions(&self, topic: &str, timeout: Duration)
        -> Result<Vec<PartitionInfo>>;

    async fn describe_configs(
        &self,
        resource: ConfigResource,
    ) -> Result<BTreeMap<String, ConfigEntry>>;

    async fn create_topic(&self, topic: NewTopic) -> Result<()>;

    async fn delete_topic(&self, topic: &str) -> Result<()>;

    /// Consumer groups currently subscribed to the topic.
    async fn consumer_groups_for(&self, topic: &str) -> Result<Vec<String>>;
}

/// Append records to a topic.
#[async_trait]
pub trait RecordProducer: Send + Sync {
    async fn send(&self, topic: &str, key: &str, value: &str) -> Result<()>;
}

/// Open fresh read cursors over a topic.
#[async_trait]
pub trait RecordConsumer: Send + Sync {
    /// Opens a cursor positioned at the start of the topic.
    async fn open_cursor(&self, topic: &str, group: &str) -> Result<Box<dyn RecordCursor>>;
}

/// A read cursor over one topic.
#[async_trait]
pub trait RecordCursor: Send {
    /// Next record, or None once the cursor reaches the current end of the
    /// topic (or nothing arrives within `poll_timeout`).
    async fn next(&mut self, poll_timeout: Duration) -> Result<Option<ConsumedRecord>>;
}
