//! Kafka Steward core.
//!
//! Guarded lifecycle operations on topics of a distributed log cluster:
//! a multi-check precondition evaluator gating topic deletion, delete and
//! delete-then-recreate orchestration that preserves operator-overridden
//! configuration, and an idempotent migration ledger stored in the cluster
//! itself.
//!
//! The broker client is an external collaborator behind the capability
//! traits in [`admin`]; [`memory`] ships an in-process implementation used
//! by tests and the development backend.

pub mod admin;
pub mod config;
pub mod error;
pub mod gates;
pub mod inspect;
pub mod ledger;
pub mod memory;
pub mod safe_delete;

pub use admin::{
    BrokerId, ClusterAdmin, ClusterMetadata, ConfigEntry, ConfigResource, ConsumedRecord,
    NewTopic, PartitionInfo, RecordConsumer, RecordCursor, RecordProducer,
};
pub use config::StewardConfig;
pub use error::{Result, StewardError};
pub use gates::{evaluate_delete, GateInputs, PreconditionResult};
pub use inspect::{
    BrokerConfigState, BrokerConfigs, ClusterInspector, ClusterSnapshot, TopicConfig,
    TopicPartitionState, TopicSnapshot,
};
pub use ledger::{MigrationLedger, MigrationRecord};
pub use memory::MemoryCluster;
pub use safe_delete::{BatchOutcome, DeleteOutcome, TopicOutcome, TopicSteward};
