//! Delete preconditions.
//!
//! Pure functions over inspector snapshots; nothing here touches the
//! network. Gates run in a fixed order, cheapest and most decisive first,
//! and short-circuit on the first denial so the same snapshot always yields
//! the same reason string:
//!
//! 1. existence (absent topic is a vacuous allow)
//! 2. auto-create guard
//! 3. consumer-group guard
//! 4. partition-availability guard
//! 5. broker-capability guard

use serde::{Deserialize, Serialize};

use crate::inspect::{BrokerConfigState, BrokerConfigs, TopicSnapshot};

const AUTO_CREATE_KEY: &str = "auto.create.topics.enable";
const DELETE_ENABLE_KEY: &str = "delete.topic.enable";

/// Verdict of the precondition gates: terminal, never mutated after
/// construction. A denial is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreconditionResult {
    pub allowed: bool,
    pub reason: String,
}

impl PreconditionResult {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Everything the gates need, gathered up front by the inspector.
pub struct GateInputs<'a> {
    pub topic: &'a str,
    pub topic_snapshot: &'a TopicSnapshot,
    pub broker_configs: &'a BrokerConfigs,
    pub consumer_groups: &'a [String],
}

pub fn evaluate_delete(inputs: &GateInputs<'_>) -> PreconditionResult {
    if !inputs.topic_snapshot.exists() {
        return PreconditionResult::allow(format!("Topic {} does not exist.", inputs.topic));
    }

    let auto_create_brokers = brokers_with_auto_create(inputs.broker_configs);
    if !auto_create_brokers.is_empty() {
        return PreconditionResult::deny(format!(
            "auto.create.topics.enable is true on broker(s) {}: querying the deleted topic \
             would re-create it.",
            auto_create_brokers
        ));
    }

    if !inputs.consumer_groups.is_empty() {
        return PreconditionResult::deny(format!(
            "there are {} consumer group(s) on topic {}: {}.",
            inputs.consumer_groups.len(),
            inputs.topic,
            inputs.consumer_groups.join(", ")
        ));
    }

    let offline = offline_partitions(inputs.topic_snapshot);
    if !offline.is_empty() {
        return PreconditionResult::deny(format!(
            "not all partitions are online for topic {}: {} are offline.",
            inputs.topic, offline
        ));
    }

    let unconfirmed = brokers_without_delete_enabled(inputs.broker_configs);
    if !unconfirmed.is_empty() {
        return PreconditionResult::deny(format!(
            "broker(s) {} do(es) not have confirmed `delete.topic.enable=true`.",
            unconfirmed
        ));
    }

    PreconditionResult::allow(format!("Topic {} may be deleted.", inputs.topic))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Brokers that confirmably report auto-create enabled. An unavailable
/// broker config cannot prove the flag is set, so it does not trip this
/// gate; the capability guard below still fails closed on it.
fn brokers_with_auto_create(configs: &BrokerConfigs) -> String {
    let ids: Vec<String> = configs
        .iter()
        .filter(|(_, state)| state.get(AUTO_CREATE_KEY).is_some_and(parse_flag))
        .map(|(id, _)| id.to_string())
        .collect();
    ids.join(", ")
}

fn offline_partitions(snapshot: &TopicSnapshot) -> String {
    let ids: Vec<String> = snapshot
        .partitions
        .iter()
        .filter(|p| !p.online)
        .map(|p| p.id.to_string())
        .collect();
    ids.join(", ")
}

/// Brokers that cannot be confirmed to allow topic deletion. A broker whose
/// describe failed counts here: we block the delete rather than assume the
/// flag is set.
fn brokers_without_delete_enabled(configs: &BrokerConfigs) -> String {
    let ids: Vec<String> = configs
        .iter()
        .filter(|(_, state)| match state {
            BrokerConfigState::Described(_) => !state.get(DELETE_ENABLE_KEY).is_some_and(parse_flag),
            BrokerConfigState::Unavailable(_) => true,
        })
        .map(|(id, _)| id.to_string())
        .collect();
    ids.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::{TopicConfig, TopicPartitionState};
    use std::collections::BTreeMap;

    fn healthy_topic(partitions: i32) -> TopicSnapshot {
        TopicSnapshot {
            config: TopicConfig::default(),
            partitions: (0..partitions)
                .map(|id| TopicPartitionState {
                    id,
                    online: true,
                    in_sync_replicas: 1,
                })
                .collect(),
        }
    }

    fn described(pairs: &[(&str, &str)]) -> BrokerConfigState {
        BrokerConfigState::Described(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn safe_broker() -> BrokerConfigState {
        described(&[
            ("delete.topic.enable", "true"),
            ("auto.create.topics.enable", "false"),
        ])
    }

    fn inputs<'a>(
        topic: &'a str,
        topic_snapshot: &'a TopicSnapshot,
        broker_configs: &'a BrokerConfigs,
        consumer_groups: &'a [String],
    ) -> GateInputs<'a> {
        GateInputs {
            topic,
            topic_snapshot,
            broker_configs,
            consumer_groups,
        }
    }

    #[test]
    fn test_absent_topic_is_vacuous_allow() {
        let topic = TopicSnapshot::default();
        let brokers: BrokerConfigs = [(0, safe_broker())].into_iter().collect();
        let result = evaluate_delete(&inputs("ghost", &topic, &brokers, &[]));
        assert!(result.allowed);
        assert!(result.reason.contains("does not exist"));
    }

    #[test]
    fn test_auto_create_guard_denies() {
        let topic = healthy_topic(2);
        let brokers: BrokerConfigs = [
            (0, safe_broker()),
            (
                1,
                described(&[
                    ("delete.topic.enable", "true"),
                    ("auto.create.topics.enable", "true"),
                ]),
            ),
        ]
        .into_iter()
        .collect();
        let result = evaluate_delete(&inputs("orders", &topic, &brokers, &[]));
        assert!(!result.allowed);
        assert!(result.reason.contains("auto.create.topics.enable"));
        assert!(result.reason.contains('1'));
    }

    #[test]
    fn test_auto_create_guard_dominates_other_gates() {
        // Offline partitions and missing delete.topic.enable as well, but
        // the auto-create denial must win because it runs first.
        let mut topic = healthy_topic(2);
        topic.partitions[0].online = false;
        let brokers: BrokerConfigs = [(
            0,
            described(&[("auto.create.topics.enable", "true")]),
        )]
        .into_iter()
        .collect();
        let groups = vec![String::from("readers")];
        let result = evaluate_delete(&inputs("orders", &topic, &brokers, &groups));
        assert!(!result.allowed);
        assert!(result.reason.contains("auto.create.topics.enable"));
    }

    #[test]
    fn test_consumer_group_guard() {
        let topic = healthy_topic(1);
        let brokers: BrokerConfigs = [(0, safe_broker())].into_iter().collect();
        let groups = vec![String::from("billing"), String::from("audit")];
        let result = evaluate_delete(&inputs("orders", &topic, &brokers, &groups));
        assert!(!result.allowed);
        assert!(result.reason.contains("2 consumer group(s)"));
        assert!(result.reason.contains("billing, audit"));
    }

    #[test]
    fn test_offline_partition_guard_lists_ids() {
        let mut topic = healthy_topic(3);
        topic.partitions[0].online = false;
        topic.partitions[2].online = false;
        let brokers: BrokerConfigs = [(0, safe_broker())].into_iter().collect();
        let result = evaluate_delete(&inputs("orders", &topic, &brokers, &[]));
        assert!(!result.allowed);
        assert!(result.reason.contains("0, 2"));
    }

    #[test]
    fn test_capability_guard_lists_brokers() {
        let topic = healthy_topic(1);
        let brokers: BrokerConfigs = [
            (0, safe_broker()),
            (1, described(&[("delete.topic.enable", "false")])),
            (2, described(&[])),
        ]
        .into_iter()
        .collect();
        let result = evaluate_delete(&inputs("orders", &topic, &brokers, &[]));
        assert!(!result.allowed);
        assert!(result.reason.contains("1, 2"));
    }

    #[test]
    fn test_unavailable_broker_config_fails_closed() {
        let topic = healthy_topic(1);
        let brokers: BrokerConfigs = [
            (0, safe_broker()),
            (1, BrokerConfigState::Unavailable(String::from("timed out"))),
        ]
        .into_iter()
        .collect();
        let result = evaluate_delete(&inputs("orders", &topic, &brokers, &[]));
        assert!(!result.allowed);
        assert!(result.reason.contains("delete.topic.enable"));
        assert!(result.reason.contains('1'));
    }

    #[test]
    fn test_all_gates_pass() {
        let topic = healthy_topic(3);
        let brokers: BrokerConfigs = [(0, safe_broker()), (1, safe_broker())]
            .into_iter()
            .collect();
        let result = evaluate_delete(&inputs("orders", &topic, &brokers, &[]));
        assert!(result.allowed);
    }

    #[test]
    fn test_same_snapshot_same_reason() {
        let topic = healthy_topic(1);
        let brokers: BrokerConfigs = [
            (0, described(&[])),
            (1, described(&[])),
        ]
        .into_iter()
        .collect();
        let first = evaluate_delete(&inputs("orders", &topic, &brokers, &[]));
        let second = evaluate_delete(&inputs("orders", &topic, &brokers, &[]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_flag_parsing_variants() {
        assert!(parse_flag("true"));
        assert!(parse_flag("True"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
