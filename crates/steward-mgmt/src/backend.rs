use std::sync::Arc;

use steward_core::MemoryCluster;

use crate::config::{Backend, MgmtConfig};

/// Constructs the broker backend selected in the config.
///
/// The in-process backend is seeded with the ledger control topic: without
/// it, `apply` would run its destructive recreates and then fail to persist
/// the migration uid, so a rerun of the same plan would re-delete topics.
pub async fn build_backend(config: &MgmtConfig) -> Arc<MemoryCluster> {
    match config.backend {
        Backend::Memory => {
            let cluster = MemoryCluster::with_brokers(1);
            cluster.add_topic(&config.steward.ledger_topic, 1).await;
            Arc::new(cluster)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::run_migration;
    use crate::plan::MigrationPlan;
    use steward_core::{MigrationLedger, TopicSteward};

    fn test_config() -> MgmtConfig {
        let mut config = MgmtConfig::default();
        config.steward.poll_interval_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_backend_carries_ledger_topic() {
        let config = test_config();
        let cluster = build_backend(&config).await;
        assert!(cluster.topic_exists(&config.steward.ledger_topic).await);
    }

    #[tokio::test]
    async fn test_apply_wiring_records_uid_and_reruns_are_noops() {
        let config = test_config();
        let cluster = build_backend(&config).await;
        cluster.add_topic("orders", 2).await;

        let steward = TopicSteward::new(cluster.clone(), config.steward.clone());
        let ledger = MigrationLedger::new(cluster.clone(), cluster.clone(), &config.steward);
        let plan = MigrationPlan {
            uid: 17,
            environment: String::from("RND"),
            topics_to_recreate: vec![String::from("orders")],
        };

        let report = run_migration(
            &plan,
            &steward,
            &ledger,
            config.steward.ledger_read_timeout(),
        )
        .await
        .unwrap();
        assert!(report.success);
        assert!(!report.skipped);
        assert_eq!(cluster.create_calls().await, vec!["orders"]);

        // The uid made it into the ledger, so replaying the same plan
        // issues no further destructive calls.
        let rerun = run_migration(
            &plan,
            &steward,
            &ledger,
            config.steward.ledger_read_timeout(),
        )
        .await
        .unwrap();
        assert!(rerun.skipped);
        assert_eq!(cluster.delete_calls().await.len(), 1);
        assert_eq!(cluster.create_calls().await.len(), 1);
    }
}
