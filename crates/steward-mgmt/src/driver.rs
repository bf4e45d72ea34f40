//! Migration driver: the glue between the plan document, the ledger, and
//! the recreate orchestrator. A plan whose uid is not newer than the latest
//! ledger entry is skipped before any destructive call is issued.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use steward_core::{MigrationLedger, Result, TopicOutcome, TopicSteward};

use crate::plan::MigrationPlan;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub uid: u64,
    pub success: bool,
    /// True when the plan was already applied and nothing was executed.
    pub skipped: bool,
    pub message: String,
    pub results: BTreeMap<String, TopicOutcome>,
}

pub async fn run_migration(
    plan: &MigrationPlan,
    steward: &TopicSteward,
    ledger: &MigrationLedger,
    read_timeout: Duration,
) -> Result<MigrationReport> {
    let latest = ledger.latest_applied(read_timeout).await?;

    if let Some(record) = latest {
        if plan.uid <= record.migration_id {
            tracing::info!(
                uid = plan.uid,
                latest = record.migration_id,
                "migration already applied, skipping"
            );
            return Ok(MigrationReport {
                uid: plan.uid,
                success: true,
                skipped: true,
                message: format!(
                    "Migration {} already applied (latest is {}), nothing to do.",
                    plan.uid, record.migration_id
                ),
                results: BTreeMap::new(),
            });
        }
    }

    let batch = steward.recreate_topics(&plan.topics_to_recreate).await;

    // The uid is recorded even when some topics failed: re-running the same
    // plan would re-delete topics that did recreate successfully.
    ledger.record_applied(plan.uid).await?;

    Ok(MigrationReport {
        uid: plan.uid,
        success: batch.success,
        skipped: false,
        message: if batch.success {
            format!("Migration {} applied.", plan.uid)
        } else {
            format!("Migration {} applied with failures.", plan.uid)
        },
        results: batch.results,
    })
}
