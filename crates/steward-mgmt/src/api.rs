use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::delete,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use steward_core::TopicSteward;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicInfoResponse {
    pub topic: String,
    pub config: BTreeMap<String, String>,
    pub non_default_config: BTreeMap<String, String>,
}

#[derive(Clone)]
pub struct StewardApi {
    steward: Arc<TopicSteward>,
}

impl StewardApi {
    pub fn new(steward: Arc<TopicSteward>) -> Self {
        Self { steward }
    }

    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route(
                "/topics/:name",
                delete(delete_topic_handler).get(topic_info_handler),
            )
            .with_state(self)
    }

    pub async fn serve(self, addr: std::net::SocketAddr) -> anyhow::Result<()> {
        let router = Arc::new(self).router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Steward API listening on {}", addr);
        axum::serve(listener, router.into_make_service()).await?;
        Ok(())
    }
}

async fn delete_topic_handler(
    State(state): State<Arc<StewardApi>>,
    Path(name): Path<String>,
) -> (StatusCode, Json<DeleteResponse>) {
    match state.steward.delete_topic(&name, false).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(DeleteResponse {
                success: outcome.allowed,
                message: outcome.message,
            }),
        ),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(DeleteResponse {
                success: false,
                message: e.to_string(),
            }),
        ),
    }
}

async fn topic_info_handler(
    State(state): State<Arc<StewardApi>>,
    Path(name): Path<String>,
) -> Result<Json<TopicInfoResponse>, (StatusCode, String)> {
    let snapshot = state
        .steward
        .inspector()
        .snapshot_topic(&name)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;

    if !snapshot.exists() {
        return Err((StatusCode::NOT_FOUND, format!("topic {name} does not exist")));
    }

    Ok(Json(TopicInfoResponse {
        topic: name,
        config: snapshot.config.full,
        non_default_config: snapshot.config.non_default,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_core::{MemoryCluster, StewardConfig};

    fn api(cluster: &MemoryCluster) -> Arc<StewardApi> {
        let config = StewardConfig {
            poll_interval_ms: 1,
            ..StewardConfig::default()
        };
        let steward = Arc::new(TopicSteward::new(Arc::new(cluster.clone()), config));
        Arc::new(StewardApi::new(steward))
    }

    #[tokio::test]
    async fn test_delete_endpoint_reports_outcome() {
        let cluster = MemoryCluster::with_brokers(1);
        cluster.add_topic("orders", 1).await;

        let (status, Json(body)) =
            delete_topic_handler(State(api(&cluster)), Path(String::from("orders"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert!(body.message.contains("has been deleted"));
        assert!(!cluster.topic_exists("orders").await);
    }

    #[tokio::test]
    async fn test_delete_endpoint_surfaces_gate_denial() {
        let cluster = MemoryCluster::with_brokers(1);
        cluster.add_topic("orders", 1).await;
        cluster.subscribe_group("orders", "billing").await;

        let (status, Json(body)) =
            delete_topic_handler(State(api(&cluster)), Path(String::from("orders"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.success);
        assert!(body.message.contains("consumer group"));
    }

    #[tokio::test]
    async fn test_delete_endpoint_maps_capability_failure() {
        let cluster = MemoryCluster::with_brokers(1);
        cluster.set_unreachable(true).await;

        let (status, Json(body)) =
            delete_topic_handler(State(api(&cluster)), Path(String::from("orders"))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_info_endpoint_returns_config_split() {
        let cluster = MemoryCluster::with_brokers(1);
        cluster.add_topic("orders", 1).await;
        cluster
            .set_topic_config("orders", "compression.type", "snappy", false)
            .await;
        cluster
            .set_topic_config("orders", "cleanup.policy", "delete", true)
            .await;

        let Json(body) = topic_info_handler(State(api(&cluster)), Path(String::from("orders")))
            .await
            .unwrap();
        assert_eq!(body.config.len(), 2);
        assert_eq!(
            body.non_default_config.get("compression.type").map(String::as_str),
            Some("snappy")
        );
        assert!(!body.non_default_config.contains_key("cleanup.policy"));
    }

    #[tokio::test]
    async fn test_info_endpoint_404_for_absent_topic() {
        let cluster = MemoryCluster::with_brokers(1);
        let err = topic_info_handler(State(api(&cluster)), Path(String::from("ghost")))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
