//! Health check endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serenity::prelude::TypeMapKey;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use threadit_core::{RelayStats, StatsSnapshot};
use tokio::sync::RwLock;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub bot_username: Option<String>,
    pub uptime_secs: u64,
    pub guild_count: usize,
    pub stats: StatsSnapshot,
}

/// Shared application state for health checks
#[derive(Clone)]
pub struct AppState {
    pub start_time: SystemTime,
    pub bot_username: Arc<RwLock<Option<String>>>,
    pub guild_count: Arc<AtomicUsize>,
    pub stats: Arc<RelayStats>,
}

impl AppState {
    pub fn new(stats: Arc<RelayStats>) -> Self {
        Self {
            start_time: SystemTime::now(),
            bot_username: Arc::new(RwLock::new(None)),
            guild_count: Arc::new(AtomicUsize::new(0)),
            stats,
        }
    }

    pub async fn set_bot_username(&self, username: String) {
        let mut guard = self.bot_username.write().await;
        *guard = Some(username);
    }

    pub fn set_guild_count(&self, count: usize) {
        self.guild_count.store(count, Ordering::Relaxed);
    }

    pub async fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            bot_username: self.bot_username.read().await.clone(),
            uptime_secs: self.start_time.elapsed().unwrap_or_default().as_secs(),
            guild_count: self.guild_count.load(Ordering::Relaxed),
            stats: self.stats.snapshot(),
        }
    }
}

impl TypeMapKey for AppState {
    type Value = AppState;
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    (StatusCode::OK, Json(state.status().await))
}

async fn live_handler() -> StatusCode {
    StatusCode::OK
}

/// Create the health check router
pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/live", get(live_handler))
        .with_state(state)
}

/// Start the health check server
pub async fn start_health_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_health_router(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Health check server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_state_new() {
        let state = AppState::new(Arc::new(RelayStats::default()));
        assert!(state.bot_username.read().await.is_none());
        assert_eq!(state.guild_count.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_set_bot_username() {
        let state = AppState::new(Arc::new(RelayStats::default()));
        state.set_bot_username("Thread It".to_string()).await;
        assert_eq!(*state.bot_username.read().await, Some("Thread It".to_string()));
    }

    #[tokio::test]
    async fn test_status_reports_guilds_and_relay_counters() {
        let stats = Arc::new(RelayStats::default());
        let state = AppState::new(stats.clone());
        state.set_guild_count(3);
        stats.record_relocated();
        stats.record_relocated();
        stats.record_aborted();

        let status = state.status().await;

        assert_eq!(status.status, "ok");
        assert_eq!(status.guild_count, 3);
        assert_eq!(status.stats.relocated, 2);
        assert_eq!(status.stats.aborted, 1);
        assert_eq!(status.stats.failed, 0);
    }

    #[tokio::test]
    async fn test_health_server_serves_live_and_health() {
        let state = AppState::new(Arc::new(RelayStats::default()));
        state.set_bot_username("threadit".to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_health_router(state)).await.unwrap();
        });

        let client = reqwest::Client::new();
        let live = client.get(format!("http://{}/live", addr)).send().await.unwrap();
        assert_eq!(live.status().as_u16(), 200);

        let health: HealthStatus = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health.bot_username.as_deref(), Some("threadit"));
        assert_eq!(health.stats, StatsSnapshot::default());
    }

    #[test]
    fn test_health_status_serde() {
        let status = HealthStatus {
            status: "ok".to_string(),
            bot_username: Some("testbot".to_string()),
            uptime_secs: 100,
            guild_count: 2,
            stats: StatsSnapshot::default(),
        };
        let json = serde_json::to_string(&status).unwrap();
        let back: HealthStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, "ok");
        assert_eq!(back.uptime_secs, 100);
        assert_eq!(back.guild_count, 2);
        assert_eq!(back.bot_username, Some("testbot".to_string()));
    }
}
