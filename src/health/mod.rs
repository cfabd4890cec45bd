//! Liveness endpoint.
//!
//! `GET /health` answers from the proxy itself and never reaches an origin.

use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        message: "Proxy server is running".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_body() {
        let Json(status) = health_check().await;
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"status":"ok","message":"Proxy server is running"}"#
        );
    }
}
