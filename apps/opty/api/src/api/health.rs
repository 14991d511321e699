//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use serde_json::Value;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// 200 when MongoDB answers a ping, 503 otherwise
async fn readiness_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "mongodb",
        Box::pin(async {
            let status = database::mongodb::check_health_detailed(&state.db).await;
            if status.healthy {
                Ok(())
            } else {
                Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
            }
        }),
    )];

    run_health_checks(checks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::Request;
    use core_config::{app_info, server::ServerConfig};
    use database::mongodb::MongoConfig;
    use domain_users::SupabaseConfig;
    use http_body_util::BodyExt;
    use mongodb::Client;
    use tower::ServiceExt;

    async fn unreachable_state() -> AppState {
        let url = "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200";
        let mongo_client = Client::with_uri_str(url).await.unwrap();
        let db = mongo_client.database("opty_test");

        AppState {
            config: Config {
                app: app_info!(),
                mongodb: MongoConfig::with_database(url, "opty_test"),
                supabase: SupabaseConfig::new("http://127.0.0.1:1", "key"),
                server: ServerConfig::default(),
                environment: Environment::Development,
            },
            mongo_client,
            db,
        }
    }

    #[tokio::test]
    async fn test_ready_is_503_without_mongodb() {
        let app = router(unreachable_state().await);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["mongodb"], "disconnected");
        assert_eq!(json["status"], "not ready");
    }
}
