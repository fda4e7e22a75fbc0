use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    status: String,
    published_posts: i64,
}

/// Liveness plus a readiness signal: the published-post count doubles as
/// the database round trip.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service and database reachable", body = HealthStatus),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthStatus>, StatusCode> {
    let published_posts: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts WHERE published_at IS NOT NULL")
            .fetch_one(&state.db_pool)
            .await
            .map_err(|err| {
                error!(%err, "health check query failed");
                StatusCode::SERVICE_UNAVAILABLE
            })?;

    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        published_posts,
    }))
}
