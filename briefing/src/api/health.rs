use warp::{Rejection, Reply};
use chrono::Utc;

use super::AppState;
use crate::error::ApiError;
use crate::models::HealthResponse;

pub fn handle_health() -> warp::reply::Json {
    warp::reply::json(&HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

pub async fn handle_metrics(state: AppState) -> Result<impl Reply, Rejection> {
    let (buffer, content_type) = state
        .metrics
        .render()
        .map_err(|e| warp::reject::custom(ApiError::InternalError(e.to_string())))?;

    Ok(warp::reply::with_header(buffer, "Content-Type", content_type))
}
