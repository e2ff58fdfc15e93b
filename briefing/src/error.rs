use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{reject::Reject, Rejection, Reply};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Missing or invalid Authorization header")]
    MissingAuthorization,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("{0}")]
    BackendUnavailable(String),

    #[error("{0}")]
    NotConfigured(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn missing(param: &str) -> Self {
        ApiError::Validation(format!("Missing required parameter: {}", param))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingAuthorization | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller. Unexpected failures stay opaque.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::HttpError(_)
            | ApiError::SerializationError(_)
            | ApiError::IoError(_)
            | ApiError::InternalError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl Reject for ApiError {}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if let Some(api_err) = err.find::<ApiError>() {
        let code = api_err.status();
        if code.is_server_error() {
            error!("Request failed: {}", api_err);
        } else {
            warn!("Request rejected: {}", api_err);
        }
        (code, api_err.public_message())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidHeader>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    let json = warp::reply::json(&serde_json::json!({ "error": message }));
    Ok(warp::reply::with_status(json, code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_keeps_provider_status() {
        let err = ApiError::Upstream { status: 403, message: "quota".to_string() };
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.public_message(), "quota");
    }

    #[test]
    fn invalid_upstream_status_is_bad_gateway() {
        let err = ApiError::Upstream { status: 42, message: "odd".to_string() };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_details_are_hidden() {
        let err = ApiError::InternalError("disk on fire at /var/x".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[tokio::test]
    async fn rejection_renders_json_error_body() {
        use warp::Filter;

        let failing = warp::any()
            .and_then(|| async { Err::<String, _>(warp::reject::custom(ApiError::missing("topic"))) })
            .recover(handle_rejection);

        let res = warp::test::request().reply(&failing).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(value["error"], "Missing required parameter: topic");
    }

    #[test]
    fn oversized_bodies_are_413() {
        assert_eq!(ApiError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ApiError::PayloadTooLarge.public_message(), "Payload too large");
    }

    #[tokio::test]
    async fn unexpected_failures_render_generic_500() {
        use warp::Filter;

        let failing = warp::any()
            .and_then(|| async {
                Err::<String, _>(warp::reject::custom(ApiError::InternalError("secret detail".into())))
            })
            .recover(handle_rejection);

        let res = warp::test::request().reply(&failing).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let value: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(value["error"], "Internal server error");
    }
}
