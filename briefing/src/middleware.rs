use crate::error::ApiError;
use std::sync::Arc;
use warp::{Filter, Rejection};

pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec![
            "User-Agent",
            "Sec-Fetch-Mode",
            "Referer",
            "Origin",
            "Access-Control-Request-Method",
            "Access-Control-Request-Headers",
            "Content-Type",
            "Authorization",
            "Accept",
            "Content-Length",
        ])
        .allow_methods(vec!["POST", "GET", "OPTIONS"])
}

/// Requires `Authorization: Bearer <token>` matching the configured token.
pub fn bearer_auth(token: Arc<str>) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and_then(move |header: Option<String>| {
            let token = token.clone();
            async move {
                check_bearer(header.as_deref(), &token).map_err(warp::reject::custom)
            }
        })
        .untuple_one()
}

fn check_bearer(header: Option<&str>, token: &str) -> Result<(), ApiError> {
    let presented = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(ApiError::MissingAuthorization)?;

    if presented == token {
        Ok(())
    } else {
        Err(ApiError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::handle_rejection;
    use warp::http::StatusCode;

    fn guarded() -> impl Filter<Extract = (&'static str,), Error = Rejection> + Clone {
        bearer_auth(Arc::from("secret")).map(|| "ok")
    }

    #[test]
    fn header_checks() {
        assert!(check_bearer(Some("Bearer secret"), "secret").is_ok());
        assert!(matches!(check_bearer(None, "secret"), Err(ApiError::MissingAuthorization)));
        assert!(matches!(check_bearer(Some("Basic c2VjcmV0"), "secret"), Err(ApiError::MissingAuthorization)));
        assert!(matches!(check_bearer(Some("bearer secret"), "secret"), Err(ApiError::MissingAuthorization)));
        assert!(matches!(check_bearer(Some("Bearer wrong"), "secret"), Err(ApiError::InvalidToken)));
        assert!(matches!(check_bearer(Some("Bearer "), "secret"), Err(ApiError::InvalidToken)));
    }

    #[tokio::test]
    async fn filter_passes_matching_token() {
        let reply = warp::test::request()
            .header("authorization", "Bearer secret")
            .filter(&guarded())
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn filter_rejects_with_401_json() {
        let routes = guarded().recover(handle_rejection);

        let res = warp::test::request().reply(&routes).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["error"], "Missing or invalid Authorization header");

        let res = warp::test::request()
            .header("authorization", "Bearer nope")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["error"], "Invalid token");
    }
}
