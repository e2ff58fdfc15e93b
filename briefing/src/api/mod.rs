use bytes::Buf;
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use crate::agents::action::ActionAgent;
use crate::agents::reader::ReaderAgent;
use crate::agents::retriever::SearchProvider;
use crate::agents::summarizer::SummarizerAgent;
use crate::agents::{FETCH_TOOL, SAVE_TOOL, SEARCH_TOOL, SUMMARIZE_TOOL};
use crate::error::{handle_rejection, ApiError};
use crate::metrics::Metrics;
use crate::middleware::{bearer_auth, cors};

mod fetch;
mod health;
mod save;
mod search;
mod summarize;
mod tools;

/// JSON bodies larger than this are refused.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Everything a handler needs, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn SearchProvider>,
    pub reader: ReaderAgent,
    pub summarizer: SummarizerAgent,
    pub action: ActionAgent,
    pub metrics: Metrics,
}

/// The whole HTTP surface: a public health check, everything else behind the
/// bearer token.
pub fn app(
    state: AppState,
    token: Arc<str>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let health_route = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(health::handle_health);

    let metrics_route = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(bearer_auth(token.clone()))
        .and(with_state(state.clone()))
        .and_then(health::handle_metrics);

    health_route
        .or(metrics_route)
        .or(tool_routes(state, token))
        .recover(handle_rejection)
        .with(warp::log("api"))
        .with(cors())
}

pub fn tool_routes(
    state: AppState,
    token: Arc<str>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let tools = warp::path("tools").and(bearer_auth(token));

    let list_route = warp::path::end()
        .and(warp::get())
        .map(tools::handle_list_tools);

    let search_route = warp::path(SEARCH_TOOL)
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(search::handle_search);

    let fetch_route = warp::path(FETCH_TOOL)
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(fetch::handle_fetch);

    let summarize_route = warp::path(SUMMARIZE_TOOL)
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(summarize::handle_summarize);

    let save_route = warp::path(SAVE_TOOL)
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(state))
        .and_then(save::handle_save);

    tools.and(
        list_route
            .or(search_route)
            .or(fetch_route)
            .or(summarize_route)
            .or(save_route),
    )
}

fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// JSON request body, with or without a Content-Length header. A declared
/// length over the cap is refused before reading; chunked bodies are cut off
/// once they grow past it.
fn json_body<T: DeserializeOwned + Send + 'static>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(|declared: Option<u64>| async move {
            match declared {
                Some(len) if len > MAX_BODY_BYTES as u64 => {
                    Err(warp::reject::custom(ApiError::PayloadTooLarge))
                }
                _ => Ok(()),
            }
        })
        .untuple_one()
        .and(warp::body::stream())
        .and_then(|body| read_json::<T, _, _>(body, MAX_BODY_BYTES))
}

async fn read_json<T, S, B>(body: S, limit: usize) -> Result<T, Rejection>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<B, warp::Error>> + Send,
    B: Buf + Send,
{
    futures::pin_mut!(body);
    let mut raw = Vec::new();

    while let Some(mut chunk) = body.try_next().await.map_err(|e| {
        warp::reject::custom(ApiError::Validation(format!("Failed to read request body: {}", e)))
    })? {
        if raw.len() + chunk.remaining() > limit {
            return Err(warp::reject::custom(ApiError::PayloadTooLarge));
        }
        while chunk.has_remaining() {
            let part = chunk.chunk();
            let n = part.len();
            raw.extend_from_slice(part);
            chunk.advance(n);
        }
    }

    serde_json::from_slice(&raw).map_err(|e| {
        warp::reject::custom(ApiError::Validation(format!("Invalid JSON body: {}", e)))
    })
}

/// Non-empty (after trimming) value of a required request field.
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing(name))
}

/// Turns a tool outcome into a JSON reply, counting failures per tool.
fn respond<T: Serialize>(
    state: &AppState,
    tool: &str,
    result: Result<T, ApiError>,
) -> Result<warp::reply::Json, Rejection> {
    match result {
        Ok(body) => Ok(warp::reply::json(&body)),
        Err(err) => {
            state.metrics.record_error(tool);
            Err(warp::reject::custom(err))
        }
    }
}
