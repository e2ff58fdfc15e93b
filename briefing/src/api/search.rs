use warp::{Rejection, Reply};
use tracing::info;

use super::{required, respond, AppState};
use crate::agents::retriever::DEFAULT_RESULTS;
use crate::agents::SEARCH_TOOL;
use crate::models::SearchRequest;

pub async fn handle_search(
    request: SearchRequest,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    state.metrics.record_request(SEARCH_TOOL);

    let result = match required(&request.query, "query") {
        Ok(query) => {
            let k = request.k.unwrap_or(DEFAULT_RESULTS);
            info!("search_web: {:?} (k={})", query, k);
            state.search.search(query, k).await
        }
        Err(e) => Err(e),
    };

    respond(&state, SEARCH_TOOL, result)
}
