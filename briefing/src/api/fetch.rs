use warp::{Rejection, Reply};

use super::{required, respond, AppState};
use crate::agents::FETCH_TOOL;
use crate::models::FetchRequest;

pub async fn handle_fetch(
    request: FetchRequest,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    state.metrics.record_request(FETCH_TOOL);

    let result = match required(&request.url, "url") {
        Ok(url) => state.reader.fetch(url).await,
        Err(e) => Err(e),
    };

    respond(&state, FETCH_TOOL, result)
}
