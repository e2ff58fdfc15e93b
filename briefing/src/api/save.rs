use warp::{Rejection, Reply};

use super::{respond, AppState};
use crate::agents::SAVE_TOOL;
use crate::models::{SaveRequest, SaveResponse};

pub async fn handle_save(
    request: SaveRequest,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    state.metrics.record_request(SAVE_TOOL);

    let filename = request.filename.unwrap_or_default();
    let content = request.content.unwrap_or_default();
    let result = state
        .action
        .save_markdown(&filename, &content)
        .await
        .map(|path| SaveResponse {
            path: path.display().to_string(),
        });

    respond(&state, SAVE_TOOL, result)
}
