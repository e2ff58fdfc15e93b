use warp::{Rejection, Reply};
use uuid::Uuid;
use tracing::info;

use super::{respond, AppState};
use crate::agents::SUMMARIZE_TOOL;
use crate::models::SummarizeRequest;

pub async fn handle_summarize(
    request: SummarizeRequest,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let request_id = Uuid::new_v4();
    state.metrics.record_request(SUMMARIZE_TOOL);

    let topic = request.topic.unwrap_or_default();
    let docs = request.docs.unwrap_or_default();
    info!("Processing summary [{}]: {:?} over {} doc(s)", request_id, topic, docs.len());

    let result = state
        .summarizer
        .summarize(&topic, &docs)
        .await
        .map(|summary| {
            if summary.used_fallback {
                state.metrics.record_fallback();
            }
            info!("Summary [{}] done (fallback: {})", request_id, summary.used_fallback);
            summary.result
        });

    respond(&state, SUMMARIZE_TOOL, result)
}
