//! Presence table and summary replies.

use crate::reply::Reply;
use crate::state::AppState;
use rollcall_verify::{link_headers, render_presence_table, summarize};

const NO_DATA: &str = "No data found. Use /start first.";
const INCOMPLETE: &str =
    "Verification not complete. Send all verification links before asking for results.";

/// Reply for a job without a full matrix: no primary, or unscanned slots.
fn not_ready(state: &AppState) -> Vec<Reply> {
    if state.job.primary.is_none() {
        vec![Reply::text(NO_DATA)]
    } else {
        vec![Reply::text(INCOMPLETE)]
    }
}

/// The presence table for the current job.
pub fn list(state: &AppState) -> Vec<Reply> {
    match state.job.matrix() {
        Some(matrix) => {
            let headers = link_headers(matrix.secondary_count());
            vec![Reply::block(render_presence_table(&matrix, &headers))]
        }
        None => not_ready(state),
    }
}

/// The compliance summary for the current job; the text is kept on the job.
pub fn summary(state: &mut AppState) -> Vec<Reply> {
    let (Some(primary), Some(matrix)) = (state.job.primary.as_ref(), state.job.matrix()) else {
        return not_ready(state);
    };

    let text = summarize(primary, &matrix).to_string();
    state.job.summary_text.clone_from(&text);
    vec![Reply::block(text)]
}
