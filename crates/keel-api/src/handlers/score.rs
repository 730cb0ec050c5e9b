//! Card scoring endpoint.

use axum::extract::State;
use axum::Json;

use keel_core::{defaults, CardCandidate, ScoreRequest, ScoreResponse};

use crate::error::ApiError;
use crate::AppState;

/// `POST /v1/score`
///
/// Ranks the caller's candidate cards for a spending category. An explicit
/// empty card list yields an empty `top`; an omitted list ranks every card
/// in the active rewards table.
pub async fn score_cards(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let table = state.rewards.current().await;

    let candidates: Vec<CardCandidate> = match request.cards {
        Some(names) => names.into_iter().map(CardCandidate::new).collect(),
        None => table.all_candidates(),
    };

    let mut top = table.rank(
        request.category.as_deref(),
        request.mcc.as_deref(),
        &candidates,
    );
    top.truncate(defaults::MAX_TOP);

    Ok(Json(ScoreResponse {
        top,
        used_rules_version: table.version.clone(),
    }))
}
