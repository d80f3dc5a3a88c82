use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use groupbuy_core::access::{self, Requester};
use groupbuy_types::api::ViewerRequest;

use crate::AppState;
use crate::error::{ApiError, required};

fn gate_owner(state: &AppState, form_id: &str, owner_id: &str) -> Result<(), ApiError> {
    let form = state.db.get_form(form_id)?.ok_or(ApiError::NotFound("form"))?;
    let role = access::classify(
        &form.owner_id,
        &form.allowed_viewers,
        Requester { user_id: owner_id, email: "" },
    );
    access::require_owner(role).map_err(ApiError::from)
}

/// The allow-list only ever holds emails that belonged to a registered
/// account at add time; it is not re-validated afterwards.
pub async fn add_viewer(
    State(state): State<AppState>,
    Json(req): Json<ViewerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form_id = required(req.form_id, "form_id")?;
    let owner_id = required(req.owner_id, "owner_id")?;
    let viewer_email = required(req.viewer_email, "viewer_email")?;

    gate_owner(&state, &form_id, &owner_id)?;

    if state.db.get_user_by_email(&viewer_email)?.is_none() {
        return Err(ApiError::validation("that email is not registered"));
    }

    state.db.add_viewer(&form_id, &viewer_email)?;
    Ok(Json(json!({ "success": true })))
}

pub async fn remove_viewer(
    State(state): State<AppState>,
    Json(req): Json<ViewerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form_id = required(req.form_id, "form_id")?;
    let owner_id = required(req.owner_id, "owner_id")?;
    let viewer_email = required(req.viewer_email, "viewer_email")?;

    gate_owner(&state, &form_id, &owner_id)?;

    state.db.remove_viewer(&form_id, &viewer_email)?;
    Ok(Json(json!({ "success": true })))
}
