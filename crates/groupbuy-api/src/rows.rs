use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use groupbuy_core::access::{self, Requester};
use groupbuy_core::compute;
use groupbuy_types::api::{AddRowRequest, DeleteRowRequest, RowResponse, UpdateRowRequest};
use groupbuy_types::models::OrderRow;

use crate::AppState;
use crate::error::{ApiError, required};

fn unwrap_outcome<T>(outcome: Option<Result<T, ApiError>>) -> Result<T, ApiError> {
    match outcome {
        None => Err(ApiError::NotFound("form")),
        Some(Err(e)) => Err(e),
        Some(Ok(v)) => Ok(v),
    }
}

fn require_owner_of(form: &groupbuy_db::models::FormDoc, owner_id: &str) -> Result<(), ApiError> {
    let role = access::classify(
        &form.owner_id,
        &form.allowed_viewers,
        Requester { user_id: owner_id, email: "" },
    );
    access::require_owner(role).map_err(ApiError::from)
}

/// Recorded into the recent-buyers set in the same store step as the row
/// write; rows without a buyer email record nothing.
fn buyer_of(row: &OrderRow) -> Option<String> {
    (!row.buyer_email.is_empty()).then(|| row.buyer_email.clone())
}

pub async fn add_row(
    State(state): State<AppState>,
    Json(req): Json<AddRowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form_id = required(req.form_id, "form_id")?;
    let owner_id = required(req.owner_id, "owner_id")?;

    let outcome = state.db.mutate_form_rows(&form_id, |form, rows| {
        require_owner_of(form, &owner_id)?;
        // The shipping flag is read from the form as stored right now;
        // flipping it later never rewrites existing totals.
        let row = compute::finalize_row(&req.row, &form.fields, None);
        rows.push(row.clone());
        let buyer = buyer_of(&row);
        Ok((row, buyer))
    })?;

    let row = unwrap_outcome(outcome)?;
    Ok(Json(RowResponse { success: true, row }))
}

pub async fn update_row(
    State(state): State<AppState>,
    Json(req): Json<UpdateRowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form_id = required(req.form_id, "form_id")?;
    let owner_id = required(req.owner_id, "owner_id")?;
    let index = required(req.index, "index")?;

    let outcome = state.db.mutate_form_rows(&form_id, |form, rows| {
        require_owner_of(form, &owner_id)?;
        let row = compute::replace_row(rows, index, &req.row, &form.fields)
            .map_err(ApiError::from)?;
        let buyer = buyer_of(&row);
        Ok((row, buyer))
    })?;

    let row = unwrap_outcome(outcome)?;
    Ok(Json(RowResponse { success: true, row }))
}

pub async fn delete_row(
    State(state): State<AppState>,
    Json(req): Json<DeleteRowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form_id = required(req.form_id, "form_id")?;
    let owner_id = required(req.owner_id, "owner_id")?;
    let index = required(req.index, "index")?;

    let outcome = state.db.mutate_form_rows(&form_id, |form, rows| {
        require_owner_of(form, &owner_id)?;
        compute::remove_row(rows, index).map_err(ApiError::from)?;
        Ok(((), None))
    })?;

    unwrap_outcome(outcome)?;
    Ok(Json(json!({ "success": true })))
}
