use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use groupbuy_core::access::{self, Requester};
use groupbuy_core::{project, summary};
use groupbuy_db::models::{FormDoc, FormListing};
use groupbuy_types::api::{
    CreateFormRequest, FormActionRequest, FormInfo, FormView, GetFormResponse, MyFormsResponse,
    RecentBuyersResponse, UpdateDescriptionRequest,
};

use crate::AppState;
use crate::error::{ApiError, required};

/// Load a form and gate on ownership. Mutations that don't touch the row
/// sequence go through here; row mutations do the same check inside the
/// store's read-modify-write closure instead.
fn owned_form(state: &AppState, form_id: &str, owner_id: &str) -> Result<FormDoc, ApiError> {
    let form = state.db.get_form(form_id)?.ok_or(ApiError::NotFound("form"))?;
    let role = access::classify(
        &form.owner_id,
        &form.allowed_viewers,
        Requester { user_id: owner_id, email: "" },
    );
    access::require_owner(role)?;
    Ok(form)
}

pub async fn create_form(
    State(state): State<AppState>,
    Json(req): Json<CreateFormRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = required(req.owner_id, "owner_id")?;
    if state.db.get_user_by_id(&owner_id)?.is_none() {
        return Err(ApiError::NotFound("user"));
    }

    let fields = req.fields.enforce_required();
    let form_id = Uuid::new_v4().to_string();
    state.db.create_form(
        &form_id,
        &owner_id,
        &req.owner_email,
        &req.title,
        &req.description,
        &fields,
    )?;

    Ok(Json(json!({ "success": true, "form_id": form_id })))
}

pub async fn update_description(
    State(state): State<AppState>,
    Json(req): Json<UpdateDescriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form_id = required(req.form_id, "form_id")?;
    let owner_id = required(req.owner_id, "owner_id")?;

    owned_form(&state, &form_id, &owner_id)?;
    state.db.update_description(&form_id, &req.description)?;

    Ok(Json(json!({ "success": true })))
}

fn info(listing: FormListing) -> FormInfo {
    FormInfo {
        id: listing.id,
        title: listing.title,
        description: listing.description,
        owner_id: listing.owner_id,
        owner_email: listing.owner_email,
    }
}

pub async fn my_forms(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // An unknown user sees empty dashboards, not an error.
    let Some(user) = state.db.get_user_by_id(&user_id)? else {
        return Ok(Json(MyFormsResponse { owned: vec![], viewable: vec![] }));
    };

    let owned = state.db.forms_owned_by(&user.id)?.into_iter().map(info).collect();
    let viewable = state.db.forms_viewable_by(&user.email)?.into_iter().map(info).collect();

    Ok(Json(MyFormsResponse { owned, viewable }))
}

pub async fn get_form(
    State(state): State<AppState>,
    Path((form_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let form = state.db.get_form(&form_id)?.ok_or(ApiError::NotFound("form"))?;
    let user = state.db.get_user_by_id(&user_id)?.ok_or(ApiError::NotFound("user"))?;

    let role = access::classify(
        &form.owner_id,
        &form.allowed_viewers,
        Requester { user_id: &user.id, email: &user.email },
    );
    access::require_reader(role)?;

    // The summary covers exactly the rows this requester may see, so a
    // viewer never learns other buyers' totals.
    let rows = project::visible_rows(&form.rows, role, &user.email);
    let summary_by_buyer = summary::summary_by_buyer(&rows);

    Ok(Json(GetFormResponse {
        success: true,
        form: FormView {
            id: form.id,
            title: form.title,
            description: form.description,
            owner_id: form.owner_id,
            owner_email: form.owner_email,
            fields: form.fields,
            rows,
            allowed_viewers: form.allowed_viewers,
            recent_buyers: form.recent_buyers,
        },
        is_owner: role.is_owner(),
        is_viewer: role.is_viewer(),
        summary_by_buyer,
    }))
}

pub async fn clear_form(
    State(state): State<AppState>,
    Json(req): Json<FormActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form_id = required(req.form_id, "form_id")?;
    let owner_id = required(req.owner_id, "owner_id")?;

    let outcome = state.db.mutate_form_rows(&form_id, |form, rows| {
        let role = access::classify(
            &form.owner_id,
            &form.allowed_viewers,
            Requester { user_id: &owner_id, email: "" },
        );
        access::require_owner(role).map_err(ApiError::from)?;
        rows.clear();
        Ok(((), None))
    })?;

    match outcome {
        None => Err(ApiError::NotFound("form")),
        Some(Err(e)) => Err(e),
        Some(Ok(())) => Ok(Json(json!({ "success": true }))),
    }
}

pub async fn recent_buyers(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Unknown form answers success=false with an empty set, still 200.
    let (success, recent_buyers) = match state.db.recent_buyers(&form_id)? {
        Some(emails) => (true, emails),
        None => (false, vec![]),
    };
    Ok(Json(RecentBuyersResponse { success, recent_buyers }))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Json(req): Json<FormActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form_id = required(req.form_id, "form_id")?;
    let owner_id = required(req.owner_id, "owner_id")?;

    owned_form(&state, &form_id, &owner_id)?;
    state.db.delete_form(&form_id)?;

    Ok(Json(json!({ "success": true })))
}
