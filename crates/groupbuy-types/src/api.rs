use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{FieldConfig, OrderRow};

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user_id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUsernameRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: String,
}

// -- Forms --

#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    pub owner_id: Option<String>,
    #[serde(default)]
    pub owner_email: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: FieldConfig,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDescriptionRequest {
    pub form_id: Option<String>,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// `{form_id, owner_id}` payload shared by clear_form and delete_form.
#[derive(Debug, Deserialize)]
pub struct FormActionRequest {
    pub form_id: Option<String>,
    pub owner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewerRequest {
    pub form_id: Option<String>,
    pub owner_id: Option<String>,
    pub viewer_email: Option<String>,
}

/// Form as listed on the dashboard (no rows).
#[derive(Debug, Serialize)]
pub struct FormInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub owner_id: String,
    pub owner_email: String,
}

#[derive(Debug, Serialize)]
pub struct MyFormsResponse {
    pub owned: Vec<FormInfo>,
    pub viewable: Vec<FormInfo>,
}

/// Form as returned by the read endpoint, rows already projected for the
/// requesting role.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub owner_id: String,
    pub owner_email: String,
    pub fields: FieldConfig,
    pub rows: Vec<OrderRow>,
    pub allowed_viewers: Vec<String>,
    pub recent_buyers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GetFormResponse {
    pub success: bool,
    pub form: FormView,
    pub is_owner: bool,
    pub is_viewer: bool,
    pub summary_by_buyer: BTreeMap<String, f64>,
}

// -- Rows --

/// Raw row fields as posted by the client. Quantity, price, and shipping
/// fee stay as JSON values here: numbers, numeric strings, null, and
/// garbage are all accepted and coerced later.
#[derive(Debug, Default, Deserialize)]
pub struct RowPayload {
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_email: String,
    #[serde(default)]
    pub item_name: String,
    pub item_qty: Option<Value>,
    pub item_price: Option<Value>,
    #[serde(default)]
    pub remittance: bool,
    pub shipped: Option<String>,
    pub shipping_fee: Option<Value>,
    pub buyer_social: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddRowRequest {
    pub form_id: Option<String>,
    pub owner_id: Option<String>,
    #[serde(flatten)]
    pub row: RowPayload,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRowRequest {
    pub form_id: Option<String>,
    pub owner_id: Option<String>,
    pub index: Option<i64>,
    #[serde(flatten)]
    pub row: RowPayload,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRowRequest {
    pub form_id: Option<String>,
    pub owner_id: Option<String>,
    pub index: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RowResponse {
    pub success: bool,
    pub row: OrderRow,
}

#[derive(Debug, Serialize)]
pub struct RecentBuyersResponse {
    pub success: bool,
    pub recent_buyers: Vec<String>,
}
