pub mod auth;
pub mod error;
pub mod forms;
pub mod mail;
pub mod rows;
pub mod token;
pub mod viewers;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use groupbuy_db::Database;
use mail::Mailer;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub token_secret: String,
    /// Base of the reset link handed to the mailer, e.g.
    /// `https://forms.example.com/reset_password`.
    pub reset_url_base: String,
    pub mailer: Box<dyn Mailer>,
}

/// The full /api surface. Callers identify themselves by the user id in
/// the payload or path; there is no session layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/forgot_password", post(auth::forgot_password))
        .route("/api/reset_password", post(auth::reset_password))
        .route("/api/update_username", post(auth::update_username))
        .route("/api/create_form", post(forms::create_form))
        .route("/api/update_form_description", post(forms::update_description))
        .route("/api/my_forms/{user_id}", get(forms::my_forms))
        .route("/api/form/{form_id}/{user_id}", get(forms::get_form))
        .route("/api/add_viewer", post(viewers::add_viewer))
        .route("/api/remove_viewer", post(viewers::remove_viewer))
        .route("/api/add_row", post(rows::add_row))
        .route("/api/update_row", post(rows::update_row))
        .route("/api/delete_row", post(rows::delete_row))
        .route("/api/clear_form", post(forms::clear_form))
        .route("/api/recent_buyers/{form_id}", get(forms::recent_buyers))
        .route("/api/delete_form", post(forms::delete_form))
        .with_state(state)
}
