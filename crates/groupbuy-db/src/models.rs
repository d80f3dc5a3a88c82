//! Database row types. Forms come back fully hydrated (`FormDoc`) because
//! every caller needs the allow-list and field config alongside the rows.

use groupbuy_types::models::{FieldConfig, OrderRow};

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

/// A form document with its relations loaded.
pub struct FormDoc {
    pub id: String,
    pub owner_id: String,
    pub owner_email: String,
    pub title: String,
    pub description: String,
    pub fields: FieldConfig,
    pub rows: Vec<OrderRow>,
    pub allowed_viewers: Vec<String>,
    pub recent_buyers: Vec<String>,
}

/// Form header as listed on the dashboard (no rows, no relations).
pub struct FormListing {
    pub id: String,
    pub owner_id: String,
    pub owner_email: String,
    pub title: String,
    pub description: String,
}
