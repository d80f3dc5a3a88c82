use groupbuy_types::models::OrderRow;

use crate::access::Role;

/// Rows visible to a requester. Owners see everything as stored; viewers
/// see only rows carrying their own email, with `buyer_social` stripped.
/// Sequence order is preserved.
pub fn visible_rows(rows: &[OrderRow], role: Role, requester_email: &str) -> Vec<OrderRow> {
    match role {
        Role::Owner => rows.to_vec(),
        Role::Viewer => rows
            .iter()
            .filter(|r| r.buyer_email == requester_email)
            .map(|r| {
                let mut r = r.clone();
                r.buyer_social = None;
                r
            })
            .collect(),
        Role::None => Vec::new(),
    }
}
