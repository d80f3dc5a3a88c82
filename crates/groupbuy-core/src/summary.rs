use std::collections::BTreeMap;

use groupbuy_types::models::OrderRow;

/// Running total per buyer display name, seeded at zero. The grouping key
/// is the name, not the email: two buyers sharing a display name merge
/// into one entry.
pub fn summary_by_buyer(rows: &[OrderRow]) -> BTreeMap<String, f64> {
    let mut summary = BTreeMap::new();
    for row in rows {
        *summary.entry(row.buyer_name.clone()).or_insert(0.0) += row.item_total;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, email: &str, total: f64) -> OrderRow {
        OrderRow {
            id: format!("{name}-{total}"),
            buyer_name: name.into(),
            buyer_email: email.into(),
            item_name: "tea".into(),
            item_qty: 1.0,
            item_price: total,
            item_total: total,
            remittance: false,
            shipped: None,
            shipping_fee: 0.0,
            buyer_social: None,
        }
    }

    #[test]
    fn sums_per_name() {
        let rows = vec![row("amy", "a@x.com", 10.0), row("bob", "b@x.com", 5.0), row("amy", "a@x.com", 2.5)];
        let s = summary_by_buyer(&rows);
        assert_eq!(s.get("amy"), Some(&12.5));
        assert_eq!(s.get("bob"), Some(&5.0));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn duplicate_names_across_emails_merge() {
        let rows = vec![row("amy", "a@x.com", 10.0), row("amy", "other@x.com", 1.0)];
        let s = summary_by_buyer(&rows);
        assert_eq!(s.get("amy"), Some(&11.0));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn stable_under_reordering() {
        let mut rows = vec![row("amy", "a@x.com", 1.0), row("bob", "b@x.com", 2.0), row("amy", "a@x.com", 3.0)];
        let forward = summary_by_buyer(&rows);
        rows.reverse();
        assert_eq!(forward, summary_by_buyer(&rows));
    }

    #[test]
    fn empty_rows_empty_summary() {
        assert!(summary_by_buyer(&[]).is_empty());
    }
}
