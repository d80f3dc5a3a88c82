use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use groupbuy_types::api::RowPayload;
use groupbuy_types::models::{FieldConfig, OrderRow};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("row index out of range")]
    InvalidIndex,
}

/// Coerce a client-supplied amount to a non-negative f64. Numbers and
/// numeric strings pass through; everything else (missing, null, garbage,
/// negatives, NaN/inf) becomes 0.0. Intentionally never an error.
pub fn coerce_amount(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 { n } else { 0.0 }
}

/// Build a finalized row from raw input. `item_total` is quantity times
/// price, plus shipping fee iff the form's `shipping_fee_included` flag is
/// set at this moment; the stored total never changes when the flag is
/// flipped later. A fresh id is minted unless the caller passes the id of
/// the row being replaced.
pub fn finalize_row(payload: &RowPayload, fields: &FieldConfig, existing_id: Option<String>) -> OrderRow {
    let item_qty = coerce_amount(payload.item_qty.as_ref());
    let item_price = coerce_amount(payload.item_price.as_ref());
    let shipping_fee = coerce_amount(payload.shipping_fee.as_ref());

    let mut item_total = item_qty * item_price;
    if fields.shipping_fee_included() {
        item_total += shipping_fee;
    }

    OrderRow {
        id: existing_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        buyer_name: payload.buyer_name.clone(),
        buyer_email: payload.buyer_email.clone(),
        item_name: payload.item_name.clone(),
        item_qty,
        item_price,
        item_total,
        remittance: payload.remittance,
        shipped: payload.shipped.clone(),
        shipping_fee,
        buyer_social: payload.buyer_social.clone(),
    }
}

fn check_index(index: i64, len: usize) -> Result<usize, RowError> {
    if index < 0 || index as usize >= len {
        return Err(RowError::InvalidIndex);
    }
    Ok(index as usize)
}

/// Replace the row at `index`, keeping its id. Returns the new row.
pub fn replace_row(
    rows: &mut [OrderRow],
    index: i64,
    payload: &RowPayload,
    fields: &FieldConfig,
) -> Result<OrderRow, RowError> {
    let i = check_index(index, rows.len())?;
    let row = finalize_row(payload, fields, Some(rows[i].id.clone()));
    rows[i] = row.clone();
    Ok(row)
}

/// Remove the row at `index`; later rows shift down by one.
pub fn remove_row(rows: &mut Vec<OrderRow>, index: i64) -> Result<OrderRow, RowError> {
    let i = check_index(index, rows.len())?;
    Ok(rows.remove(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(qty: Value, price: Value, fee: Value) -> RowPayload {
        RowPayload {
            buyer_name: "amy".into(),
            buyer_email: "amy@x.com".into(),
            item_name: "tea".into(),
            item_qty: Some(qty),
            item_price: Some(price),
            shipping_fee: Some(fee),
            ..RowPayload::default()
        }
    }

    fn fields(shipping_included: bool) -> FieldConfig {
        let mut cfg = FieldConfig::default();
        cfg.0.insert("shipping_fee_included".into(), shipping_included);
        cfg.enforce_required()
    }

    #[test]
    fn total_includes_shipping_when_flag_set() {
        let row = finalize_row(&payload(json!(2), json!(10), json!(5)), &fields(true), None);
        assert_eq!(row.item_total, 25.0);
    }

    #[test]
    fn total_excludes_shipping_when_flag_clear() {
        let row = finalize_row(&payload(json!(2), json!(10), json!(5)), &fields(false), None);
        assert_eq!(row.item_total, 20.0);
        assert_eq!(row.shipping_fee, 5.0);
    }

    #[test]
    fn string_and_number_amounts_coerce_identically() {
        let a = finalize_row(&payload(json!("3"), json!("1.5"), json!(0)), &fields(false), None);
        let b = finalize_row(&payload(json!(3), json!(1.5), json!(0)), &fields(false), None);
        assert_eq!(a.item_total, b.item_total);
        assert_eq!(a.item_total, 4.5);
    }

    #[test]
    fn bad_amounts_coerce_to_zero() {
        assert_eq!(coerce_amount(None), 0.0);
        assert_eq!(coerce_amount(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_amount(Some(&json!("abc"))), 0.0);
        assert_eq!(coerce_amount(Some(&json!(-2))), 0.0);
        assert_eq!(coerce_amount(Some(&json!(true))), 0.0);
    }

    #[test]
    fn new_rows_get_distinct_ids() {
        let p = payload(json!(1), json!(1), json!(0));
        let f = fields(false);
        let a = finalize_row(&p, &f, None);
        let b = finalize_row(&p, &f, None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn replace_preserves_row_id() {
        let f = fields(true);
        let mut rows = vec![
            finalize_row(&payload(json!(1), json!(1), json!(0)), &f, None),
            finalize_row(&payload(json!(2), json!(2), json!(0)), &f, None),
        ];
        let old_id = rows[1].id.clone();

        let updated = replace_row(&mut rows, 1, &payload(json!(2), json!(10), json!(5)), &f).unwrap();
        assert_eq!(updated.id, old_id);
        assert_eq!(rows[1].item_total, 25.0);
    }

    #[test]
    fn remove_shifts_later_rows() {
        let f = fields(false);
        let mut rows: Vec<OrderRow> = (0..3)
            .map(|i| finalize_row(&payload(json!(i), json!(1), json!(0)), &f, None))
            .collect();
        let survivor = rows[2].id.clone();

        remove_row(&mut rows, 1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, survivor);
    }

    #[test]
    fn out_of_range_index_rejected_and_untouched() {
        let f = fields(false);
        let mut rows = vec![finalize_row(&payload(json!(1), json!(1), json!(0)), &f, None)];
        let before = rows.clone();

        assert_eq!(remove_row(&mut rows, 1), Err(RowError::InvalidIndex));
        assert_eq!(remove_row(&mut rows, -1), Err(RowError::InvalidIndex));
        assert_eq!(
            replace_row(&mut rows, 5, &payload(json!(1), json!(1), json!(0)), &f),
            Err(RowError::InvalidIndex)
        );
        assert_eq!(rows, before);
    }
}
