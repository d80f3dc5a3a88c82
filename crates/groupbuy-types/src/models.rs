use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field names every form must carry, enabled, no matter what the creator
/// sent. Anything else in the field configuration (e.g.
/// `shipping_fee_included`) passes through untouched.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "buyer_name",
    "buyer_email",
    "item_name",
    "item_qty",
    "item_price",
    "item_total",
];

/// Canonical key controlling whether a row's shipping fee is folded into
/// its total at write time.
pub const SHIPPING_FEE_INCLUDED: &str = "shipping_fee_included";

/// Per-form field configuration: a map of field name to enabled flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldConfig(pub BTreeMap<String, bool>);

impl FieldConfig {
    /// Force the mandatory fields on. Called once at form creation;
    /// caller-supplied flags for other fields survive as given.
    pub fn enforce_required(mut self) -> Self {
        for name in REQUIRED_FIELDS {
            self.0.insert(name.to_string(), true);
        }
        self
    }

    pub fn shipping_fee_included(&self) -> bool {
        self.0.get(SHIPPING_FEE_INCLUDED).copied().unwrap_or(false)
    }
}

/// One order line inside a form's row sequence. The id is server-assigned
/// and stable across updates; position in the sequence is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub item_name: String,
    pub item_qty: f64,
    pub item_price: f64,
    pub item_total: f64,
    pub remittance: bool,
    pub shipped: Option<String>,
    pub shipping_fee: f64,
    /// Redacted from viewer projections; absent from JSON when None.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_social: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_forced_on() {
        let mut input = BTreeMap::new();
        input.insert("item_total".to_string(), false);
        input.insert("buyer_name".to_string(), false);
        input.insert("shipping_fee_included".to_string(), true);

        let cfg = FieldConfig(input).enforce_required();
        for name in REQUIRED_FIELDS {
            assert_eq!(cfg.0.get(name), Some(&true), "{name} must be enabled");
        }
        assert!(cfg.shipping_fee_included());
    }

    #[test]
    fn shipping_flag_defaults_off() {
        let cfg = FieldConfig::default().enforce_required();
        assert!(!cfg.shipping_fee_included());
    }

    #[test]
    fn buyer_social_absent_when_redacted() {
        let row = OrderRow {
            id: "r1".into(),
            buyer_name: "a".into(),
            buyer_email: "a@x.com".into(),
            item_name: "tea".into(),
            item_qty: 1.0,
            item_price: 2.0,
            item_total: 2.0,
            remittance: false,
            shipped: None,
            shipping_fee: 0.0,
            buyer_social: None,
        };
        let v = serde_json::to_value(&row).unwrap();
        assert!(v.get("buyer_social").is_none());
    }
}
