//! Per-entity alias tables.
//!
//! Backends name the same field differently across record types, so every
//! lookup goes through an ordered list of candidates. New field names are a
//! data change here, not a code change elsewhere.

/// Everything the engine needs to know about one kind of entity.
#[derive(Debug, PartialEq, Eq)]
pub struct EntityProfile {
    pub kind: &'static str,
    /// Key passed to the [`ModelResolver`](crate::services::metric_api::ModelResolver).
    pub metric_name: &'static str,
    /// Used when the resolver has no answer.
    pub fallback_model_id: Option<&'static str>,

    /// Grouping dimensions, most preferred first.
    pub code_dimensions: &'static [&'static str],
    pub name_dimensions: &'static [&'static str],
    pub amount_dimensions: &'static [&'static str],

    /// Label aliases read from returned series.
    pub key_fields: &'static [&'static str],
    pub name_fields: &'static [&'static str],
    pub amount_fields: &'static [&'static str],
}

pub static SUPPLIER: EntityProfile = EntityProfile {
    kind: "supplier",
    metric_name: "supplier_purchase_amount",
    fallback_model_id: Some("supplier_purchase_amount"),
    code_dimensions: &["supplier_code", "supplier_id"],
    name_dimensions: &["supplier_name", "supplier", "vendor_name", "provider_name"],
    amount_dimensions: &["total_amount", "purchase_amount", "amount"],
    key_fields: &["supplier_code", "supplier_id", "supplier_no", "vendor_code", "code"],
    name_fields: &["supplier_name", "supplier", "vendor_name", "provider_name", "name"],
    amount_fields: &["total_amount", "purchase_amount", "amount", "order_amount"],
};

pub static CUSTOMER: EntityProfile = EntityProfile {
    kind: "customer",
    metric_name: "customer_sales_amount",
    fallback_model_id: None,
    code_dimensions: &["customer_code", "customer_id"],
    name_dimensions: &["customer_name", "customer", "client_name"],
    amount_dimensions: &["total_amount", "sales_amount", "amount"],
    key_fields: &["customer_code", "customer_id", "customer_no", "code"],
    name_fields: &["customer_name", "customer", "client_name", "name"],
    amount_fields: &["total_amount", "sales_amount", "amount", "order_amount"],
};

pub static MATERIAL: EntityProfile = EntityProfile {
    kind: "material",
    metric_name: "material_consumption_amount",
    fallback_model_id: None,
    code_dimensions: &["material_code", "material_number", "material_id"],
    name_dimensions: &["material_name", "material", "product_name"],
    amount_dimensions: &["total_amount", "consumption_amount", "amount"],
    key_fields: &["material_code", "material_number", "material_id", "number", "code"],
    name_fields: &["material_name", "material", "product_name", "name"],
    amount_fields: &["total_amount", "consumption_amount", "amount", "quantity"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_dimensions_are_key_fields() {
        for profile in [&SUPPLIER, &CUSTOMER, &MATERIAL] {
            for dim in profile.code_dimensions {
                assert!(profile.key_fields.contains(dim), "{} / {dim}", profile.kind);
            }
        }
    }
}
