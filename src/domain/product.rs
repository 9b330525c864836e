use serde::{Deserialize, Serialize};

/// A catalog entry: what a product is and where its bytes live.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub title: String,
    pub storage_key: String,
    pub storage_provider: String,
    pub checksum: Option<String>,
}

/// Params for registering a product in the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub product_id: String,
    pub title: String,
    pub storage_key: String,
    #[serde(default)]
    pub storage_provider: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Catalog product id for a purchased item, e.g. `dataset-007`.
pub fn catalog_product_id(item_type: &str, item_id: &str) -> String {
    format!("{}-{:0>3}", item_type.trim(), item_id.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_ids_are_zero_padded() {
        assert_eq!(catalog_product_id("dataset", "7"), "dataset-007");
        assert_eq!(catalog_product_id("model", "1234"), "model-1234");
    }
}
