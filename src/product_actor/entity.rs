use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate};

/// Default storage backend label when registration does not name one.
const DEFAULT_STORAGE_PROVIDER: &str = "s3";

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Filter = ();

    fn id(&self) -> &String { &self.product_id }

    /// Catalog ids are chosen by the registrant.
    fn requested_id(params: &ProductCreate) -> Option<String> {
        Some(params.product_id.trim().to_string())
    }

    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, String> {
        if id.is_empty() {
            return Err("product id is required".to_string());
        }
        if params.storage_key.trim().is_empty() {
            return Err("storage key is required".to_string());
        }
        Ok(Self {
            product_id: id,
            title: params.title,
            storage_key: params.storage_key.trim().to_string(),
            storage_provider: params
                .storage_provider
                .unwrap_or_else(|| DEFAULT_STORAGE_PROVIDER.to_string()),
            checksum: params.checksum,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Err("catalog entries are replaced by registering a new product id".to_string())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }
}
