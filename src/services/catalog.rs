use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::domain::{Product, Promotions};
use crate::store::{paths, StoreClient, StoreResult};

/// Storefront reads. All of these are open to any client; the promotions
/// singleton in particular is readable without a session.
#[derive(Clone)]
pub struct CatalogService {
    store: StoreClient,
}

impl CatalogService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn products(&self) -> StoreResult<BTreeMap<String, Product>> {
        let mut products: BTreeMap<String, Product> = self
            .store
            .get_as(paths::products())
            .await?
            .unwrap_or_default();
        for (id, product) in &mut products {
            product.id = id.clone();
        }
        debug!(count = products.len(), "Catalog loaded");
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn product(&self, id: &str) -> StoreResult<Option<Product>> {
        let product = self.store.get_as::<Product>(paths::product(id)).await?;
        Ok(product.map(|mut p| {
            p.id = id.to_string();
            p
        }))
    }

    #[instrument(skip(self))]
    pub async fn promotions(&self) -> StoreResult<Promotions> {
        Ok(self
            .store
            .get_as(paths::promotions())
            .await?
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn branches(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .store
            .get_as(paths::branches())
            .await?
            .unwrap_or_default())
    }
}
