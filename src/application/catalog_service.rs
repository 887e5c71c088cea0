use std::sync::Arc;

use uuid::Uuid;

use crate::domain::access::{require_admin, Requester};
use crate::domain::errors::DomainError;
use crate::domain::ports::{ImageStore, Store};
use crate::domain::product::{ImageUpload, NewProduct, Product, ProductFilter, ProductUpdate};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
    images: Arc<dyn ImageStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>, images: Arc<dyn ImageStore>) -> Self {
        Self { store, images }
    }

    pub fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        self.store.unit_of_work(|uow| uow.list_products(filter))
    }

    pub fn get_product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.store
            .unit_of_work(|uow| uow.find_product(id))?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn create_product(
        &self,
        requester: &Requester,
        product: NewProduct,
    ) -> Result<Product, DomainError> {
        require_admin(requester)?;
        product.validate()?;
        let product = self.store.unit_of_work(|uow| uow.insert_product(product))?;
        log::info!("Product {} created", product.id);
        Ok(product)
    }

    /// Writes back the whole row, so the read locks it against concurrent
    /// stock reservations.
    pub fn update_product(
        &self,
        requester: &Requester,
        id: Uuid,
        update: ProductUpdate,
    ) -> Result<Product, DomainError> {
        require_admin(requester)?;
        self.store.unit_of_work(|uow| {
            let mut product = uow
                .find_product_for_update(id)?
                .ok_or(DomainError::NotFound("Product"))?;
            product.apply(update)?;
            uow.save_product(&product)?;
            Ok(product)
        })
    }

    /// Stores the new image, points the product at it, then drops the old one.
    pub fn replace_image(
        &self,
        requester: &Requester,
        id: Uuid,
        upload: ImageUpload,
    ) -> Result<Product, DomainError> {
        require_admin(requester)?;
        // Fail fast before writing anything to disk.
        self.get_product(id)?;

        let url = self.images.store(&upload)?;
        let result = self.store.unit_of_work(|uow| {
            let mut product = uow
                .find_product_for_update(id)?
                .ok_or(DomainError::NotFound("Product"))?;
            let previous = product.image_url.replace(url.clone());
            product.updated_at = chrono::Utc::now();
            uow.save_product(&product)?;
            Ok((product, previous))
        });

        match result {
            Ok((product, previous)) => {
                if let Some(previous) = previous {
                    self.discard_image(&previous);
                }
                Ok(product)
            }
            Err(e) => {
                self.discard_image(&url);
                Err(e)
            }
        }
    }

    pub fn delete_product(&self, requester: &Requester, id: Uuid) -> Result<(), DomainError> {
        require_admin(requester)?;
        let image_url = self.store.unit_of_work(|uow| {
            let product = uow
                .find_product(id)?
                .ok_or(DomainError::NotFound("Product"))?;
            uow.delete_product(id)?;
            Ok(product.image_url)
        })?;
        if let Some(url) = image_url {
            self.discard_image(&url);
        }
        log::info!("Product {id} deleted");
        Ok(())
    }

    fn discard_image(&self, url: &str) {
        if let Err(e) = self.images.delete(url) {
            log::warn!("Could not delete image {url}: {e}");
        }
    }
}
