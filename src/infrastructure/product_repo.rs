use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductFilter};
use crate::schema::products;

use super::models::{NewProductRow, ProductChangeset, ProductRow};
use super::store::DieselUnitOfWork;

/// Escapes LIKE metacharacters so user input only matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl ProductRepository for DieselUnitOfWork<'_> {
    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(self.conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn find_product_for_update(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .for_update()
            .get_result(self.conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn list_products(&mut self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let mut query = products::table
            .select(ProductRow::as_select())
            .into_boxed();
        if let Some(category) = &filter.category {
            query = query.filter(products::category.eq(category));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(products::featured.eq(featured));
        }
        if let Some(search) = &filter.search {
            query = query.filter(products::name.ilike(like_pattern(search)));
        }
        let rows = query
            .order(products::created_at.desc())
            .load(self.conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn insert_product(&mut self, product: NewProduct) -> Result<Product, DomainError> {
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: product.name,
                description: product.description,
                price: product.price,
                stock: product.stock,
                category: product.category,
                sizes: product.sizes,
                colors: product.colors,
                featured: product.featured,
            })
            .returning(ProductRow::as_returning())
            .get_result(self.conn)?;
        Ok(row.into())
    }

    fn save_product(&mut self, product: &Product) -> Result<(), DomainError> {
        let updated = diesel::update(products::table.find(product.id))
            .set(ProductChangeset::from(product))
            .execute(self.conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound("Product"));
        }
        Ok(())
    }

    fn delete_product(&mut self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = diesel::delete(products::table.find(id)).execute(self.conn)?;
        Ok(deleted > 0)
    }

    fn reserve_stock(&mut self, id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        let updated = diesel::update(
            products::table
                .find(id)
                .filter(products::stock.ge(quantity)),
        )
        .set((
            products::stock.eq(products::stock - quantity),
            products::updated_at.eq(Utc::now()),
        ))
        .execute(self.conn)?;
        Ok(updated == 1)
    }

    fn restore_stock(&mut self, id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        let updated = diesel::update(products::table.find(id))
            .set((
                products::stock.eq(products::stock + quantity),
                products::updated_at.eq(Utc::now()),
            ))
            .execute(self.conn)?;
        Ok(updated == 1)
    }
}
