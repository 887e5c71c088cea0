use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Largest accepted product image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: String,
    pub image_url: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.name, &self.category, &self.price, self.stock)
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub featured: Option<bool>,
}

impl Product {
    pub fn apply(&mut self, update: ProductUpdate) -> Result<(), DomainError> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(sizes) = update.sizes {
            self.sizes = sizes;
        }
        if let Some(colors) = update.colors {
            self.colors = colors;
        }
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        validate_fields(&self.name, &self.category, &self.price, self.stock)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_fields(
    name: &str,
    category: &str,
    price: &BigDecimal,
    stock: i32,
) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("product name is required"));
    }
    if category.trim().is_empty() {
        return Err(DomainError::validation("product category is required"));
    }
    if *price < BigDecimal::zero() {
        return Err(DomainError::validation("price must not be negative"));
    }
    if stock < 0 {
        return Err(DomainError::validation("stock must not be negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if product.featured != featured {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Webp => "webp",
        }
    }
}

/// An uploaded image that already passed size and type checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(content_type: &str, bytes: Vec<u8>) -> Result<Self, DomainError> {
        let kind = ImageKind::from_mime(content_type).ok_or_else(|| {
            DomainError::validation("only jpeg, jpg, png and webp images are allowed")
        })?;
        if bytes.is_empty() {
            return Err(DomainError::validation("image is empty"));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(DomainError::validation("image exceeds the 5MB limit"));
        }
        Ok(Self { kind, bytes })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(name: &str, category: &str, featured: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price: BigDecimal::from(10),
            stock: 3,
            category: category.to_string(),
            image_url: None,
            sizes: vec![],
            colors: vec![],
            featured,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let new = NewProduct {
            name: "Tee".into(),
            description: None,
            price: BigDecimal::from_str("-0.01").unwrap(),
            stock: 1,
            category: "shirts".into(),
            sizes: vec![],
            colors: vec![],
            featured: false,
        };
        assert!(matches!(new.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn update_rejects_negative_stock_and_keeps_validation() {
        let mut p = product("Tee", "shirts", false);
        let err = p
            .apply(ProductUpdate {
                stock: Some(-1),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut p = product("Tee", "shirts", false);
        p.apply(ProductUpdate {
            featured: Some(true),
            ..Default::default()
        })
        .unwrap();
        assert!(p.featured);
        assert_eq!(p.name, "Tee");
        assert_eq!(p.stock, 3);
    }

    #[test]
    fn filter_search_is_case_insensitive_substring() {
        let filter = ProductFilter {
            search: Some("SHIRT".into()),
            ..Default::default()
        };
        assert!(filter.matches(&product("Linen shirt", "tops", false)));
        assert!(!filter.matches(&product("Jeans", "bottoms", false)));
    }

    #[test]
    fn filter_combines_category_and_featured() {
        let filter = ProductFilter {
            category: Some("tops".into()),
            featured: Some(true),
            search: None,
        };
        assert!(filter.matches(&product("A", "tops", true)));
        assert!(!filter.matches(&product("B", "tops", false)));
        assert!(!filter.matches(&product("C", "shoes", true)));
    }

    #[test]
    fn image_upload_accepts_known_types() {
        for mime in ["image/jpeg", "image/jpg", "image/png", "IMAGE/WEBP"] {
            assert!(ImageUpload::new(mime, vec![1, 2, 3]).is_ok(), "{mime}");
        }
    }

    #[test]
    fn image_upload_rejects_other_types() {
        let err = ImageUpload::new("image/gif", vec![1]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn image_upload_rejects_oversized_files() {
        let err = ImageUpload::new("image/png", vec![0; MAX_IMAGE_BYTES + 1]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(ImageUpload::new("image/png", vec![0; MAX_IMAGE_BYTES]).is_ok());
    }
}
