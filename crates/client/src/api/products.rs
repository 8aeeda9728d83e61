//! Catalogue endpoints. Image references are resolved before returning.

use tracing::instrument;

use techmart_core::{Product, ProductId};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// All products.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        let products = self.get("/products", &[]).await?;
        Ok(self.resolve_images(products))
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let mut product: Product = self.get(&format!("/products/{id}"), &[]).await?;
        product.image = product.image.map(|image| self.image_url(&image));
        Ok(product)
    }

    /// Products in one category.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, ApiError> {
        let products = self
            .get(&format!("/products/category/{category}"), &[])
            .await?;
        Ok(self.resolve_images(products))
    }

    /// Free-text product search.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let products = self
            .get("/products/search", &[("q", query.to_string())])
            .await?;
        Ok(self.resolve_images(products))
    }

    /// Products picked for the home page.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        let products = self.get("/products/featured", &[]).await?;
        Ok(self.resolve_images(products))
    }

    fn resolve_images(&self, products: Vec<Product>) -> Vec<Product> {
        products
            .into_iter()
            .map(|mut product| {
                product.image = product.image.map(|image| self.image_url(&image));
                product
            })
            .collect()
    }
}
