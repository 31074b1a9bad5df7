//! Cursor-chained catalog fetch.

use serde::de::DeserializeOwned;
use serde_json::json;
use shopfeed_core::Product;

use crate::error::ShopifyError;
use crate::normalize::normalize_product;
use crate::pagination::{nested_cursor, next_cursor};
use crate::queries;
use crate::types::{
    Connection, PageInfo, ProductImagesData, ProductVariantsData, ProductsData, ShopifyImage,
    ShopifyProduct, ShopifyVariant,
};

use super::ShopifyClient;
use super::MAX_PAGES;

/// Largest page the Admin API serves for a nested connection.
const NESTED_PAGE_SIZE: u32 = 250;

/// How to page one nested connection of a single product.
struct NestedConnection<D, T> {
    name: &'static str,
    document: &'static str,
    extract: fn(D) -> Option<Connection<T>>,
}

fn variants_of(data: ProductVariantsData) -> Option<Connection<ShopifyVariant>> {
    data.product.map(|p| p.variants)
}

fn images_of(data: ProductImagesData) -> Option<Connection<ShopifyImage>> {
    data.product.map(|p| p.images)
}

const VARIANTS: NestedConnection<ProductVariantsData, ShopifyVariant> = NestedConnection {
    name: "variants",
    document: queries::PRODUCT_VARIANTS,
    extract: variants_of,
};

const IMAGES: NestedConnection<ProductImagesData, ShopifyImage> = NestedConnection {
    name: "images",
    document: queries::PRODUCT_IMAGES,
    extract: images_of,
};

impl ShopifyClient {
    /// Fetches every product in the shop, following `endCursor` until
    /// `hasNextPage` is false. Products come back in ascending ID order.
    ///
    /// Pages are requested strictly one after another since each request
    /// needs the previous page's cursor. A product whose variants or images
    /// do not fit on the catalog page is completed with follow-up queries
    /// before the next catalog page is requested.
    ///
    /// **All-or-nothing**: on any page failure, products from earlier pages
    /// are discarded and the error is returned. A partial catalog would
    /// publish a feed silently missing products or variants.
    ///
    /// # Errors
    ///
    /// Propagates request errors, returns [`ShopifyError::MalformedResponse`]
    /// when a page lacks usable `pageInfo` or a product vanishes between
    /// pages, and [`ShopifyError::PaginationLimit`] past [`MAX_PAGES`].
    pub async fn fetch_all_products(
        &self,
        shop: &str,
        access_token: &str,
    ) -> Result<Vec<Product>, ShopifyError> {
        let mut products: Vec<Product> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(ShopifyError::PaginationLimit {
                    shop: shop.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let variables = json!({ "first": self.page_size, "after": cursor });
            let data: ProductsData = self
                .execute(shop, access_token, "products", queries::PRODUCTS, variables)
                .await?;

            let connection = data.products;
            let next = next_cursor(shop, connection.page_info.as_ref())?;

            tracing::debug!(
                shop,
                page = page_count,
                count = connection.nodes.len(),
                "fetched product page"
            );

            for mut raw in connection.nodes {
                self.complete_product(shop, access_token, &mut raw).await?;
                products.push(normalize_product(raw));
            }

            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        tracing::info!(shop, pages = page_count, products = products.len(), "catalog fetched");
        Ok(products)
    }

    /// Appends the variants and images beyond the first nested page.
    async fn complete_product(
        &self,
        shop: &str,
        access_token: &str,
        product: &mut ShopifyProduct,
    ) -> Result<(), ShopifyError> {
        let more_variants = self
            .fetch_rest(
                shop,
                access_token,
                &product.id,
                &VARIANTS,
                product.variants.page_info.as_ref(),
            )
            .await?;
        product.variants.nodes.extend(more_variants);

        let more_images = self
            .fetch_rest(
                shop,
                access_token,
                &product.id,
                &IMAGES,
                product.images.page_info.as_ref(),
            )
            .await?;
        product.images.nodes.extend(more_images);
        Ok(())
    }

    async fn fetch_rest<D, T>(
        &self,
        shop: &str,
        access_token: &str,
        product_id: &str,
        nested: &NestedConnection<D, T>,
        first_page: Option<&PageInfo>,
    ) -> Result<Vec<T>, ShopifyError>
    where
        D: DeserializeOwned,
    {
        let mut rest = Vec::new();
        let mut cursor = nested_cursor(shop, nested.name, first_page)?;
        let mut page_count = 0usize;

        while let Some(after) = cursor {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(ShopifyError::PaginationLimit {
                    shop: shop.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let variables = json!({ "id": product_id, "first": NESTED_PAGE_SIZE, "after": after });
            let data: D = self
                .execute(shop, access_token, nested.name, nested.document, variables)
                .await?;
            let page = (nested.extract)(data).ok_or_else(|| ShopifyError::MalformedResponse {
                shop: shop.to_owned(),
                reason: format!("product {product_id} disappeared while paging {}", nested.name),
            })?;

            cursor = nested_cursor(shop, nested.name, page.page_info.as_ref())?;
            rest.extend(page.nodes);
        }

        if page_count > 0 {
            tracing::debug!(
                shop,
                product = product_id,
                connection = nested.name,
                pages = page_count,
                extra = rest.len(),
                "completed nested connection"
            );
        }
        Ok(rest)
    }
}
