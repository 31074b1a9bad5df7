//! Shop-level reads: store facts and legal policy URLs.

use serde_json::json;
use shopfeed_core::{ShopInfo, ShopPolicies};

use crate::error::ShopifyError;
use crate::normalize::{normalize_policies, normalize_shop};
use crate::queries;
use crate::types::{PoliciesData, ShopData};

use super::ShopifyClient;

impl ShopifyClient {
    /// Fetches the shop's name, URLs, currency and countries.
    ///
    /// # Errors
    ///
    /// Any request or decoding error from the Admin API.
    pub async fn fetch_shop_info(
        &self,
        shop: &str,
        access_token: &str,
    ) -> Result<ShopInfo, ShopifyError> {
        let data: ShopData = self
            .execute(shop, access_token, "shop", queries::SHOP, json!({}))
            .await?;
        Ok(normalize_shop(data.shop))
    }

    /// Fetches privacy, terms and refund policy URLs. A shop with no
    /// published policies yields an empty [`ShopPolicies`], not an error.
    ///
    /// # Errors
    ///
    /// Any request or decoding error from the Admin API.
    pub async fn fetch_shop_policies(
        &self,
        shop: &str,
        access_token: &str,
    ) -> Result<ShopPolicies, ShopifyError> {
        let data: PoliciesData = self
            .execute(
                shop,
                access_token,
                "shop policies",
                queries::SHOP_POLICIES,
                json!({}),
            )
            .await?;
        Ok(normalize_policies(data.shop.shop_policies))
    }
}
