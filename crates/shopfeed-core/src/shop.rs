use serde::{Deserialize, Serialize};

/// Store-level facts read from the Admin API `shop` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopInfo {
    /// Display name of the store.
    pub name: String,
    /// Storefront URL, typically `https://<shop>.myshopify.com`.
    pub url: String,
    /// Merchant's primary custom domain, when configured.
    pub primary_domain_url: Option<String>,
    /// ISO 4217 currency code (e.g. `"USD"`).
    pub currency_code: Option<String>,
    /// Billing address country code (ISO 3166-1 alpha-2).
    pub country_code: Option<String>,
    /// Country codes the store ships to.
    pub ships_to_countries: Vec<String>,
}

impl ShopInfo {
    /// The storefront base URL: primary domain when present, else the
    /// generic shop URL, with one trailing slash removed.
    #[must_use]
    pub fn storefront_url(&self) -> &str {
        let url = self
            .primary_domain_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.url);
        url.strip_suffix('/').unwrap_or(url)
    }
}

/// Legal policy page URLs published by the store. Any or all may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopPolicies {
    pub privacy_url: Option<String>,
    pub terms_url: Option<String>,
    pub refund_url: Option<String>,
}

impl ShopPolicies {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.privacy_url.is_none() && self.terms_url.is_none() && self.refund_url.is_none()
    }
}
