//! Per-shop feed configuration and its partial-update shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::shop::{ShopInfo, ShopPolicies};

pub const DEFAULT_COUNTRY: &str = "US";
pub const DEFAULT_RETURN_DEADLINE_DAYS: i32 = 30;

/// Feed configuration for one shop. Created with [`FeedSettings::defaults`]
/// on first access and changed only through [`SettingsPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSettings {
    pub shop: String,
    pub enable_search: bool,
    pub enable_checkout: bool,
    /// Overrides the shop's display name as `seller_name` and `brand` fallback.
    pub seller_name: Option<String>,
    /// Overrides the storefront URL used for `seller_url` and product links.
    pub seller_url: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub terms_of_service_url: Option<String>,
    /// The returns block is only emitted when this is set.
    pub return_policy_url: Option<String>,
    pub accepts_returns: bool,
    pub return_deadline_days: i32,
    pub accepts_exchanges: bool,
    pub store_country: Option<String>,
    /// Comma-joined ISO country codes, e.g. `"US,CA"`.
    pub target_countries: Option<String>,
    pub feed_generated_at: Option<DateTime<Utc>>,
    pub product_count: Option<i32>,
}

impl FeedSettings {
    /// The settings a shop starts with before the merchant changes anything.
    #[must_use]
    pub fn defaults(shop: &str) -> Self {
        Self {
            shop: shop.to_owned(),
            enable_search: true,
            enable_checkout: false,
            seller_name: None,
            seller_url: None,
            privacy_policy_url: None,
            terms_of_service_url: None,
            return_policy_url: None,
            accepts_returns: true,
            return_deadline_days: DEFAULT_RETURN_DEADLINE_DAYS,
            accepts_exchanges: true,
            store_country: Some(DEFAULT_COUNTRY.to_owned()),
            target_countries: Some(DEFAULT_COUNTRY.to_owned()),
            feed_generated_at: None,
            product_count: None,
        }
    }
}

/// Whitelisted partial update. `None` leaves a field untouched; for the
/// nullable text fields `Some(None)` clears the stored value.
///
/// Unknown keys are rejected when deserializing so that only the fields
/// listed here can ever be written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    pub enable_search: Option<bool>,
    pub enable_checkout: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub seller_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub seller_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub privacy_policy_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub terms_of_service_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub return_policy_url: Option<Option<String>>,
    pub accepts_returns: Option<bool>,
    pub return_deadline_days: Option<i32>,
    pub accepts_exchanges: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub store_country: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub target_countries: Option<Option<String>>,
}

impl SettingsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds a patch from what the store itself reports. Only values the
    /// store actually supplied are set; everything else stays `None` so the
    /// merchant's existing settings survive a re-sync.
    #[must_use]
    pub fn from_shop(info: &ShopInfo, policies: &ShopPolicies) -> Self {
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.trim().to_owned());

        let storefront = info.storefront_url();
        let ships_to = info
            .ships_to_countries
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            seller_name: non_empty(&info.name).map(Some),
            seller_url: non_empty(storefront).map(Some),
            privacy_policy_url: policies.privacy_url.clone().map(Some),
            terms_of_service_url: policies.terms_url.clone().map(Some),
            return_policy_url: policies.refund_url.clone().map(Some),
            store_country: info
                .country_code
                .as_deref()
                .and_then(non_empty)
                .map(Some),
            target_countries: non_empty(&ships_to).map(Some),
            ..Self::default()
        }
    }

    /// Applies the patch to an in-memory copy, mirroring what the store does
    /// with the same patch.
    pub fn apply_to(&self, settings: &mut FeedSettings) {
        fn set<T: Clone>(slot: &mut T, value: Option<&T>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }

        set(&mut settings.enable_search, self.enable_search.as_ref());
        set(&mut settings.enable_checkout, self.enable_checkout.as_ref());
        set(&mut settings.seller_name, self.seller_name.as_ref());
        set(&mut settings.seller_url, self.seller_url.as_ref());
        set(
            &mut settings.privacy_policy_url,
            self.privacy_policy_url.as_ref(),
        );
        set(
            &mut settings.terms_of_service_url,
            self.terms_of_service_url.as_ref(),
        );
        set(
            &mut settings.return_policy_url,
            self.return_policy_url.as_ref(),
        );
        set(&mut settings.accepts_returns, self.accepts_returns.as_ref());
        set(
            &mut settings.return_deadline_days,
            self.return_deadline_days.as_ref(),
        );
        set(
            &mut settings.accepts_exchanges,
            self.accepts_exchanges.as_ref(),
        );
        set(&mut settings.store_country, self.store_country.as_ref());
        set(
            &mut settings.target_countries,
            self.target_countries.as_ref(),
        );
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
