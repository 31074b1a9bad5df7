//! GraphQL documents sent to the Admin API.

/// Variant selection shared by the catalog page and the variant follow-up.
macro_rules! variant_fields {
    () => {
        r"
fragment FeedVariantFields on ProductVariant {
  id
  title
  sku
  price
  compareAtPrice
  availableForSale
  inventoryQuantity
  inventoryPolicy
  image { url }
  selectedOptions { name value }
  inventoryItem { measurement { weight { value unit } } }
}
"
    };
}

/// First page of each product's images and variants rides along with the
/// product; products with more are completed by [`PRODUCT_VARIANTS`] and
/// [`PRODUCT_IMAGES`].
pub(crate) const PRODUCTS: &str = concat!(
    r"
query FeedProducts($first: Int!, $after: String) {
  products(first: $first, after: $after, sortKey: ID) {
    pageInfo { hasNextPage endCursor }
    nodes {
      id
      title
      description
      descriptionHtml
      handle
      vendor
      status
      onlineStoreUrl
      productType
      category { fullName }
      images(first: 20) {
        pageInfo { hasNextPage endCursor }
        nodes { url }
      }
      variants(first: 100) {
        pageInfo { hasNextPage endCursor }
        nodes { ...FeedVariantFields }
      }
    }
  }
}
",
    variant_fields!()
);

pub(crate) const PRODUCT_VARIANTS: &str = concat!(
    r"
query FeedVariantPage($id: ID!, $first: Int!, $after: String) {
  product(id: $id) {
    variants(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes { ...FeedVariantFields }
    }
  }
}
",
    variant_fields!()
);

pub(crate) const PRODUCT_IMAGES: &str = r"
query FeedImagePage($id: ID!, $first: Int!, $after: String) {
  product(id: $id) {
    images(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes { url }
    }
  }
}
";

pub(crate) const SHOP: &str = r"
query FeedShop {
  shop {
    name
    url
    currencyCode
    primaryDomain { url }
    billingAddress { countryCodeV2 }
    shipsToCountries
  }
}
";

pub(crate) const SHOP_POLICIES: &str = r"
query FeedShopPolicies {
  shop {
    shopPolicies { type url }
  }
}
";
