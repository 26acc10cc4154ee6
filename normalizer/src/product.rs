//! Enhanced ecommerce products.
//!
//! Two namespaces describe products: `pr<N>...` for cart, detail and
//! transaction context and `il<L>pi<N>...` for impression lists. Every
//! `...id` key in either namespace produces its own record, so the same
//! numeric index in both namespaces yields two products.

use crate::hit::Product;
use crate::indexed::{IndexedFamily, extract_for_product};
use crate::keys::{Index, ParamKey, ProductField};
use crate::raw_hit::RawHit;

/// Where a product's metadata is read from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ProductContext {
    Cart,
    Impression { list: Index },
}

impl ProductContext {
    fn key(&self, index: Index, field: ProductField) -> ParamKey {
        match *self {
            ProductContext::Cart => ParamKey::Product { index, field },
            ProductContext::Impression { list } => ParamKey::Impression { list, index, field },
        }
    }
}

/// Looks up `field` for a product in its own namespace. A missing key is
/// simply absent.
fn metadata(
    hit: &RawHit,
    context: ProductContext,
    index: Index,
    field: ProductField,
) -> Option<String> {
    hit.get_key(context.key(index, field)).map(str::to_string)
}

/// Fields that only exist in the cart namespace, whatever the context. The
/// index keeps its spelling, so `il1pi01id` reads `pr01qt`.
fn cart_field(hit: &RawHit, index: Index, field: ProductField) -> Option<String> {
    metadata(hit, ProductContext::Cart, index, field)
}

fn build_product(hit: &RawHit, context: ProductContext, index: Index, is_click: bool) -> Product {
    let list_name = match context {
        ProductContext::Impression { list } => hit.get_key(ParamKey::ImpressionListName(list)),
        ProductContext::Cart => hit.get("pal"),
    };

    Product {
        product_index: index.value(),
        product_sku: metadata(hit, context, index, ProductField::Id),
        product_name: metadata(hit, context, index, ProductField::Name),
        product_brand: metadata(hit, context, index, ProductField::Brand),
        product_category: metadata(hit, context, index, ProductField::Category),
        product_variant: metadata(hit, context, index, ProductField::Variant),
        product_price: metadata(hit, context, index, ProductField::Price),
        product_quantity: cart_field(hit, index, ProductField::Quantity),
        product_coupon_code: cart_field(hit, index, ProductField::CouponCode),
        custom_dimensions: extract_for_product(hit, IndexedFamily::CustomDimension, index),
        custom_metrics: extract_for_product(hit, IndexedFamily::CustomMetric, index),
        product_list_name: list_name.map(str::to_string),
        product_list_position: metadata(hit, context, index, ProductField::Position),
        is_impression: matches!(context, ProductContext::Impression { .. }),
        is_click,
    }
}

/// Builds one product per `pr<N>id` / `il<L>pi<N>id` key, in input order
pub fn extract_products(hit: &RawHit) -> Vec<Product> {
    // Click state belongs to the hit, not to a single product
    let is_click = hit.get("pa") == Some("click");

    hit.parsed_keys()
        .filter_map(|(key, _)| match key {
            ParamKey::Product {
                index,
                field: ProductField::Id,
            } => Some((ProductContext::Cart, index)),
            ParamKey::Impression {
                list,
                index,
                field: ProductField::Id,
            } => Some((ProductContext::Impression { list }, index)),
            _ => None,
        })
        .map(|(context, index)| build_product(hit, context, index, is_click))
        .collect()
}
