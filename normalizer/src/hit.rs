//! Output record types.
//!
//! `NormalizedHit` is the nested row appended to the columnar sink. Every
//! `Option` serializes as `null` when absent; nothing is skipped, so each row
//! carries the full field set.
//!
//! # Example
//! ```json
//! {
//!   "serverTimeUtc": 1617235200,
//!   "clientId": "555.123",
//!   "hitType": "PAGEVIEW",
//!   "isInteraction": true,
//!   "customDimensions": [{"index": 1, "value": "member"}],
//!   "ecommerceAction": {"action_type": 6, "name": "purchase", "step": null, "option": null},
//!   ...
//! }
//! ```

use serde::{Serialize, Serializer};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedHit {
    pub server_time_utc: Option<i64>,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub hit_type: String,
    pub is_interaction: bool,
    pub custom_dimensions: Vec<CustomDimension>,
    pub custom_metrics: Vec<CustomMetric>,
    pub page: Page,
    pub event_info: EventInfo,
    pub promotion: Vec<Promotion>,
    pub promotion_action: Option<PromotionAction>,
    pub product: Vec<Product>,
    pub ecommerce_action: Option<EcommerceAction>,
    pub transaction: Transaction,
    pub traffic_source: TrafficSource,
    pub device: Device,
    pub geo: Geo,
    pub latency_tracking: LatencyTracking,
    pub experiment_id: Option<String>,
    pub experiment_variant: Option<String>,
    pub tracking_id: Option<String>,
    pub container_id: Option<String>,
    pub tag_version: Option<String>,
    pub cache_buster: Option<String>,
}

/// One entry of an indexed family (`cd<N>` / `cm<N>`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct IndexedValue {
    pub index: u16,
    pub value: String,
}

pub type CustomDimension = IndexedValue;
pub type CustomMetric = IndexedValue;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub hostname: Option<String>,
    pub page_path: Option<String>,
    pub page_title: Option<String>,
    pub url: Option<String>,
    pub query: Option<String>,
    pub referrer: Option<String>,
    pub link_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub event_category: Option<String>,
    pub event_action: Option<String>,
    pub event_label: Option<String>,
    pub event_value: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub promo_index: u16,
    pub promo_id: Option<String>,
    pub promo_name: Option<String>,
    pub promo_creative: Option<String>,
    pub promo_position: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionAction {
    pub promo_is_view: bool,
    pub promo_is_click: bool,
}

impl PromotionAction {
    pub const VIEW: PromotionAction = PromotionAction {
        promo_is_view: true,
        promo_is_click: false,
    };

    pub const CLICK: PromotionAction = PromotionAction {
        promo_is_view: false,
        promo_is_click: true,
    };
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_index: u16,
    #[serde(rename = "productSKU")]
    pub product_sku: Option<String>,
    pub product_name: Option<String>,
    pub product_brand: Option<String>,
    pub product_category: Option<String>,
    pub product_variant: Option<String>,
    pub product_price: Option<String>,
    pub product_quantity: Option<String>,
    pub product_coupon_code: Option<String>,
    pub custom_dimensions: Vec<CustomDimension>,
    pub custom_metrics: Vec<CustomMetric>,
    pub product_list_name: Option<String>,
    pub product_list_position: Option<String>,
    pub is_impression: bool,
    pub is_click: bool,
}

/// Enhanced ecommerce action codes (`pa`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EcommerceActionType {
    Click = 1,
    Detail = 2,
    Add = 3,
    Remove = 4,
    Checkout = 5,
    Purchase = 6,
    Refund = 7,
    CheckoutOption = 8,
}

impl EcommerceActionType {
    pub fn from_code(code: &str) -> Option<Self> {
        let action = match code {
            "click" => EcommerceActionType::Click,
            "detail" => EcommerceActionType::Detail,
            "add" => EcommerceActionType::Add,
            "remove" => EcommerceActionType::Remove,
            "checkout" => EcommerceActionType::Checkout,
            "purchase" => EcommerceActionType::Purchase,
            "refund" => EcommerceActionType::Refund,
            "checkout_option" => EcommerceActionType::CheckoutOption,
            _ => return None,
        };
        Some(action)
    }

    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl Serialize for EcommerceActionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EcommerceAction {
    /// None when `name` is not a known action code
    #[serde(rename = "action_type")]
    pub action_type: Option<EcommerceActionType>,
    pub name: String,
    pub step: Option<i64>,
    pub option: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: Option<String>,
    pub affiliation: Option<String>,
    pub transaction_revenue: Option<f64>,
    pub transaction_tax: Option<f64>,
    pub transaction_shipping: Option<f64>,
    pub transaction_coupon: Option<String>,
    pub currency_code: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSource {
    pub campaign: Option<String>,
    pub campaign_code: Option<String>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub keyword: Option<String>,
    pub ad_content: Option<String>,
    pub gcl_id: Option<String>,
    pub dcl_id: Option<String>,
    pub referrer: Option<String>,
    pub gcl_src: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub screen_colors: Option<String>,
    pub screen_resolution: Option<String>,
    pub browser_size: Option<String>,
    pub java_enabled: bool,
    pub language: Option<String>,
    pub document_encoding: Option<String>,
    pub flash_version: Option<String>,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub mobile_device_model: Option<String>,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    pub mobile_device_branding: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Geo {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyTracking {
    pub page_load_time: Option<i64>,
    pub page_download_time: Option<i64>,
    pub domain_lookup_time: Option<i64>,
    pub redirection_time: Option<i64>,
    pub server_response_time: Option<i64>,
    pub server_connection_time: Option<i64>,
    pub dom_interactive_time: Option<i64>,
    pub dom_content_loaded_time: Option<i64>,
}
