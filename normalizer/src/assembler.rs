//! Assembly of a `NormalizedHit` from a `RawHit`.
//!
//! `HitNormalizer::normalize` is a pure function of its input: no I/O, no
//! state kept between calls, and the same input always produces the same
//! output. It is safe to share across threads and to retry.

use std::sync::Arc;

use url::Url;

use crate::coerce::{parse_float, parse_integer};
use crate::ecommerce::ecommerce_action;
use crate::errors::{NormalizationError, Result};
use crate::hit::{Device, EventInfo, Geo, LatencyTracking, NormalizedHit, Page, Transaction};
use crate::indexed::{IndexedFamily, extract};
use crate::product::extract_products;
use crate::promotion::{extract_promotions, promotion_action};
use crate::raw_hit::RawHit;
use crate::traffic_source::{AdContentFallback, referrer, resolve_traffic_source};
use crate::user_agent::{NoopUserAgentParser, UserAgentFields, UserAgentParser, parse_user_agent};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizerOptions {
    pub ad_content_fallback: AdContentFallback,
}

#[derive(Clone)]
pub struct HitNormalizer {
    user_agents: Arc<dyn UserAgentParser>,
    options: NormalizerOptions,
}

impl Default for HitNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(NoopUserAgentParser), NormalizerOptions::default())
    }
}

fn owned(hit: &RawHit, key: &str) -> Option<String> {
    hit.get(key).map(str::to_string)
}

const PLACEHOLDER_ORIGIN: &str = "http://localhost/";

/// The document location (`dl`) as far as it can be resolved
struct LandingPage {
    url: Url,
    hostname: Option<String>,
}

impl LandingPage {
    /// Absolute URLs parse as-is. A location starting with `/` is resolved
    /// against a placeholder origin, keeping its path and query but no
    /// hostname unless it is protocol-relative (`//host/...`). Anything else
    /// is unusable.
    fn parse(dl: &str) -> Option<Self> {
        if let Ok(url) = Url::parse(dl) {
            let hostname = url.host_str().map(str::to_string);
            return Some(Self { url, hostname });
        }

        if !dl.starts_with('/') {
            return None;
        }
        let url = Url::parse(PLACEHOLDER_ORIGIN).ok()?.join(dl).ok()?;
        let hostname = if dl.starts_with("//") {
            url.host_str().map(str::to_string)
        } else {
            None
        };
        Some(Self { url, hostname })
    }
}

impl HitNormalizer {
    pub fn new(user_agents: Arc<dyn UserAgentParser>, options: NormalizerOptions) -> Self {
        Self {
            user_agents,
            options,
        }
    }

    /// Normalizes one hit. Fails only on a missing hit type or a numeric
    /// field holding something that is not a number.
    pub fn normalize(&self, hit: &RawHit) -> Result<NormalizedHit> {
        let hit_type = hit
            .get("t")
            .ok_or(NormalizationError::MissingRequiredField { key: "t" })?
            .to_uppercase();

        let landing_page = hit.get("dl").and_then(LandingPage::parse);

        let user_agent = parse_user_agent(self.user_agents.as_ref(), hit.get("userAgent"));

        Ok(NormalizedHit {
            server_time_utc: parse_integer(hit, "serverTimeUtc")?,
            client_id: owned(hit, "cid"),
            user_id: owned(hit, "uid"),
            hit_type,
            is_interaction: hit.get("ni") != Some("1"),
            custom_dimensions: extract(hit, IndexedFamily::CustomDimension),
            custom_metrics: extract(hit, IndexedFamily::CustomMetric),
            page: page(hit, landing_page.as_ref()),
            event_info: event_info(hit)?,
            promotion: extract_promotions(hit),
            promotion_action: promotion_action(hit),
            product: extract_products(hit),
            ecommerce_action: ecommerce_action(hit)?,
            transaction: transaction(hit)?,
            traffic_source: resolve_traffic_source(
                hit,
                landing_page.as_ref().map(|page| &page.url),
                self.options.ad_content_fallback,
            ),
            device: device(hit, UserAgentFields::from(user_agent.as_ref())),
            geo: Geo {
                country: owned(hit, "country"),
                region: owned(hit, "region"),
                city: owned(hit, "city"),
            },
            latency_tracking: latency_tracking(hit)?,
            experiment_id: owned(hit, "xid"),
            experiment_variant: owned(hit, "xvar"),
            tracking_id: owned(hit, "tid"),
            container_id: owned(hit, "gtm"),
            tag_version: owned(hit, "v"),
            cache_buster: owned(hit, "z"),
        })
    }
}

fn page(hit: &RawHit, landing_page: Option<&LandingPage>) -> Page {
    let page_path = hit
        .non_empty("dp")
        .map(str::to_string)
        .or_else(|| landing_page.map(|page| page.url.path().to_string()));

    Page {
        hostname: landing_page.and_then(|page| page.hostname.clone()),
        page_path,
        page_title: owned(hit, "dt"),
        url: owned(hit, "dl"),
        query: landing_page.map(|page| page.url.query().unwrap_or_default().to_string()),
        referrer: referrer(hit),
        link_id: owned(hit, "linkId"),
    }
}

fn event_info(hit: &RawHit) -> Result<EventInfo> {
    Ok(EventInfo {
        event_category: owned(hit, "ec"),
        event_action: owned(hit, "ea"),
        event_label: owned(hit, "el"),
        event_value: parse_integer(hit, "ev")?,
    })
}

fn transaction(hit: &RawHit) -> Result<Transaction> {
    Ok(Transaction {
        transaction_id: owned(hit, "ti"),
        affiliation: owned(hit, "ta"),
        transaction_revenue: parse_float(hit, "tr")?,
        transaction_tax: parse_float(hit, "tt")?,
        transaction_shipping: parse_float(hit, "ts")?,
        transaction_coupon: owned(hit, "tcc"),
        currency_code: owned(hit, "cu"),
    })
}

fn device(hit: &RawHit, user_agent: UserAgentFields) -> Device {
    Device {
        screen_colors: owned(hit, "sd"),
        screen_resolution: owned(hit, "sr"),
        browser_size: owned(hit, "vp"),
        java_enabled: hit.get("je") != Some("0"),
        language: owned(hit, "ul"),
        document_encoding: owned(hit, "de"),
        flash_version: owned(hit, "fv"),
        browser: user_agent.browser,
        browser_version: user_agent.browser_version,
        mobile_device_model: user_agent.mobile_device_model,
        operating_system: user_agent.operating_system,
        operating_system_version: user_agent.operating_system_version,
        mobile_device_branding: user_agent.mobile_device_branding,
        user_agent: owned(hit, "userAgent"),
    }
}

fn latency_tracking(hit: &RawHit) -> Result<LatencyTracking> {
    Ok(LatencyTracking {
        page_load_time: parse_integer(hit, "plt")?,
        page_download_time: parse_integer(hit, "pdt")?,
        domain_lookup_time: parse_integer(hit, "dns")?,
        redirection_time: parse_integer(hit, "rrt")?,
        server_response_time: parse_integer(hit, "srt")?,
        server_connection_time: parse_integer(hit, "tcp")?,
        dom_interactive_time: parse_integer(hit, "dit")?,
        dom_content_loaded_time: parse_integer(hit, "clt")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::{EcommerceAction, EcommerceActionType, IndexedValue, PromotionAction};
    use crate::user_agent::testutils::{CHROME_ON_ANDROID, FakeUserAgentParser};
    use std::collections::HashSet;

    fn normalizer() -> HitNormalizer {
        HitNormalizer::new(Arc::new(FakeUserAgentParser), NormalizerOptions::default())
    }

    fn hit(pairs: &[(&str, &str)]) -> RawHit {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_minimal_hit() {
        let normalized = normalizer().normalize(&hit(&[("t", "pageview")])).unwrap();

        assert_eq!(normalized.hit_type, "PAGEVIEW");
        assert!(normalized.is_interaction);
        assert!(normalized.device.java_enabled);
        assert!(normalized.custom_dimensions.is_empty());
        assert!(normalized.product.is_empty());
        assert_eq!(normalized.promotion_action, None);
        assert_eq!(normalized.ecommerce_action, None);
        assert_eq!(normalized.page, Page::default());
        assert_eq!(normalized.event_info, EventInfo::default());
        assert_eq!(normalized.latency_tracking, LatencyTracking::default());
        assert_eq!(normalized.server_time_utc, None);
        assert_eq!(normalized.device.browser, None);
        assert_eq!(normalized.device.browser_version, None);

        // absent fields serialize as null, not as defaults
        let json = serde_json::to_value(&normalized).unwrap();
        assert!(json["clientId"].is_null());
        assert!(json["eventInfo"]["eventValue"].is_null());
        assert!(json["ecommerceAction"].is_null());
        assert!(json["promotionAction"].is_null());
        assert_eq!(json["isInteraction"], true);
    }

    #[test]
    fn test_missing_hit_type() {
        let err = normalizer().normalize(&hit(&[("cid", "1")])).unwrap_err();
        assert_eq!(err, NormalizationError::MissingRequiredField { key: "t" });
    }

    #[test]
    fn test_numeric_failure() {
        let err = normalizer()
            .normalize(&hit(&[("t", "event"), ("ev", "not-a-number")]))
            .unwrap_err();
        assert!(matches!(
            err,
            NormalizationError::ValueConversion { key: "ev", .. }
        ));

        let err = normalizer()
            .normalize(&hit(&[("t", "transaction"), ("tr", "lots")]))
            .unwrap_err();
        assert!(matches!(
            err,
            NormalizationError::ValueConversion {
                key: "tr",
                expected: "float",
                ..
            }
        ));

        let err = normalizer()
            .normalize(&hit(&[("t", "transaction"), ("tr", "10"), ("tt", "NaN")]))
            .unwrap_err();
        assert!(matches!(
            err,
            NormalizationError::ValueConversion { key: "tt", .. }
        ));

        let err = normalizer()
            .normalize(&hit(&[("t", "timing"), ("plt", "fast")]))
            .unwrap_err();
        assert!(matches!(
            err,
            NormalizationError::ValueConversion { key: "plt", .. }
        ));
    }

    #[test]
    fn test_boolean_defaults() {
        let n = normalizer();
        assert!(n.normalize(&hit(&[("t", "event")])).unwrap().is_interaction);
        assert!(!n.normalize(&hit(&[("t", "event"), ("ni", "1")])).unwrap().is_interaction);
        assert!(n.normalize(&hit(&[("t", "event"), ("ni", "0")])).unwrap().is_interaction);

        assert!(n.normalize(&hit(&[("t", "event"), ("je", "1")])).unwrap().device.java_enabled);
        assert!(!n.normalize(&hit(&[("t", "event"), ("je", "0")])).unwrap().device.java_enabled);
    }

    #[test]
    fn test_page_fields() {
        let normalized = normalizer()
            .normalize(&hit(&[
                ("t", "pageview"),
                ("dl", "https://Shop.Example.com/products/shoes?color=red&utm_medium=cpc"),
                ("dt", "Shoes"),
                ("dr", ""),
                ("referrer", "https://search.example/"),
                ("linkId", "nav-shoes"),
            ]))
            .unwrap();

        let page = normalized.page;
        assert_eq!(page.hostname.as_deref(), Some("shop.example.com"));
        assert_eq!(page.page_path.as_deref(), Some("/products/shoes"));
        assert_eq!(page.page_title.as_deref(), Some("Shoes"));
        assert_eq!(page.query.as_deref(), Some("color=red&utm_medium=cpc"));
        assert_eq!(page.referrer.as_deref(), Some("https://search.example/"));
        assert_eq!(page.link_id.as_deref(), Some("nav-shoes"));

        let normalized = normalizer()
            .normalize(&hit(&[
                ("t", "pageview"),
                ("dl", "https://a.example/x"),
                ("dp", "/virtual"),
            ]))
            .unwrap();
        assert_eq!(normalized.page.page_path.as_deref(), Some("/virtual"));
        assert_eq!(normalized.page.query.as_deref(), Some(""));

        let normalized = normalizer()
            .normalize(&hit(&[("t", "pageview"), ("dl", "not a url")]))
            .unwrap();
        assert_eq!(normalized.page.url.as_deref(), Some("not a url"));
        assert_eq!(normalized.page.hostname, None);
        assert_eq!(normalized.page.page_path, None);
        assert_eq!(normalized.page.query, None);
    }

    #[test]
    fn test_relative_location() {
        let normalized = normalizer()
            .normalize(&hit(&[
                ("t", "pageview"),
                ("dl", "/cart?utm_source=newsletter&utm_medium=email"),
                ("cs", "ignored"),
            ]))
            .unwrap();

        assert_eq!(
            normalized.page.url.as_deref(),
            Some("/cart?utm_source=newsletter&utm_medium=email")
        );
        assert_eq!(normalized.page.hostname, None);
        assert_eq!(normalized.page.page_path.as_deref(), Some("/cart"));
        assert_eq!(
            normalized.page.query.as_deref(),
            Some("utm_source=newsletter&utm_medium=email")
        );
        assert_eq!(normalized.traffic_source.source.as_deref(), Some("newsletter"));
        assert_eq!(normalized.traffic_source.medium.as_deref(), Some("email"));

        let normalized = normalizer()
            .normalize(&hit(&[("t", "pageview"), ("dl", "//cdn.example/a?b=c")]))
            .unwrap();
        assert_eq!(normalized.page.hostname.as_deref(), Some("cdn.example"));
        assert_eq!(normalized.page.page_path.as_deref(), Some("/a"));
        assert_eq!(normalized.page.query.as_deref(), Some("b=c"));
    }

    #[test]
    fn test_zero_padded_indices() {
        let normalized = normalizer()
            .normalize(&hit(&[
                ("t", "event"),
                ("pr01id", "SKU1"),
                ("pr01nm", "Shirt"),
                ("il1pi01id", "SKU2"),
                ("il1pi01br", "Acme"),
                ("promo01id", "SHIP"),
                ("promo01cr", "banner.png"),
            ]))
            .unwrap();

        let products = &normalized.product;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].product_index, 1);
        assert_eq!(products[0].product_sku.as_deref(), Some("SKU1"));
        assert_eq!(products[0].product_name.as_deref(), Some("Shirt"));
        assert_eq!(products[1].product_sku.as_deref(), Some("SKU2"));
        assert_eq!(products[1].product_brand.as_deref(), Some("Acme"));

        assert_eq!(normalized.promotion.len(), 1);
        assert_eq!(normalized.promotion[0].promo_id.as_deref(), Some("SHIP"));
        assert_eq!(normalized.promotion[0].promo_creative.as_deref(), Some("banner.png"));
    }

    #[test]
    fn test_full_ecommerce_hit() {
        let mut raw = RawHit::from_query_string(concat!(
            "v=1&tid=UA-12345-1&cid=555.123&uid=u-1&t=event&ec=checkout&ea=purchase&el=web&ev=10",
            "&cd1=member&cd23=gold&cm1=4",
            "&ti=T1000&ta=Store&tr=57.50&tt=4.20&ts=5&tcc=SUMMER&cu=EUR",
            "&pa=purchase&pr1id=SKU1&pr1nm=Shirt&pr1qt=2&il1nm=Recs&il1pi1id=SKU2",
            "&promo1id=SHIP&promo1nm=Free%20Shipping",
            "&dl=https%3A%2F%2Fshop.example%2Fcart%3Futm_source%3Dgoogle%26utm_medium%3Dcpc&cm=email",
            "&xid=exp1&xvar=1&gtm=GTM-ABC&z=98765",
            "&serverTimeUtc=1617235200&country=NL&region=NH&city=Amsterdam",
        ));
        raw.insert("userAgent", CHROME_ON_ANDROID);

        let normalized = normalizer().normalize(&raw).unwrap();

        assert_eq!(normalized.server_time_utc, Some(1617235200));
        assert_eq!(normalized.client_id.as_deref(), Some("555.123"));
        assert_eq!(normalized.user_id.as_deref(), Some("u-1"));
        assert_eq!(normalized.hit_type, "EVENT");
        assert_eq!(normalized.event_info.event_value, Some(10));

        let dimensions: HashSet<_> = normalized.custom_dimensions.iter().cloned().collect();
        assert_eq!(
            dimensions,
            HashSet::from([
                IndexedValue {
                    index: 1,
                    value: "member".to_string()
                },
                IndexedValue {
                    index: 23,
                    value: "gold".to_string()
                },
            ])
        );
        // `cm` is campaign medium, not a custom metric
        assert_eq!(normalized.custom_metrics.len(), 1);

        assert_eq!(normalized.transaction.transaction_revenue, Some(57.5));
        assert_eq!(normalized.transaction.transaction_shipping, Some(5.0));
        assert_eq!(normalized.transaction.currency_code.as_deref(), Some("EUR"));

        assert_eq!(
            normalized.ecommerce_action,
            Some(EcommerceAction {
                action_type: Some(EcommerceActionType::Purchase),
                name: "purchase".to_string(),
                step: None,
                option: None,
            })
        );
        assert_eq!(normalized.product.len(), 2);
        assert_eq!(normalized.promotion.len(), 1);
        assert_eq!(normalized.promotion_action, Some(PromotionAction::VIEW));

        assert_eq!(normalized.traffic_source.source.as_deref(), Some("google"));
        assert_eq!(normalized.traffic_source.medium.as_deref(), Some("cpc"));

        assert_eq!(normalized.device.browser.as_deref(), Some("Chrome Mobile"));
        assert_eq!(normalized.device.operating_system_version.as_deref(), Some("11.."));
        assert_eq!(normalized.device.user_agent.as_deref(), Some(CHROME_ON_ANDROID));
        assert_eq!(normalized.geo.city.as_deref(), Some("Amsterdam"));

        assert_eq!(normalized.experiment_id.as_deref(), Some("exp1"));
        assert_eq!(normalized.tracking_id.as_deref(), Some("UA-12345-1"));
        assert_eq!(normalized.container_id.as_deref(), Some("GTM-ABC"));
        assert_eq!(normalized.tag_version.as_deref(), Some("1"));
        assert_eq!(normalized.cache_buster.as_deref(), Some("98765"));
    }

    #[test]
    fn test_unrecognized_user_agent() {
        let normalized = normalizer()
            .normalize(&hit(&[("t", "pageview"), ("userAgent", "curl/7.68.0")]))
            .unwrap();
        assert_eq!(normalized.device.browser, None);
        assert_eq!(normalized.device.browser_version, None);
        assert_eq!(normalized.device.user_agent.as_deref(), Some("curl/7.68.0"));
    }

    #[test]
    fn test_deterministic_output() {
        let raw = hit(&[
            ("t", "event"),
            ("cd5", "x"),
            ("cd2", "y"),
            ("pr2id", "B"),
            ("pr1id", "A"),
            ("il1pi1id", "C"),
        ]);
        let n = normalizer();
        let first = serde_json::to_vec(&n.normalize(&raw).unwrap()).unwrap();
        let second = serde_json::to_vec(&n.normalize(&raw).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ad_content_option() {
        let raw = hit(&[("t", "pageview"), ("cn", "spring"), ("cc", "hero")]);

        let normalized = normalizer().normalize(&raw).unwrap();
        assert_eq!(normalized.traffic_source.ad_content.as_deref(), Some("spring"));

        let corrected = HitNormalizer::new(
            Arc::new(FakeUserAgentParser),
            NormalizerOptions {
                ad_content_fallback: AdContentFallback::AdContent,
            },
        );
        let normalized = corrected.normalize(&raw).unwrap();
        assert_eq!(normalized.traffic_source.ad_content.as_deref(), Some("hero"));
    }
}
