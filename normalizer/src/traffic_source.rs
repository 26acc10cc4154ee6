//! Traffic source attribution.
//!
//! When the landing page URL (`dl`) carries `utm_source`, URL UTM parameters
//! win field by field and hit-level campaign parameters fill the gaps.
//! Without `utm_source` only the hit-level parameters are used.
//!
//! | field        | URL           | hit      |
//! |--------------|---------------|----------|
//! | campaign     | utm_campaign  | cn       |
//! | campaignCode | utm_id        | ci       |
//! | source       | utm_source    | cs       |
//! | medium       | utm_medium    | cm       |
//! | keyword      | utm_keyword   | ck       |
//! | adContent    | utm_content   | cc       |
//! | gclId        | gclid         | gclid    |
//! | dclId        | dclid         | dclid    |
//! | gclSrc       | gclsrc        | gclsrc   |

use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

use crate::hit::TrafficSource;
use crate::raw_hit::RawHit;

/// Where `adContent` comes from when the landing page has no `utm_source`.
///
/// Existing tables were filled from the campaign name (`cn`), so that stays
/// the default.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdContentFallback {
    #[default]
    CampaignName,
    AdContent,
}

impl AdContentFallback {
    fn key(&self) -> &'static str {
        match self {
            AdContentFallback::CampaignName => "cn",
            AdContentFallback::AdContent => "cc",
        }
    }
}

/// Non-empty query parameters of the landing page, last value wins
fn landing_params(landing_page: Option<&Url>) -> HashMap<String, String> {
    landing_page
        .map(|url| {
            url.query_pairs()
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

/// `dr` when non-empty, else the referrer the collector captured
pub fn referrer(hit: &RawHit) -> Option<String> {
    hit.non_empty("dr")
        .or_else(|| hit.get("referrer"))
        .map(str::to_string)
}

pub fn resolve_traffic_source(
    hit: &RawHit,
    landing_page: Option<&Url>,
    ad_content_fallback: AdContentFallback,
) -> TrafficSource {
    let params = landing_params(landing_page);
    let from_hit = |key: &str| hit.get(key).map(str::to_string);

    if !params.contains_key("utm_source") {
        return TrafficSource {
            campaign: from_hit("cn"),
            campaign_code: from_hit("ci"),
            source: from_hit("cs"),
            medium: from_hit("cm"),
            keyword: from_hit("ck"),
            ad_content: from_hit(ad_content_fallback.key()),
            gcl_id: from_hit("gclid"),
            dcl_id: from_hit("dclid"),
            referrer: referrer(hit),
            gcl_src: from_hit("gclsrc"),
        };
    }

    let prefer_url = |url_key: &str, hit_key: &str| {
        params
            .get(url_key)
            .cloned()
            .or_else(|| from_hit(hit_key))
    };

    TrafficSource {
        campaign: prefer_url("utm_campaign", "cn"),
        campaign_code: prefer_url("utm_id", "ci"),
        source: prefer_url("utm_source", "cs"),
        medium: prefer_url("utm_medium", "cm"),
        keyword: prefer_url("utm_keyword", "ck"),
        ad_content: prefer_url("utm_content", "cc"),
        gcl_id: prefer_url("gclid", "gclid"),
        dcl_id: prefer_url("dclid", "dclid"),
        referrer: referrer(hit),
        gcl_src: prefer_url("gclsrc", "gclsrc"),
    }
}
