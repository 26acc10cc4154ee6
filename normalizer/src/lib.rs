//! Normalization of Measurement Protocol hits into nested, typed rows.
//!
//! A hit arrives as a flat map of short parameter names (`t`, `cd1`,
//! `il2pi1id`, ...) plus a few collector enrichment fields, and leaves as a
//! `NormalizedHit` ready to be appended to a columnar table.

pub mod assembler;
pub mod coerce;
pub mod ecommerce;
pub mod errors;
pub mod hit;
pub mod indexed;
pub mod keys;
pub mod product;
pub mod promotion;
pub mod raw_hit;
pub mod traffic_source;
pub mod user_agent;

pub use assembler::{HitNormalizer, NormalizerOptions};
pub use errors::{NormalizationError, Result, UserAgentError};
pub use hit::NormalizedHit;
pub use raw_hit::RawHit;
pub use traffic_source::AdContentFallback;
pub use user_agent::{NoopUserAgentParser, UapUserAgentParser, UserAgentParser};
