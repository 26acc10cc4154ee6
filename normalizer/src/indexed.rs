//! Extraction of indexed families: hit-level and per-product custom
//! dimensions and metrics.
//!
//! Output order follows the input order but carries no meaning. Duplicate
//! indices are not collapsed.

use crate::hit::IndexedValue;
use crate::keys::{Index, ParamKey, ProductField};
use crate::raw_hit::RawHit;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexedFamily {
    CustomDimension,
    CustomMetric,
}

impl IndexedFamily {
    /// Index of `key` when it is a hit-level member of this family
    fn hit_index(&self, key: ParamKey) -> Option<Index> {
        match (self, key) {
            (IndexedFamily::CustomDimension, ParamKey::CustomDimension(i)) => Some(i),
            (IndexedFamily::CustomMetric, ParamKey::CustomMetric(i)) => Some(i),
            _ => None,
        }
    }

    fn product_index(&self, field: ProductField) -> Option<Index> {
        match (self, field) {
            (IndexedFamily::CustomDimension, ProductField::CustomDimension(i)) => Some(i),
            (IndexedFamily::CustomMetric, ProductField::CustomMetric(i)) => Some(i),
            _ => None,
        }
    }
}

fn collect<F>(hit: &RawHit, select: F) -> Vec<IndexedValue>
where
    F: Fn(ParamKey) -> Option<Index>,
{
    hit.parsed_keys()
        .filter_map(|(key, value)| {
            select(key).map(|index| IndexedValue {
                index: index.value(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Hit-level members of `family` (`cd<N>` or `cm<N>`)
pub fn extract(hit: &RawHit, family: IndexedFamily) -> Vec<IndexedValue> {
    collect(hit, |key| family.hit_index(key))
}

/// Members of `family` attached to product `product_index`.
///
/// Matches on the product index alone, so `pr1cd2` and `il3pi1cd2` both
/// belong to product 1 in either namespace. The index must be spelled the
/// same way: `pr01cd2` belongs to `pr01id`, not to `pr1id`.
pub fn extract_for_product(
    hit: &RawHit,
    family: IndexedFamily,
    product_index: Index,
) -> Vec<IndexedValue> {
    collect(hit, |key| match key {
        ParamKey::Product { index, field } | ParamKey::Impression { index, field, .. }
            if index == product_index =>
        {
            family.product_index(field)
        }
        _ => None,
    })
}
