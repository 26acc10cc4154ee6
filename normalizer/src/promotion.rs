use crate::hit::{Promotion, PromotionAction};
use crate::keys::{Index, ParamKey, PromotionField};
use crate::raw_hit::RawHit;

fn promotion_indices(hit: &RawHit) -> impl Iterator<Item = Index> + '_ {
    hit.parsed_keys().filter_map(|(key, _)| match key {
        ParamKey::Promotion {
            index,
            field: PromotionField::Id,
        } => Some(index),
        _ => None,
    })
}

/// One promotion per `promo<N>id` key. Siblings without an id are ignored.
pub fn extract_promotions(hit: &RawHit) -> Vec<Promotion> {
    let lookup = |index: Index, field: PromotionField| {
        hit.get_key(ParamKey::Promotion { index, field })
            .map(str::to_string)
    };

    promotion_indices(hit)
        .map(|index| Promotion {
            promo_index: index.value(),
            promo_id: lookup(index, PromotionField::Id),
            promo_name: lookup(index, PromotionField::Name),
            promo_creative: lookup(index, PromotionField::Creative),
            promo_position: lookup(index, PromotionField::Position),
        })
        .collect()
}

/// `promoa` decides when set; otherwise any promotion implies a view.
pub fn promotion_action(hit: &RawHit) -> Option<PromotionAction> {
    match hit.non_empty("promoa") {
        Some("click") => Some(PromotionAction::CLICK),
        Some(_) => Some(PromotionAction::VIEW),
        None if promotion_indices(hit).next().is_some() => Some(PromotionAction::VIEW),
        None => None,
    }
}
