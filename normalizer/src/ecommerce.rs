use crate::coerce::parse_integer;
use crate::errors::Result;
use crate::hit::{EcommerceAction, EcommerceActionType};
use crate::raw_hit::RawHit;

/// Maps `pa` with its checkout step (`cos`) and option (`col`).
///
/// Absent when there is no action code. An unknown code keeps its name with
/// no action type.
pub fn ecommerce_action(hit: &RawHit) -> Result<Option<EcommerceAction>> {
    let Some(code) = hit.non_empty("pa") else {
        return Ok(None);
    };

    Ok(Some(EcommerceAction {
        action_type: EcommerceActionType::from_code(code),
        name: code.to_string(),
        step: parse_integer(hit, "cos")?,
        option: hit.get("col").map(str::to_string),
    }))
}
