//! Tire type categories, seen through two different lenses.
//!
//! Maintenance cares about flats (tubeless beats everything), safety cares
//! about grip (any air-filled tire is equally good). The rank orders differ,
//! so the two stay separate functions.

use crate::path::{as_flag, as_text, resolve, resolve_sibling};
use specvs_types::{Normalized, SpecMap};

pub const SOLID: &str = "solid";
pub const MIXED: &str = "mixed";
pub const PNEUMATIC: &str = "pneumatic";
pub const SELF_HEALING: &str = "self_healing";
pub const TUBELESS: &str = "tubeless";

/// Worst to best for upkeep.
pub const MAINTENANCE_RANKING: [&str; 5] = [SOLID, MIXED, PNEUMATIC, SELF_HEALING, TUBELESS];

/// Worst to best for ride safety.
pub const SAFETY_RANKING: [&str; 3] = [SOLID, MIXED, PNEUMATIC];

/// Combined lowercase text of `tire_type` (at `key`) and its sibling
/// `pneumatic_type`.
fn tire_text(specs: &SpecMap, key: &str) -> Option<String> {
    let tire = resolve(specs, key).and_then(as_text);
    let pneumatic = resolve_sibling(specs, key, "pneumatic_type").and_then(as_text);
    match (tire, pneumatic) {
        (None, None) => None,
        (a, b) => Some(format!(
            "{} {}",
            a.unwrap_or_default(),
            b.unwrap_or_default()
        )),
    }
}

fn is_mixed(text: &str) -> bool {
    text.contains("mixed") || text.contains("semi")
}

fn is_solid(text: &str) -> bool {
    text.contains("solid") || text.contains("honeycomb") || text.contains("airless")
}

fn is_self_healing(text: &str) -> bool {
    text.contains("self-healing") || text.contains("self healing")
}

fn is_air_filled(text: &str) -> bool {
    text.contains("pneumatic") || text.contains("tube") || text.contains("air")
}

/// Maintenance lens: tubeless > self-healing > pneumatic > mixed > solid.
///
/// Keyword order: `tubeless`, then `mixed|semi`, then `solid|honeycomb|airless`,
/// then `self-healing` in the text or the `self_healing` flag, then
/// `pneumatic|tube|air`.
pub fn maintenance(specs: &SpecMap, key: &str) -> Option<Normalized> {
    let text = tire_text(specs, key)?;
    let self_healing = is_self_healing(&text)
        || resolve_sibling(specs, key, "self_healing").is_some_and(as_flag);

    let category = if text.contains("tubeless") {
        TUBELESS
    } else if is_mixed(&text) {
        MIXED
    } else if is_solid(&text) {
        SOLID
    } else if self_healing {
        SELF_HEALING
    } else if is_air_filled(&text) {
        PNEUMATIC
    } else {
        return None;
    };
    Some(Normalized::Category(category.to_string()))
}

/// Safety lens: pneumatic (tubed or tubeless) > mixed > solid.
pub fn safety(specs: &SpecMap, key: &str) -> Option<Normalized> {
    let text = tire_text(specs, key)?;

    let category = if is_mixed(&text) {
        MIXED
    } else if is_solid(&text) {
        SOLID
    } else if text.contains("tubeless") || is_air_filled(&text) {
        PNEUMATIC
    } else {
        return None;
    };
    Some(Normalized::Category(category.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wheels(v: serde_json::Value) -> SpecMap {
        json!({ "wheels": v }).as_object().cloned().unwrap()
    }

    fn cat(n: Option<Normalized>) -> Option<String> {
        n.and_then(|n| n.as_category().map(str::to_string))
    }

    #[test]
    fn tubeless_tops_maintenance() {
        let s = wheels(json!({ "tire_type": "Pneumatic", "pneumatic_type": "Tubeless" }));
        assert_eq!(cat(maintenance(&s, "wheels.tire_type")).as_deref(), Some(TUBELESS));
    }

    #[test]
    fn self_healing_flag_upgrades_plain_pneumatic() {
        let s = wheels(json!({ "tire_type": "Pneumatic", "self_healing": true }));
        assert_eq!(
            cat(maintenance(&s, "wheels.tire_type")).as_deref(),
            Some(SELF_HEALING)
        );
    }

    #[test]
    fn self_healing_text_without_flag() {
        for text in ["Self-healing pneumatic", "self healing"] {
            let s = wheels(json!({ "tire_type": text }));
            assert_eq!(
                cat(maintenance(&s, "wheels.tire_type")).as_deref(),
                Some(SELF_HEALING),
                "{text}"
            );
        }
        let s = wheels(json!({ "tire_type": "Self-healing pneumatic" }));
        assert_eq!(cat(safety(&s, "wheels.tire_type")).as_deref(), Some(PNEUMATIC));
    }

    #[test]
    fn self_healing_does_not_upgrade_solid() {
        let s = wheels(json!({ "tire_type": "Solid", "self_healing": true }));
        assert_eq!(cat(maintenance(&s, "wheels.tire_type")).as_deref(), Some(SOLID));
    }

    #[test]
    fn semi_pneumatic_is_mixed_not_pneumatic() {
        let s = wheels(json!({ "tire_type": "Semi-pneumatic" }));
        assert_eq!(cat(maintenance(&s, "wheels.tire_type")).as_deref(), Some(MIXED));
        assert_eq!(cat(safety(&s, "wheels.tire_type")).as_deref(), Some(MIXED));
    }

    #[test]
    fn safety_lens_treats_tubed_and_tubeless_alike() {
        let tubeless = wheels(json!({ "tire_type": "Tubeless" }));
        let tubed = wheels(json!({ "tire_type": "Pneumatic", "pneumatic_type": "tubed" }));
        assert_eq!(cat(safety(&tubeless, "wheels.tire_type")).as_deref(), Some(PNEUMATIC));
        assert_eq!(cat(safety(&tubed, "wheels.tire_type")).as_deref(), Some(PNEUMATIC));
    }

    #[test]
    fn unknown_or_missing_text_is_none() {
        let s = wheels(json!({ "tire_type": "knobby" }));
        assert_eq!(maintenance(&s, "wheels.tire_type"), None);
        let empty = wheels(json!({}));
        assert_eq!(safety(&empty, "wheels.tire_type"), None);
    }
}
