//! Brake maintenance category.

use crate::path::{as_text, resolve_sibling};
use specvs_types::{Normalized, SpecMap};

pub const DISC: &str = "disc";
pub const FOOT: &str = "foot";
pub const ELECTRONIC: &str = "electronic";
pub const DRUM: &str = "drum";

/// Worst to best for upkeep: discs need the most attention, drums the least.
pub const MAINTENANCE_RANKING: [&str; 4] = [DISC, FOOT, ELECTRONIC, DRUM];

/// Classify one brake description.
///
/// Checked in order: `drum`, `disc|hydraulic|mechanical`, `electronic|regen*`,
/// `foot` or empty. Anything else is assumed to be a disc.
pub fn classify(text: &str) -> &'static str {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        FOOT
    } else if t.contains("drum") {
        DRUM
    } else if t.contains("disc") || t.contains("hydraulic") || t.contains("mechanical") {
        DISC
    } else if t.contains("electronic") || t.contains("regen") {
        ELECTRONIC
    } else if t.contains("foot") {
        FOOT
    } else {
        DISC
    }
}

fn rank(category: &str) -> usize {
    MAINTENANCE_RANKING
        .iter()
        .position(|c| *c == category)
        .unwrap_or(0)
}

/// Document normalizer over the `front` and `rear` siblings of `key`.
///
/// Returns the worse of the two axles. A missing axle reads as empty (foot brake).
pub fn maintenance(specs: &SpecMap, key: &str) -> Option<Normalized> {
    let front = resolve_sibling(specs, key, "front");
    let rear = resolve_sibling(specs, key, "rear");
    if front.is_none() && rear.is_none() {
        return None;
    }

    let text = |v: Option<&serde_json::Value>| v.and_then(as_text).unwrap_or_default();
    let f = classify(&text(front));
    let r = classify(&text(rear));
    let worse = if rank(f) <= rank(r) { f } else { r };
    Some(Normalized::Category(worse.to_string()))
}
