//! Suspension score from free-text descriptors.

use crate::path::string_list;
use serde_json::Value;
use specvs_types::Normalized;

const HYDRAULIC: f64 = 15.0;
const SPRING: f64 = 10.0;
const RUBBER: f64 = 7.0;

/// Upper bound: hydraulic front and rear.
pub const MAX_SCORE: f64 = 2.0 * HYDRAULIC;

fn points(desc: &str) -> f64 {
    if desc.contains("hydraulic") {
        HYDRAULIC
    } else if desc.contains("spring") || desc.contains("fork") {
        SPRING
    } else if desc.contains("rubber") {
        RUBBER
    } else {
        0.0
    }
}

/// Score 0..=30 over a list of descriptors such as `["Front hydraulic", "Rear spring"]`.
///
/// Each axle keeps its best descriptor. `dual` counts for both axles, a fork
/// is a front part, and a descriptor naming no axle counts for the front.
pub fn score(descriptors: &[String]) -> f64 {
    let mut front: f64 = 0.0;
    let mut rear: f64 = 0.0;

    for desc in descriptors {
        let d = desc.trim().to_lowercase();
        if d.is_empty() || d == "none" {
            continue;
        }
        let pts = points(&d);
        let dual = d.contains("dual") || d.contains("both");
        let mut on_front = dual || d.contains("front") || d.contains("fork");
        let on_rear = dual || d.contains("rear");
        if !on_front && !on_rear {
            on_front = true;
        }
        if on_front {
            front = front.max(pts);
        }
        if on_rear {
            rear = rear.max(pts);
        }
    }

    front + rear
}

/// Value normalizer: lists, bare strings and anything else (scored 0).
pub fn normalize(value: &Value) -> Option<Normalized> {
    Some(Normalized::Number(score(&string_list(value))))
}
