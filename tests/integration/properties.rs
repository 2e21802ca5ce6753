use proptest::prelude::*;
use serde_json::json;
use specvs_config::{Overrides, load_registry};
use specvs_domain::{Registry, compare_pair};
use specvs_types::Product;
use std::sync::OnceLock;

fn builtin() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| load_registry(None, &Overrides::default()).expect("built-in registry"))
}

fn scooter(id: &str, speed: u32, weight: u32, range: u32, ip: &str) -> Product {
    Product {
        id: id.to_string(),
        name: id.to_string(),
        category: "escooter".to_string(),
        specs: json!({
            "performance": { "top_speed": speed, "claimed_range": range },
            "dimensions": { "weight": weight },
            "ip_rating": ip,
        })
        .as_object()
        .cloned()
        .unwrap_or_default(),
    }
}

fn arb_scooter(id: &'static str) -> impl Strategy<Value = Product> {
    (
        10u32..40,
        20u32..90,
        5u32..60,
        prop::sample::select(vec!["", "IPX4", "IP54", "IPX5", "IP55", "IP67"]),
    )
        .prop_map(move |(s, w, r, ip)| scooter(id, s, w, r, ip))
}

proptest! {
    /// Property: swapping the products swaps the advantage lists.
    #[test]
    fn swapping_products_mirrors_report(a in arb_scooter("a"), b in arb_scooter("b")) {
        let forward = compare_pair(builtin(), &a, &b);
        let backward = compare_pair(builtin(), &b, &a);

        for side in 0..2 {
            let f: Vec<&str> = forward.advantages[side].iter().map(|x| x.headline.as_str()).collect();
            let r: Vec<&str> = backward.advantages[1 - side].iter().map(|x| x.headline.as_str()).collect();
            prop_assert_eq!(f, r);
        }
        prop_assert_eq!(forward.skipped, backward.skipped);
    }

    /// Property: no attribute key shows up twice across both lists.
    #[test]
    fn each_key_advantages_once(a in arb_scooter("a"), b in arb_scooter("b")) {
        let report = compare_pair(builtin(), &a, &b);
        let mut keys: Vec<&str> = report.advantages.iter().flatten().map(|x| x.spec_key.as_str()).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(keys.len(), total);
    }
}
