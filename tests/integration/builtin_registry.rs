use serde_json::json;
use specvs_app::{
    CompareRequest, CompareUseCase, TableRequest, TableUseCase, render_pairwise_markdown,
    render_registry,
};
use specvs_config::{Overrides, builtin_registry_file, load_registry};
use specvs_domain::Registry;
use specvs_types::{Product, SkipReason};
use std::io::Write;

fn builtin() -> Registry {
    load_registry(None, &Overrides::default()).expect("built-in registry")
}

fn product(id: &str, specs: serde_json::Value) -> Product {
    Product {
        id: id.to_string(),
        name: id.to_uppercase(),
        category: "escooter".to_string(),
        specs: specs.as_object().cloned().expect("object"),
    }
}

#[test]
fn every_builtin_function_name_resolves() {
    let file = builtin_registry_file().expect("parse");
    let normalizers: Vec<&str> = specvs_normalize::names().collect();
    let formatters: Vec<&str> = specvs_normalize::display::names().collect();

    for attr in &file.attributes {
        if let Some(n) = &attr.normalizer {
            assert!(normalizers.contains(&n.as_str()), "{}: {n}", attr.key);
        }
        if let Some(d) = &attr.display_formatter {
            assert!(formatters.contains(&d.as_str()), "{}: {d}", attr.key);
        }
    }
}

/// Tested figures win over claimed ones; claimed figures only stand in.
#[test]
fn tested_figures_suppress_claimed_fallbacks() {
    let registry = builtin();
    let a = product(
        "a",
        json!({ "performance": { "tested_top_speed": 24, "top_speed": 30 } }),
    );
    let b = product(
        "b",
        json!({ "performance": { "tested_top_speed": 20, "top_speed": 20 } }),
    );
    let report = CompareUseCase::execute(CompareRequest {
        registry: &registry,
        a,
        b,
    })
    .expect("compare");

    assert_eq!(report.advantages[0][0].headline, "4 mph faster top speed");
    assert_eq!(
        report.skipped.get("performance.top_speed"),
        Some(&SkipReason::FallbackSuppressed)
    );
}

#[test]
fn feature_lists_name_unique_features() {
    let registry = builtin();
    let a = product(
        "a",
        json!({ "features": { "list": ["App", "NFC", "Turn signals", "Horn", "Alarm", "USB"] } }),
    );
    let b = product("b", json!({ "features": { "list": ["app", "Horn"] } }));
    let report = CompareUseCase::execute(CompareRequest {
        registry: &registry,
        a,
        b,
    })
    .expect("compare");

    let adv = &report.advantages[0][0];
    assert_eq!(adv.headline, "4 more features");
    assert_eq!(
        adv.comparison.as_deref(),
        Some("Adds NFC, Turn signals, Alarm, USB")
    );
}

#[test]
fn split_portability_is_reported_on_both_sides() {
    let registry = builtin();
    let a = product(
        "a",
        json!({ "dimensions": { "weight": 30, "folded_length": 50, "folded_width": 24 } }),
    );
    let b = product(
        "b",
        json!({ "dimensions": { "weight": 45, "folded_length": 40, "folded_width": 18 } }),
    );
    let report = CompareUseCase::execute(CompareRequest {
        registry: &registry,
        a,
        b,
    })
    .expect("compare");

    let outcome = &report.composites["portability"];
    assert!(outcome.is_close);
    assert!(outcome.consolidated.is_none());
    assert_eq!(report.advantages[0][0].headline, "15 lbs lighter");
    assert_eq!(report.advantages[1][0].headline, "Smaller folded footprint");
}

#[test]
fn builtin_table_and_markdown() {
    let registry = builtin();
    let products = vec![
        product("a", json!({ "dimensions": { "weight": 30 }, "ip_rating": "IP54" })),
        product("b", json!({ "dimensions": { "weight": 45 }, "ip_rating": "IPX4" })),
    ];
    let table = TableUseCase::execute(TableRequest {
        registry: &registry,
        products: products.clone(),
    })
    .expect("table");
    let weight = table
        .rows
        .iter()
        .find(|r| r.key == "dimensions.weight")
        .expect("weight row");
    assert!(weight.cells[0].winner);
    assert_eq!(weight.cells[1].display, "45 lbs");

    let report = CompareUseCase::execute(CompareRequest {
        registry: &registry,
        a: products[0].clone(),
        b: products[1].clone(),
    })
    .expect("compare");
    let md = render_pairwise_markdown(&report);
    assert!(md.contains("### Where A wins"));
    assert!(md.contains("- **15 lbs lighter**: 30 lbs vs 45 lbs"));
}

#[test]
fn registry_file_with_gap_renders_listing() {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        f,
        r#"
[[attribute]]
key = "brakes.maintenance"
label = "brakes"
ranking = ["disc", "drum"]
display_formatter = "brake_pictogram"
"#
    )
    .expect("write");

    let registry = load_registry(Some(f.path()), &Overrides::default()).expect("load");
    let listing = render_registry(&registry);
    assert!(listing.contains("unknown display formatter `brake_pictogram`"));
    assert!(listing.contains("ranking: disc < drum"));
}
