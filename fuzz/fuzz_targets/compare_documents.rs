//! Arbitrary JSON spec documents through the built-in registry.
//!
//! Pairwise comparison, the table and Markdown rendering must all accept
//! whatever shape the documents have.

#![no_main]

use libfuzzer_sys::fuzz_target;
use specvs_types::{Product, SpecMap};

fn product(id: &str, specs: SpecMap) -> Product {
    Product {
        id: id.to_string(),
        name: id.to_string(),
        category: "escooter".to_string(),
        specs,
    }
}

fuzz_target!(|input: (&str, &str)| {
    let parse = |s: &str| serde_json::from_str::<SpecMap>(s).unwrap_or_default();
    let Ok(file) = specvs_config::builtin_registry_file() else {
        return;
    };
    let Ok(registry) = specvs_domain::Registry::from_file(file) else {
        return;
    };

    let a = product("a", parse(input.0));
    let b = product("b", parse(input.1));

    let report = specvs_domain::compare_pair(&registry, &a, &b);
    let _ = specvs_app::render_pairwise_markdown(&report);

    let table = specvs_domain::build_table(&registry, &[a, b]);
    let _ = specvs_app::render_table_markdown(&table);
});
