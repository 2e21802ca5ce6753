//! Application layer for specvs.
//!
//! The app layer coordinates the registry and domain logic.
//! It does not parse CLI flags and it does not do filesystem I/O.

pub mod markdown;

pub use markdown::{render_pairwise_markdown, render_registry, render_table_markdown};
pub use specvs_domain::{Notes, notes_for};

use specvs_domain::{Registry, build_table, compare_pair};
use specvs_types::{PairwiseReport, Product, TableReport};
use std::collections::BTreeSet;
use tracing::{info, warn};

fn validate_product(product: &Product) -> anyhow::Result<()> {
    if product.id.trim().is_empty() {
        anyhow::bail!("product {:?} has an empty id", product.name);
    }
    Ok(())
}

fn warn_mixed_categories<'a>(products: impl IntoIterator<Item = &'a Product>) {
    let categories: BTreeSet<&str> = products
        .into_iter()
        .map(|p| p.category.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    if categories.len() > 1 {
        warn!(?categories, "comparing products from different categories");
    }
}

#[derive(Debug, Clone)]
pub struct CompareRequest<'a> {
    pub registry: &'a Registry,
    pub a: Product,
    pub b: Product,
}

pub struct CompareUseCase;

impl CompareUseCase {
    pub fn execute(req: CompareRequest<'_>) -> anyhow::Result<PairwiseReport> {
        validate_product(&req.a)?;
        validate_product(&req.b)?;
        warn_mixed_categories([&req.a, &req.b]);

        let report = compare_pair(req.registry, &req.a, &req.b);
        info!(
            a = %req.a.id,
            b = %req.b.id,
            a_advantages = report.advantages[0].len(),
            b_advantages = report.advantages[1].len(),
            skipped = report.skipped.len(),
            "pairwise comparison done"
        );
        Ok(report)
    }
}

#[derive(Debug, Clone)]
pub struct TableRequest<'a> {
    pub registry: &'a Registry,
    pub products: Vec<Product>,
}

pub struct TableUseCase;

impl TableUseCase {
    pub fn execute(req: TableRequest<'_>) -> anyhow::Result<TableReport> {
        if req.products.is_empty() {
            anyhow::bail!("table needs at least one product");
        }
        let mut ids = BTreeSet::new();
        for p in &req.products {
            validate_product(p)?;
            if !ids.insert(p.id.as_str()) {
                warn!(id = %p.id, "product listed more than once");
            }
        }
        warn_mixed_categories(&req.products);

        let table = build_table(req.registry, &req.products);
        info!(
            products = table.products.len(),
            rows = table.rows.len(),
            "comparison table built"
        );
        Ok(table)
    }
}
