//! Markdown renderers for reports and registries.

use specvs_domain::{ComparisonMode, GapKind, Registry};
use specvs_types::{Advantage, PairwiseReport, TableReport};
use std::fmt::Write as _;

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

fn advantage_line(adv: &Advantage) -> String {
    match &adv.comparison {
        Some(c) => format!("- **{}**: {}\n", adv.headline, c),
        None => format!("- **{}**\n", adv.headline),
    }
}

/// Two bullet lists, one per product, in advantage order.
pub fn render_pairwise_markdown(report: &PairwiseReport) -> String {
    let mut out = String::new();
    let [a, b] = &report.products;
    out.push_str(&format!("## {} vs {}\n", a.name, b.name));

    for (product, advantages) in report.products.iter().zip(&report.advantages) {
        out.push_str(&format!("\n### Where {} wins\n\n", product.name));
        if advantages.is_empty() {
            out.push_str("_No clear advantages._\n");
            continue;
        }
        for adv in advantages {
            out.push_str(&advantage_line(adv));
        }
    }

    let close: Vec<&str> = report
        .composites
        .iter()
        .filter(|(_, outcome)| outcome.is_close)
        .map(|(key, _)| key.as_str())
        .collect();
    if !close.is_empty() {
        out.push_str(&format!("\n**Too close to call:** {}\n", close.join(", ")));
    }

    out
}

/// Comparison table; winning cells are bold.
pub fn render_table_markdown(report: &TableReport) -> String {
    let mut out = String::new();

    out.push_str("| spec |");
    for p in &report.products {
        out.push_str(&format!(" {} |", escape_cell(&p.name)));
    }
    out.push('\n');
    out.push_str("|---|");
    for _ in &report.products {
        out.push_str("---|");
    }
    out.push('\n');

    for row in &report.rows {
        out.push_str(&format!("| {} |", escape_cell(&row.label)));
        for cell in &row.cells {
            let text = escape_cell(&cell.display);
            if cell.winner {
                out.push_str(&format!(" **{text}** |"));
            } else {
                out.push_str(&format!(" {text} |"));
            }
        }
        out.push('\n');
    }

    out
}

/// Evaluation order, comparison modes and configuration gaps.
pub fn render_registry(registry: &Registry) -> String {
    let mut out = String::new();
    let settings = registry.settings();
    let _ = writeln!(
        out,
        "max advantages per product: {}, relative threshold: {}%\n",
        settings.max_advantages_per_product, settings.percentage_threshold
    );

    out.push_str("| # | key | label | mode | priority |\n");
    out.push_str("|---:|---|---|---|---:|\n");
    for (i, def) in registry.iter().enumerate() {
        let mode = match (&def.composite, &def.mode) {
            (Some(c), _) => format!("composite ({})", c.children.join(", ")),
            (None, ComparisonMode::Numeric(dir)) => format!("numeric, {dir:?}").to_lowercase(),
            (None, ComparisonMode::Ranking(r)) => format!("ranking: {}", r.join(" < ")),
            (None, ComparisonMode::Unranked) => "display only".to_string(),
        };
        let _ = writeln!(
            out,
            "| {} | `{}` | {} | {} | {} |",
            i + 1,
            def.key,
            escape_cell(&def.label),
            escape_cell(&mode),
            def.priority
        );
    }

    if !registry.gaps().is_empty() {
        out.push_str("\n**Configuration gaps** (raw values are used):\n");
        for gap in registry.gaps() {
            let kind = match gap.kind {
                GapKind::Normalizer => "normalizer",
                GapKind::DisplayFormatter => "display formatter",
            };
            let _ = writeln!(out, "- `{}`: unknown {kind} `{}`", gap.key, gap.name);
        }
    }

    out
}
