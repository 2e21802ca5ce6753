use anyhow::Context;
use clap::{Parser, Subcommand};
use schemars::schema_for;
use specvs_types::{PAIRWISE_SCHEMA_V1, TABLE_SCHEMA_V1};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Repo automation for specvs")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// (Re)generate JSON Schemas for products, reports and registries.
    Schema {
        /// Output directory
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },

    /// Validate JSON documents and the built-in registry against the schemas.
    Validate {
        /// Glob of product or report JSON files
        #[arg(long, default_value = "crates/specvs-cli/tests/fixtures/*.json")]
        pattern: String,
    },

    /// Run the "usual" repo checks (fmt, clippy, test, schema, validate).
    Ci,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Schema { out_dir } => cmd_schema(&out_dir),
        Command::Validate { pattern } => cmd_validate(&pattern),
        Command::Ci => cmd_ci(),
    }
}

fn cmd_ci() -> anyhow::Result<()> {
    run("cargo", ["fmt", "--all", "--", "--check"])?;
    run(
        "cargo",
        ["clippy", "--all-targets", "--all-features", "--", "-D", "warnings"],
    )?;
    run("cargo", ["test", "--all"])?;
    run("cargo", ["run", "-p", "xtask", "--", "schema"])?;
    run("cargo", ["run", "-p", "xtask", "--", "validate"])?;
    Ok(())
}

fn run<const N: usize>(bin: &str, args: [&str; N]) -> anyhow::Result<()> {
    let status = std::process::Command::new(bin)
        .args(args)
        .status()
        .with_context(|| format!("running {bin}"))?;
    if !status.success() {
        anyhow::bail!("{bin} failed: {status}");
    }
    Ok(())
}

fn cmd_schema(out_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create dir {}", out_dir.display()))?;

    write_schema(
        out_dir,
        "specvs.product.v1.schema.json",
        schema_for!(specvs_types::Product),
    )?;
    write_schema(
        out_dir,
        &format!("{PAIRWISE_SCHEMA_V1}.schema.json"),
        schema_for!(specvs_types::PairwiseReport),
    )?;
    write_schema(
        out_dir,
        &format!("{TABLE_SCHEMA_V1}.schema.json"),
        schema_for!(specvs_types::TableReport),
    )?;
    write_schema(
        out_dir,
        "specvs.registry.v1.schema.json",
        schema_for!(specvs_types::RegistryFile),
    )?;

    Ok(())
}

fn write_schema<T: serde::Serialize>(out_dir: &Path, name: &str, schema: T) -> anyhow::Result<()> {
    let path = out_dir.join(name);
    let json = serde_json::to_vec_pretty(&schema)?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn check(
    schema: schemars::Schema,
    instance: &serde_json::Value,
    what: &str,
) -> anyhow::Result<Vec<String>> {
    let schema = serde_json::to_value(schema)?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| anyhow::anyhow!("compile schema for {what}: {e}"))?;
    Ok(validator
        .iter_errors(instance)
        .map(|e| format!("{what}: {e} at {}", e.instance_path))
        .collect())
}

fn cmd_validate(pattern: &str) -> anyhow::Result<()> {
    let mut problems = Vec::new();
    let mut checked = 0usize;

    for entry in glob::glob(pattern).with_context(|| format!("bad glob {pattern}"))? {
        let path = entry?;
        let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse json {}", path.display()))?;

        let what = path.display().to_string();
        let errors = match value.get("schema").and_then(|s| s.as_str()) {
            Some(PAIRWISE_SCHEMA_V1) => {
                check(schema_for!(specvs_types::PairwiseReport), &value, &what)?
            }
            Some(TABLE_SCHEMA_V1) => check(schema_for!(specvs_types::TableReport), &value, &what)?,
            _ => check(schema_for!(specvs_types::Product), &value, &what)?,
        };
        problems.extend(errors);
        checked += 1;
    }

    let builtin = specvs_config::builtin_registry_file().context("parse built-in registry")?;
    let builtin = serde_json::to_value(builtin)?;
    problems.extend(check(
        schema_for!(specvs_types::RegistryFile),
        &builtin,
        "built-in registry",
    )?);

    if !problems.is_empty() {
        for p in &problems {
            eprintln!("{p}");
        }
        anyhow::bail!("{} schema violation(s)", problems.len());
    }
    println!("{checked} document(s) and the built-in registry match their schemas");
    Ok(())
}
