use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use specvs_app::{
    CompareRequest, CompareUseCase, TableRequest, TableUseCase, render_pairwise_markdown,
    render_registry, render_table_markdown,
};
use specvs_config::{Overrides, load_registry};
use specvs_domain::Registry;
use specvs_types::{PAIRWISE_SCHEMA_V1, PairwiseReport, Product, TABLE_SCHEMA_V1, TableReport};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "specvs",
    version,
    about = "Head-to-head product spec comparisons and advantage lists"
)]
struct Cli {
    /// Log at debug level unless SPECVS_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Args)]
struct RegistryArgs {
    /// Registry TOML file (defaults to the built-in scooter registry)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Override the per-product advantage cap
    #[arg(long)]
    max_advantages: Option<usize>,

    /// Override the relative significance threshold (percent)
    #[arg(long)]
    threshold: Option<f64>,
}

impl RegistryArgs {
    fn load(&self) -> anyhow::Result<Registry> {
        let overrides = Overrides {
            max_advantages_per_product: self.max_advantages,
            percentage_threshold: self.threshold,
        };
        load_registry(self.registry.as_deref(), &overrides)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare two products and emit a pairwise report (JSON).
    Compare {
        /// First product (JSON)
        #[arg(long)]
        a: PathBuf,

        /// Second product (JSON)
        #[arg(long)]
        b: PathBuf,

        #[command(flatten)]
        registry: RegistryArgs,

        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Build a comparison table with per-row winners (JSON).
    Table {
        /// Product file (JSON). Repeatable; column order follows argument order.
        #[arg(long = "product", required = true)]
        products: Vec<PathBuf>,

        #[command(flatten)]
        registry: RegistryArgs,

        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Render a pairwise or table report as Markdown.
    Md {
        /// Report JSON produced by `compare` or `table`
        #[arg(long)]
        report: PathBuf,

        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the resolved evaluation order and any configuration gaps.
    Registry {
        #[command(flatten)]
        registry: RegistryArgs,
    },
}

fn main() -> ExitCode {
    if let Err(err) = real_main() {
        eprintln!("{err:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Compare {
            a,
            b,
            registry,
            out,
            pretty,
        } => {
            let registry = registry.load()?;
            let a: Product = read_product(&a)?;
            let b: Product = read_product(&b)?;

            let report = CompareUseCase::execute(CompareRequest {
                registry: &registry,
                a,
                b,
            })?;
            emit_json(out.as_deref(), &report, pretty)
        }

        Command::Table {
            products,
            registry,
            out,
            pretty,
        } => {
            let registry = registry.load()?;
            let products = products
                .iter()
                .map(|p| read_product(p))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let table = TableUseCase::execute(TableRequest {
                registry: &registry,
                products,
            })?;
            emit_json(out.as_deref(), &table, pretty)
        }

        Command::Md { report, out } => {
            let value: serde_json::Value = read_json(&report)?;
            let md = match value.get("schema").and_then(|s| s.as_str()) {
                Some(PAIRWISE_SCHEMA_V1) => {
                    let r: PairwiseReport = serde_json::from_value(value)
                        .with_context(|| format!("parse pairwise report {}", report.display()))?;
                    render_pairwise_markdown(&r)
                }
                Some(TABLE_SCHEMA_V1) => {
                    let r: TableReport = serde_json::from_value(value)
                        .with_context(|| format!("parse table report {}", report.display()))?;
                    render_table_markdown(&r)
                }
                Some(other) => anyhow::bail!("unsupported report schema {other:?}"),
                None => anyhow::bail!("{} has no schema field", report.display()),
            };

            match out {
                Some(path) => atomic_write(&path, md.as_bytes())?,
                None => print!("{md}"),
            }
            Ok(())
        }

        Command::Registry { registry } => {
            let registry = registry.load()?;
            print!("{}", render_registry(&registry));
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SPECVS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_product(path: &Path) -> anyhow::Result<Product> {
    let product: Product = read_json(path)?;
    info!(path = %path.display(), id = %product.id, specs = product.specs.len(), "loaded product");
    Ok(product)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let v =
        serde_json::from_slice(&bytes).with_context(|| format!("parse json {}", path.display()))?;
    Ok(v)
}

fn emit_json<T: serde::Serialize>(
    out: Option<&Path>,
    value: &T,
    pretty: bool,
) -> anyhow::Result<()> {
    match out {
        Some(path) => write_json(path, value, pretty),
        None => {
            let text = if pretty {
                serde_json::to_string_pretty(value)?
            } else {
                serde_json::to_string(value)?
            };
            println!("{text}");
            Ok(())
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T, pretty: bool) -> anyhow::Result<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };

    atomic_write(path, &bytes)
}

fn atomic_write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    use std::io::Write;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            fs::create_dir_all(p).with_context(|| format!("create dir {}", p.display()))?;
            p
        }
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("not a file path: {}", path.display()))?;
    let tmp = parent.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    {
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("create temp {}", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write temp {}", tmp.display()))?;
        f.sync_all().ok();
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
