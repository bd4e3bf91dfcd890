use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use stacdag_resolve::{FsCatalogSource, ResolvedItemMap, ResolverConfig, TreeResolver};
use stacdag_store::{BlockStore, FsBlockStore, InMemoryBlockStore};
use tracing::info;

use crate::cli::{Cli, OutputFormat};

/// Outcome of a conversion, as printed by `--format json`.
#[derive(Debug, Serialize)]
pub struct Summary {
    /// Cids of the documents at the top of the catalog.
    pub root: ResolvedItemMap,
    /// Documents addressed. Identical documents share one block.
    pub blocks: usize,
    pub directories: usize,
    /// `None` for dry runs.
    pub out_dir: Option<PathBuf>,
}

/// Block sink for the run: the output directory, or memory for dry runs.
fn open_store(cli: &Cli) -> anyhow::Result<Arc<dyn BlockStore>> {
    if cli.dry_run {
        return Ok(Arc::new(InMemoryBlockStore::new()));
    }
    let store = FsBlockStore::new(cli.out_dir.clone())
        .with_context(|| format!("cannot open output directory {}", cli.out_dir.display()))?;
    Ok(Arc::new(store))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let summary = convert(&cli).await?;
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary(&cli, &summary),
    }
    Ok(())
}

/// Resolve the catalog named on the command line into blocks.
pub async fn convert(cli: &Cli) -> anyhow::Result<Summary> {
    let config = load_config(cli)?;
    let store = open_store(cli)?;
    info!(
        stac_dir = %cli.stac_dir.display(),
        dry_run = cli.dry_run,
        ?config,
        "converting catalog"
    );

    let resolver = TreeResolver::with_store(FsCatalogSource, store, config);
    let resolution = resolver
        .resolve_with_report(&cli.stac_dir)
        .await
        .with_context(|| format!("failed to convert {}", cli.stac_dir.display()))?;

    Ok(Summary {
        root: resolution.items,
        blocks: resolution.stats.documents,
        directories: resolution.stats.directories,
        out_dir: (!cli.dry_run).then(|| cli.out_dir.clone()),
    })
}

fn load_config(cli: &Cli) -> anyhow::Result<ResolverConfig> {
    let mut config = match &cli.config {
        Some(path) => ResolverConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ResolverConfig::default(),
    };
    if let Some(jobs) = cli.jobs {
        config.max_concurrent_directories = jobs;
        config.validate().context("invalid --jobs")?;
    }
    Ok(config)
}

fn print_summary(cli: &Cli, summary: &Summary) {
    println!(
        "{} Converted {} ({} directories, {} blocks)",
        "✓".green().bold(),
        cli.stac_dir.display().to_string().bold(),
        summary.directories,
        summary.blocks
    );
    for (name, cid) in &summary.root {
        println!("  {}  {}", name.yellow(), cid.to_string().cyan());
    }
    match &summary.out_dir {
        Some(dir) => println!("  Blocks: {}", dir.display()),
        None => println!("  {}", "dry run: no blocks written".dimmed()),
    }
}
