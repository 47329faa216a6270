//! Runs the inventory -> website category synchronization against a snapshot file.
//!
//! `run` loads the snapshot into memory, synchronizes, and prints the summary.
//! Nothing is written back unless `--write` is given, so a plain `run` is a dry
//! run. `check` only validates a snapshot.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use category_sync::mapping::StoreSnapshot;
use category_sync::{SyncConfig, run_synchronization};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "category-sync")]
#[command(about = "Mirror the inventory category tree onto website categories")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    Run {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long = "max-depth")]
        max_depth: Option<usize>,
        /// Save the synchronized snapshot back to `--store`.
        #[arg(long)]
        write: bool,
    },
    Check {
        #[arg(long)]
        store: PathBuf,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("category-sync: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Run { store, config, max_depth, write } => {
            let config = resolve_config(config.as_deref(), max_depth)?;
            init_tracing(&config.log_level);
            run_sync(&store, &config, write)
        }
        Command::Check { store } => check(&store),
    }
}

fn resolve_config(path: Option<&Path>, max_depth: Option<usize>) -> Result<SyncConfig> {
    let mut config = match path {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SyncConfig::default(),
    };
    if let Some(depth) = max_depth {
        config = config.with_max_chain_depth(depth);
    }
    config.validate()?;
    Ok(config)
}

fn init_tracing(fallback_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_sync(path: &Path, config: &SyncConfig, write: bool) -> Result<()> {
    let mut store = StoreSnapshot::load(path)
        .with_context(|| format!("loading store snapshot {}", path.display()))?
        .into_store();

    let report = run_synchronization(&mut store, config).context("synchronization failed")?;

    let (title, message) = report.notification();
    println!("{title}: {message}");
    println!("{}", report.summary());

    if write {
        store
            .snapshot()
            .save(path)
            .with_context(|| format!("saving store snapshot {}", path.display()))?;
        println!("wrote {} ({} changes)", path.display(), report.writes());
    } else if report.writes() > 0 {
        println!("dry run: {} changes not saved (pass --write)", report.writes());
    }
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let snapshot = StoreSnapshot::load(path)
        .with_context(|| format!("checking store snapshot {}", path.display()))?;
    let managed = snapshot
        .website_categories
        .iter()
        .filter(|w| w.is_managed())
        .count();
    println!(
        "{}: {} inventory categories, {} website categories ({} managed), {} products",
        path.display(),
        snapshot.inventory_categories.len(),
        snapshot.website_categories.len(),
        managed,
        snapshot.products.len()
    );
    Ok(())
}
