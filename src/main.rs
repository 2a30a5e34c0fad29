use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use node_composer::compose_node;
use node_composer::domain::composer_config::ComposerConfig;
use node_composer::domain::inventory::inventory_store::InventoryStore;
use node_composer::error::Error;
use node_composer::loader::parser::{load_config, load_inventory, load_requested_node};
use node_composer::logger;

/// Plans the composition of one node from an inventory snapshot.
#[derive(Parser, Debug)]
#[command(name = "node-composer", version, about)]
struct Args {
    /// Inventory snapshot in JSON.
    #[arg(long)]
    inventory: PathBuf,

    /// Requested node in JSON.
    #[arg(long)]
    request: PathBuf,

    /// Optional composer configuration in JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ComposerConfig::default(),
    };
    logger::init(&config.log_dir);

    let inventory = load_inventory(&args.inventory).with_context(|| format!("loading inventory from {}", args.inventory.display()))?;
    let request = load_requested_node(&args.request).with_context(|| format!("loading request from {}", args.request.display()))?;
    let store = InventoryStore::new(inventory);

    match compose_node(&store, &request, &config) {
        Ok(context) => {
            println!("{}", serde_json::to_string_pretty(&context)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::AllocationError(error)) if error.violations().is_some() => {
            if let Some(violations) = error.violations() {
                println!("{}", serde_json::to_string_pretty(violations)?);
            }
            Ok(ExitCode::FAILURE)
        }
        Err(other) => Err(other.into()),
    }
}
