use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use memspace::{Allocator, Snapshot, SpaceConfig};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt};

/// Replays a short malloc/free/defrag session against a managed memory space.
#[derive(Parser, Debug)]
#[command(name = "memspace", version)]
struct Args {
    /// Number of words in the space, overrides the config file
    #[arg(long)]
    capacity: Option<u32>,

    /// JSON config file
    #[arg(short, long, default_value = "memspace.json")]
    config: PathBuf,

    /// Print snapshots as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Step<'a> {
    step: &'a str,
    snapshot: &'a Snapshot,
}

fn show(label: &str, snapshot: &Snapshot, json: bool) -> anyhow::Result<()> {
    if json {
        let step = Step {
            step: label,
            snapshot,
        };
        println!("{}", serde_json::to_string(&step)?);
    } else {
        println!("[{label}]\n{snapshot}\n");
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = SpaceConfig::load_from_path(&args.config)?;
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    config.validate()?;

    info!(capacity = config.capacity, "starting session");
    let mut space = Allocator::from_config(&config)?;

    // the classic sequence wants 100 words
    let mut bases = Vec::with_capacity(4);
    for length in [5, 20, 20, 55] {
        let base = space
            .allocate(length)
            .with_context(|| format!("allocating {length} words"))?;
        bases.push(base);
    }
    show("after malloc", &space.snapshot(), args.json)?;

    space.release(bases[0])?;
    space.release(bases[2])?;
    show("after free", &space.snapshot(), args.json)?;

    let merges = space.coalesce();
    info!(merges, "defrag");
    show("after defrag", &space.snapshot(), args.json)?;

    space.release(bases[1])?;
    let merges = space.coalesce();
    info!(merges, "defrag");
    show("after second free and defrag", &space.snapshot(), args.json)?;

    if !space.check_tiling() {
        bail!("free and allocated ranges no longer tile the space");
    }

    Ok(())
}
