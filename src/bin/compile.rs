//! `dlreason-compile` - materializes an imported database: saturates
//! equivalence classes, induces facts along the TBox's compact-matrix
//! covers, and repairs per-origin polarity collisions.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use dlreason::config::Config;
use dlreason::rel::Relation;
use dlreason::store::{FactStore, MetadataKey, SqliteStore};
use dlreason::{materialize, repair};

/// Materialize and repair a previously-imported database.
#[derive(Parser, Debug)]
#[command(name = "dlreason-compile", version)]
struct Cli {
    /// Print per-table row-count statistics after compiling.
    #[arg(short = 's', long = "stats")]
    stats: bool,

    /// List the databases in the configured store directory and exit.
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Database filename, resolved against the configured store directory.
    #[arg(required_unless_present = "list")]
    database: Option<String>,
}

fn main() {
    let cfg = Config::load().unwrap_or_default();
    dlreason::config::init_logging(&cfg.logging);

    let cli = Cli::parse();
    if let Err(err) = run(cli, &cfg) {
        eprintln!("dlreason-compile: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, cfg: &Config) -> Result<()> {
    if cli.list {
        for name in dlreason::config::list_databases(&cfg.store.dirname)? {
            println!("{name}");
        }
        return Ok(());
    }

    // clap's `required_unless_present = "list"` guarantees this is `Some`
    // once the early `cli.list` return above has not fired.
    let database = cli.database.as_deref().expect("database is required unless -l is given");
    let db_path = PathBuf::from(&cfg.store.dirname).join(database);
    let store = SqliteStore::open(&db_path)?;

    let relation_json = store.load_metadata(MetadataKey::TBox)?;
    let relation = Relation::from_json(&relation_json)?;

    let class_names: Vec<String> = serde_json::from_str(&store.load_metadata(MetadataKey::ClassNames)?)?;
    let origins: Vec<String> = serde_json::from_str(&store.load_metadata(MetadataKey::Origins)?)?;

    info!(classes = class_names.len(), "materializing");
    materialize::materialize(&relation, &store)?;

    info!(origins = origins.len(), "measuring and repairing inconsistencies");
    let (initial, after) = repair::repair_and_verify(&store, &origins, &class_names)?;

    for (origin, (before, post)) in origins.iter().zip(initial.iter().zip(after.iter())) {
        if *before > 0.0 {
            info!(origin, initial_degree = before, post_repair_degree = post, "repaired origin");
        }
    }

    if cli.stats {
        for (table, count) in store.table_stats(&class_names)? {
            println!("{table}\t{count}");
        }
    }

    Ok(())
}
