//! `dlreason-import` - creates a database and imports a TBox and zero or
//! more ABoxes into it.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use dlreason::config::Config;
use dlreason::dl::{self, parser as dl_parser};
use dlreason::store::{FactStore, MetadataKey, SqliteStore};
use dlreason::weight::{WeightGenerator, WeightMode};

/// Import a TBox and ABoxes into a fresh (or existing) database.
#[derive(Parser, Debug)]
#[command(name = "dlreason-import", version)]
struct Cli {
    /// Database filename, created under the configured store directory.
    #[arg(short = 'd', long = "database")]
    database: Option<String>,

    /// Do not import the TBox; add ABoxes to an already-imported database.
    #[arg(short = 'n', long = "no-tbox")]
    no_tbox: bool,

    /// Emit `Relation` debug output while closing the TBox.
    #[arg(short = 'g', long = "debug")]
    debug: bool,

    /// Weight generation mode: 0=constant 1=random 2=decreasing
    /// 3=increasing 4=nan.
    #[arg(short = 'w', long = "weights", default_value_t = 0)]
    weight_mode: u8,

    /// List the databases in the configured store directory and exit.
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// TBox document (ignored when `-n` is given, but still required
    /// positionally for symmetry with the ABox list).
    #[arg(required_unless_present = "list")]
    tbox: Option<String>,

    /// Zero or more ABox documents.
    aboxes: Vec<String>,
}

fn main() {
    let cfg = Config::load().unwrap_or_default();
    dlreason::config::init_logging(&cfg.logging);

    let cli = Cli::parse();
    if let Err(err) = run(cli, &cfg) {
        eprintln!("dlreason-import: {err:#}");
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

    fs::create_dir_all(&cfg.store.dirname)
        .with_context(|| format!("creating store directory {}", cfg.store.dirname.display()))?;

    let db_name = cli.database.clone().unwrap_or_else(|| cfg.store.default_dbname.clone());
    let db_path = PathBuf::from(&cfg.store.dirname).join(&db_name);

    if !cli.no_tbox && db_path.exists() {
        fs::remove_file(&db_path).with_context(|| format!("removing stale database {}", db_path.display()))?;
    }

    info!(path = %db_path.display(), "opening database");
    let store = SqliteStore::open(&db_path)?;

    let weights = WeightGenerator::new(WeightMode::from_flag(cli.weight_mode));

    // clap's `required_unless_present = "list"` guarantees this is `Some`
    // once the early `cli.list` return above has not fired.
    let tbox = cli.tbox.as_deref().expect("tbox is required unless -l is given");
    let mut origins = if cli.no_tbox {
        let raw = store.load_metadata(MetadataKey::Origins)?;
        serde_json::from_str::<Vec<String>>(&raw)?
    } else {
        import_tbox(tbox, cli.debug, &store)?;
        Vec::new()
    };

    for abox_path in &cli.aboxes {
        import_one_abox(abox_path, &store, &weights)?;
        origins.push(abox_path.clone());
    }

    store.save_metadata(MetadataKey::Origins, &serde_json::to_string(&origins)?)?;

    Ok(())
}

fn import_tbox(tbox_path: &str, debug: bool, store: &SqliteStore) -> Result<()> {
    info!(file = tbox_path, "importing TBox");
    let raw = fs::read_to_string(tbox_path).with_context(|| format!("reading TBox {tbox_path}"))?;
    let doc = dl_parser::parse(&raw);
    let schema = dl::import_tbox(&doc, tbox_path, debug)?;

    for (predicate, count) in &schema.unimplemented {
        warn!(predicate, count, "TBox axiom not implemented, skipped");
    }

    store.create_tables(&schema.class_names, &schema.object_property_names)?;

    store.save_metadata(MetadataKey::TBox, &schema.relation.to_json()?)?;
    store.save_metadata(MetadataKey::ClassNames, &serde_json::to_string(&schema.class_names)?)?;
    store.save_metadata(
        MetadataKey::ObjectPropertyNames,
        &serde_json::to_string(&schema.object_property_names)?,
    )?;

    Ok(())
}

fn import_one_abox(abox_path: &str, store: &SqliteStore, weights: &WeightGenerator) -> Result<()> {
    info!(file = abox_path, "importing ABox");
    let raw = fs::read_to_string(abox_path).with_context(|| format!("reading ABox {abox_path}"))?;
    let doc = dl_parser::parse(&raw);
    let unimplemented = dl::import_abox(store, &doc, abox_path, weights, abox_path)?;

    for (predicate, count) in &unimplemented {
        warn!(predicate, count, "ABox assertion not implemented, skipped");
    }

    Ok(())
}
