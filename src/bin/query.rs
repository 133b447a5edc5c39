//! `dlreason-query` - reads conjunctive rules from stdin, one per line,
//! and prints each rule's answers tab-separated to stdout. Blank lines and
//! `#`-prefixed comments are skipped. Exits 2 on a rule outside the
//! supported fragment, 1 on a store error, 0 otherwise.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use dlreason::config::Config;
use dlreason::query;
use dlreason::store::SqliteStore;

/// Run conjunctive queries against a compiled database.
#[derive(Parser, Debug)]
#[command(name = "dlreason-query", version)]
struct Cli {
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
    std::process::exit(match run(cli, &cfg) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("dlreason-query: {err:#}");
            2
        }
    });
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

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match query::run(&store, trimmed) {
            Ok(rows) => {
                for row in rows {
                    writeln!(out, "{}", row.join("\t"))?;
                }
            }
            Err(err) => {
                eprintln!("dlreason-query: {trimmed}: {err}");
            }
        }
    }

    Ok(())
}
