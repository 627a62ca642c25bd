//! CLI entry point for `pgassist-params`.

use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use indexmap::IndexMap;
use pgassist::database::{CatalogSnapshot, Config, Db};
use pgassist::parser::ParamScanner;

#[derive(Parser)]
#[command(
    name = "pgassist-params",
    about = "Map the $n placeholders of a PostgreSQL query to columns and types"
)]
struct Cli {
    /// SQL statement; read from stdin when omitted
    sql: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON catalog snapshot used instead of, or before, the live catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Database to read the catalog and sample values from
    #[arg(long, env = "DATABASE_URL")]
    db_url: Option<String>,

    /// Placeholder value, `n=value`; renders the query with values inlined
    #[arg(long = "value", value_parser = parse_value)]
    values: Vec<(usize, String)>,

    /// Wrap the rendered query in EXPLAIN
    #[arg(long)]
    explain: bool,

    /// Skip sample value lookups
    #[arg(long)]
    no_samples: bool,
}

fn parse_value(raw: &str) -> Result<(usize, String), String> {
    let (ordinal, value) = raw.split_once('=').ok_or_else(|| format!("expected n=value, got '{raw}'"))?;
    let ordinal = ordinal.trim().trim_start_matches('$');
    match ordinal.parse::<usize>() {
        Ok(ordinal) if ordinal > 0 => Ok((ordinal, value.to_string())),
        _ => Err(format!("invalid placeholder number '{ordinal}'")),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                process::exit(2);
            }
        },
        None => Config::new(),
    };
    if cli.db_url.is_some() {
        config.database_url = cli.db_url.clone();
    }
    if cli.no_samples {
        config.fetch_samples = false;
    }

    let catalog = match &cli.catalog {
        Some(path) => match CatalogSnapshot::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("Error loading catalog: {e}");
                process::exit(2);
            }
        },
        None => CatalogSnapshot::new(),
    };

    let sql = match &cli.sql {
        Some(sql) => sql.clone(),
        None => {
            let mut sql = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut sql) {
                eprintln!("Error reading stdin: {e}");
                process::exit(2);
            }
            sql
        }
    };

    let db = match Db::with_catalog(config, catalog) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(2);
        }
    };

    let analysis = db.analyze(&sql).await;

    let mut output = serde_json::json!({ "analysis": analysis });
    if !cli.values.is_empty() || cli.explain {
        let values: IndexMap<usize, String> = cli.values.iter().cloned().collect();
        let rendered = ParamScanner::substitute(&sql, &values, &analysis);
        output["query"] = serde_json::Value::String(rendered.clone());
        if cli.explain {
            output["explain"] = serde_json::Value::String(ParamScanner::explain(&rendered));
        }
    }

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error writing output: {e}");
            process::exit(2);
        }
    }

    if !analysis.is_parsed() {
        process::exit(1);
    }
}
