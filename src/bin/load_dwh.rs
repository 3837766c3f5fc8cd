use std::{error::Error, path::Path};

use clap::Parser;
use jukebox::config::DwhConfig;
use jukebox::db::{catalog::QueryCatalog, connect, load::LoadRunner};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment name, e.g., test, prod
    #[arg(short, long, default_value = "prod")]
    env: String,
}

fn run(config: &DwhConfig) -> Result<(), Box<dyn Error>> {
    let catalog = QueryCatalog::new(&config.iam_role);
    let mut client = connect(&config.cluster)?;
    let runner = LoadRunner { catalog: &catalog };
    // the inserts read staging content, so both copies commit first
    runner.load_staging(&mut client)?;
    runner.insert_warehouse(&mut client)?;
    for (table, count) in runner.table_counts(&mut client)? {
        info!("{}: {} rows", table, count);
    }
    client.close()?;
    Ok(())
}

/// Run after `reset_schema` has rebuilt the tables.  A failed run leaves the
/// warehouse partially populated; reset the schema and rerun.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();
    dotenvy::from_path(Path::new(format!(".env/{}.env", args.env).as_str())).unwrap();

    let config = DwhConfig::from_env()?;
    if let Err(e) = run(&config) {
        error!("{}", e);
    }
    Ok(())
}
