use std::{error::Error, path::Path};

use clap::Parser;
use jukebox::config::DwhConfig;
use jukebox::db::{catalog::QueryCatalog, connect, schema::SchemaManager};
use log::error;

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
    let manager = SchemaManager { catalog: &catalog };
    manager.drop_all(&mut client)?;
    manager.create_all(&mut client)?;
    client.close()?;
    Ok(())
}

/// Run this before a load to put the warehouse into a clean, empty schema.
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
