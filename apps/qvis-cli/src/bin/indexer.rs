use std::{env, path::PathBuf};

use qvis_cli::init_logging;
use qvis_core::config::Config;
use qvis_text::TantivyIndexer;

fn main() -> anyhow::Result<()> {
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    init_logging(&config);
    let data_dir = match env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => config.data_dir()?,
    };
    let index_dir = config.index_dir()?;

    println!("Tantivy Indexer\n===============");
    println!("Data directory: {}", data_dir.display());
    let indexer = TantivyIndexer::new(index_dir.clone())?;
    let count = indexer.index_files(&data_dir)?;
    println!("Indexed {} documents into {}", count, index_dir.display());
    println!("\nTo visualize a query, use: cargo run --bin qvis tree <query.json> --relevant <ids.txt>");
    Ok(())
}
