use std::env;
use std::path::PathBuf;
use std::process;

use tracing::info;

use qvis_cache::FileDocumentCache;
use qvis_cli::{init_logging, read_query, read_relevant};
use qvis_core::config::Config;
use qvis_eval::{QueryVisualizer, TreeEvaluator};
use qvis_text::TantivyRetriever;

const USAGE: &str = "Usage: qvis <tree|key> <query.json> [--relevant <ids.txt>]";

fn parse_args() -> (String, PathBuf, Option<PathBuf>) {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut cmd = None; let mut query = None; let mut relevant = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--relevant" | "-r" => {
                if i + 1 < args.len() { relevant = Some(PathBuf::from(&args[i + 1])); i += 1; }
                else { eprintln!("Error: --relevant requires a file"); process::exit(1); }
            }
            "--help" | "-h" => { println!("{}", USAGE); process::exit(0); }
            arg if cmd.is_none() => cmd = Some(arg.to_string()),
            arg if query.is_none() => query = Some(PathBuf::from(arg)),
            arg => { eprintln!("Unexpected argument: {}", arg); process::exit(1); }
        }
        i += 1;
    }
    match (cmd, query) {
        (Some(cmd), Some(query)) => (cmd, query, relevant),
        _ => { eprintln!("{}", USAGE); process::exit(1); }
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    init_logging(&config);
    let (cmd, query_path, relevant_path) = parse_args();
    let query = read_query(&query_path)?;

    match cmd.as_str() {
        "key" => println!("{}", query.key()),
        "tree" => {
            let relevant = match relevant_path {
                Some(path) => read_relevant(&path)?,
                None => Default::default(),
            };
            let settings = config.settings()?;
            let cache = FileDocumentCache::open(config.cache_dir()?)?;
            let retriever = TantivyRetriever::open(config.index_dir()?)?;
            info!(cache = %cache.root().display(), parallel = settings.eval.parallel, "evaluating query");

            let evaluator = TreeEvaluator::new(cache, retriever).with_parallel(settings.eval.parallel);
            let graph = QueryVisualizer::new(evaluator).visualize(&query, &relevant)?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        _ => { eprintln!("Unknown command: {}\n{}", cmd, USAGE); process::exit(1); }
    }
    Ok(())
}
