use std::path::PathBuf;
use std::process;

use log::{error, info, warn};
use serde::Serialize;
use structopt::StructOpt;

use cnft::collection::{CollectionService, MemoryRecordSource};
use cnft::config::Config;
use cnft::crypto::Value;
use cnft::init_logger_with_level;

#[derive(Debug, StructOpt)]
#[structopt(name = "cnft", about = "Compressed NFT proof tool")]
struct Opt {
    /// Config file
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Snapshot file, overrides the configured path
    #[structopt(long, parse(from_os_str))]
    snapshot: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Show one item with its proof cell
    Item {
        collection: u64,
        index: usize,
    },

    /// List a page of items
    Items {
        collection: u64,

        #[structopt(long)]
        offset: Option<usize>,

        #[structopt(long)]
        count: Option<usize>,
    },

    /// Show the collection state
    State {
        collection: u64,
    },

    /// Describe replacing the trailing leaves with new hex values
    Update {
        collection: u64,

        #[structopt(required = true)]
        leaves: Vec<String>,
    },
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            process::exit(1);
        }
    }
}

fn main() {
    let opt = Opt::from_args();

    let config = match &opt.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                // Logger is not up yet
                eprintln!("Failed to load configuration: {}", e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    init_logger_with_level(&config.service.log_level);

    if opt.config.is_none() {
        warn!("No config file given, using defaults");
    }

    let snapshot = opt
        .snapshot
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.source.snapshot_path));
    info!("Using snapshot {:?}", snapshot);

    let source = match MemoryRecordSource::load(&snapshot) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to load records: {}", e);
            process::exit(1);
        }
    };
    let service = CollectionService::new(source, &config);

    let result = match opt.command {
        Command::Item { collection, index } => {
            service.get_item(collection, index).map(|r| print_json(&r))
        }
        Command::Items { collection, offset, count } => {
            service.get_items(collection, offset, count).map(|r| print_json(&r))
        }
        Command::State { collection } => service.get_state(collection).map(|r| print_json(&r)),
        Command::Update { collection, leaves } => leaves
            .iter()
            .map(|leaf| leaf.parse::<Value>())
            .collect::<Result<Vec<_>, _>>()
            .and_then(|leaves| service.get_update(collection, &leaves))
            .map(|r| print_json(&r)),
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
