use std::path::PathBuf;
use structopt::StructOpt;
use cnft::config::Config;
use cnft::init_logger;
use log::{info, error};

#[derive(Debug, StructOpt)]
#[structopt(name = "cnft-config", about = "cNFT configuration tool")]
struct Opt {
    /// Generate a default configuration
    #[structopt(long)]
    generate: bool,

    /// Output file
    #[structopt(long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Input file
    #[structopt(long, parse(from_os_str))]
    input: Option<PathBuf>,

    /// Maximum items per page
    #[structopt(long)]
    max_page_size: Option<usize>,

    /// Log level
    #[structopt(long)]
    log_level: Option<String>,

    /// Snapshot path
    #[structopt(long)]
    snapshot_path: Option<String>,

    /// Append CRC32-C to serialized cells
    #[structopt(long)]
    crc32: Option<bool>,

    /// Include the cell index in serialized cells
    #[structopt(long)]
    index: Option<bool>,
}

fn print_config(config: &Config) {
    match config.to_toml() {
        Ok(config_str) => {
            println!("{}", config_str);
        },
        Err(e) => {
            error!("Failed to serialize configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    // Initialize logger
    init_logger();

    // Parse command line arguments
    let opt = Opt::from_args();

    if opt.generate {
        let mut config = Config::default();

        if let Some(max_page_size) = opt.max_page_size {
            config.service.max_page_size = max_page_size;
        }

        if let Some(log_level) = opt.log_level {
            config.service.log_level = log_level;
        }

        if let Some(snapshot_path) = opt.snapshot_path {
            config.source.snapshot_path = snapshot_path;
        }

        if let Some(crc32) = opt.crc32 {
            config.boc.crc32 = crc32;
        }

        if let Some(index) = opt.index {
            config.boc.index = index;
        }

        // Save the configuration
        if let Some(output) = opt.output {
            match config.save(&output) {
                Ok(_) => {
                    info!("Configuration saved to {:?}", output);
                },
                Err(e) => {
                    error!("Failed to save configuration: {}", e);
                    std::process::exit(1);
                }
            }
        } else {
            print_config(&config);
        }
    } else if let Some(input) = opt.input {
        match Config::load(&input) {
            Ok(config) => print_config(&config),
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                std::process::exit(1);
            }
        }
    } else if let Err(e) = Opt::clap().print_help() {
        error!("Failed to print help: {}", e);
        std::process::exit(1);
    }
}
