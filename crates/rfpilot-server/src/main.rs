//! RFPilot server CLI
//!
//! Starts the HTTP server that processes uploaded RFP documents.

use rfpilot_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Usage: rfpilot-server --config <path-to-config.toml>");
        process::exit(2);
    };

    start_server(config).await
}

fn print_help() {
    println!("RFPilot Server - RFP document processing and proposal drafting");
    println!();
    println!("USAGE:");
    println!("    rfpilot-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("EXAMPLE:");
    println!("    RFPILOT_AI_API_KEY=... rfpilot-server --config config/rfpilot.toml");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address, bind_port: where to listen (default 127.0.0.1:8080)");
    println!("    - database_path: SQLite file (default rfpilot.db)");
    println!("    - blob_root: directory of uploaded documents (default uploads)");
    println!("    - [llm] endpoint, model, timeout_secs, api_key");
    println!("    - [extractor] requirement bounds and remote_failure_policy");
    println!();
    println!("ENVIRONMENT:");
    println!("    RFPILOT_AI_API_KEY    AI gateway credential (overrides llm.api_key)");
    println!("    RUST_LOG              Log filter (default: info)");
}
