mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

/// Whetstone active-model service.
#[derive(Parser)]
#[command(name = "whetstone", version, about = "Whetstone active-model service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8026")]
        port: u16,

        /// Address to bind the listener to
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,

        /// JSON seed document with nodes, policies, and active models
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Subnet allowed through subnet-restricted endpoints (CIDR).
        /// Falls back to WHETSTONE_SUBNET, then 127.0.0.0/8.
        #[arg(long)]
        subnet: Option<String>,

        /// Address the service itself is considered deployed on.
        /// Falls back to WHETSTONE_SERVER_ADDR, then 127.0.0.1.
        #[arg(long)]
        server_addr: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            seed,
            subnet,
            server_addr,
        } => {
            let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
            if let Err(e) = rt.block_on(serve::start_server(port, &bind, seed, subnet, server_addr))
            {
                eprintln!("Server error: {}", e);
                process::exit(1);
            }
        }
    }
}
