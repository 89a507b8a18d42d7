mod config;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use config::Config;
use ef_upstream::Upstream;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ef")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the aggregation server.
    Serve,
    /// Print the OpenAPI document and exit.
    Openapi,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
            ef_serve::openapi::ensure_initialized();

            let config = Config::load();
            if let Some(parent) = Path::new(&config.db_path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            let upstream = match Upstream::new(&config.upstream) {
                Ok(upstream) => upstream,
                Err(err) => {
                    eprintln!("failed to build upstream clients: {err}");
                    std::process::exit(1);
                }
            };
            let state = ef_serve::AppState {
                db_path: config.db_path.clone(),
                upstream: Arc::new(upstream),
            };

            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.port);
            if let Err(err) = ef_serve::serve(state, addr).await {
                eprintln!("serve error: {err}");
                std::process::exit(1);
            }
        }
        Command::Openapi => {
            println!("{}", ef_serve::openapi::generate_spec());
        }
    }
}
