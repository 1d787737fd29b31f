//! manifest-router
//!
//! Serves the endpoints declared in a JSON manifest, or checks a manifest
//! without serving it.
//!
//! ```text
//! serve:  config → logging → metrics → manifest → check → index → bind → listen
//! check:  manifest → compile → runtime check → print endpoints
//! ```
//!
//! The binary binds no business handlers; every declared endpoint answers
//! `501 Not Implemented` until an embedding application registers one (see
//! `demos/users_api.rs`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use manifest_router::config::{load_config, ServerConfig};
use manifest_router::http::{ApiKeyRoles, HandlerRegistry, HttpServer};
use manifest_router::lifecycle::{load_routes, spawn_signal_handler, Shutdown};
use manifest_router::observability::{logging, metrics};
use manifest_router::ValidatorRegistry;

#[derive(Parser)]
#[command(name = "manifest-router")]
#[command(about = "Declarative REST endpoint router", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the manifest named in the config file
    Serve {
        #[arg(short, long, default_value = "router.toml")]
        config: PathBuf,
    },
    /// Compile and check a manifest, then list its endpoints
    Check {
        #[arg(short, long, default_value = "api.json")]
        manifest: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config } => serve(config).await,
        Commands::Check { manifest } => check(manifest),
    }
}

async fn serve(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config: ServerConfig = load_config(&path)?;
    logging::init(&config.observability.log_level)?;

    tracing::info!("manifest-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = %path.display(),
        bind_address = %config.listener.bind_address,
        manifest = %config.manifest.path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let validators = ValidatorRegistry::with_builtins();
    let index = load_routes(Path::new(&config.manifest.path), &validators)?;

    let handlers = HandlerRegistry::new().bind(&index)?;
    for endpoint in handlers.unbound() {
        tracing::warn!(endpoint = %endpoint, "No handler bound");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let receiver = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    let roles = ApiKeyRoles::from_config(&config.auth);
    let server = HttpServer::new(config, index, validators, handlers, roles);
    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn check(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let validators = ValidatorRegistry::with_builtins();
    let index = load_routes(&path, &validators)?;
    for endpoint in index.endpoints() {
        println!("{endpoint}");
    }
    println!("{} endpoints OK", index.len());
    Ok(())
}
