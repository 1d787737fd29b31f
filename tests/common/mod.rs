//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use manifest_router::config::ServerConfig;
use manifest_router::http::{ApiKeyRoles, HandlerRegistry, HttpServer};
use manifest_router::lifecycle::Shutdown;
use manifest_router::{build_index, compile, runtime_check, ValidatorRegistry};
use tokio::net::TcpListener;

/// Compile and check `manifest`, bind `handlers`, and serve on `addr` until
/// the returned `Shutdown` is triggered.
pub async fn start_server(
    addr: SocketAddr,
    manifest: &str,
    handlers: HandlerRegistry,
    api_keys: &[(&str, &[&str])],
) -> Shutdown {
    let validators = ValidatorRegistry::with_builtins();
    let endpoints = compile(manifest.as_bytes()).unwrap();
    runtime_check(&endpoints, &validators).unwrap();
    let index = build_index(endpoints);
    let bound = handlers.bind(&index).unwrap();

    let keys: HashMap<String, Vec<String>> = api_keys
        .iter()
        .map(|(key, roles)| {
            (
                key.to_string(),
                roles.iter().map(|r| r.to_string()).collect(),
            )
        })
        .collect();

    let mut config = ServerConfig::default();
    config.listener.bind_address = addr.to_string();

    let listener = TcpListener::bind(addr).await.unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::new(config, index, validators, bound, ApiKeyRoles::new(keys));

    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown
}
