//! In-memory users service on top of the router.
//!
//! ```text
//! cargo run --example users_api -- demos/router.toml
//!
//! curl -H 'Authorization: Bearer admin-secret' -d name=ada localhost:8080/users
//! curl -H 'Authorization: Bearer user-1-key' localhost:8080/users/1
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::net::TcpListener;

use manifest_router::config::load_config;
use manifest_router::http::{
    ApiError, ApiKeyRoles, HandlerOutput, HandlerRegistry, HandlerResult, HttpServer,
    RequestContext,
};
use manifest_router::lifecycle::{load_routes, spawn_signal_handler, Shutdown};
use manifest_router::observability::logging;
use manifest_router::{Method, ValidatorRegistry};

#[derive(Default)]
struct Users {
    next_id: u64,
    names: BTreeMap<u64, String>,
}

type Store = Arc<Mutex<Users>>;

fn lock(store: &Store) -> Result<std::sync::MutexGuard<'_, Users>, ApiError> {
    store
        .lock()
        .map_err(|_| ApiError::Failure("user store poisoned".into()))
}

fn required<T: serde::de::DeserializeOwned>(
    ctx: &RequestContext,
    name: &str,
) -> Result<T, ApiError> {
    ctx.get(name)
        .ok_or_else(|| ApiError::Failure(format!("`{name}` not extracted")))
}

fn handlers(store: Store) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    let users = store.clone();
    registry.register(Method::Get, "/users", move |ctx: &RequestContext| -> HandlerResult {
        let limit = ctx.get::<u64>("Limit").unwrap_or(u64::MAX) as usize;
        let users = lock(&users)?;
        let list: Vec<_> = users
            .names
            .iter()
            .take(limit)
            .map(|(id, name)| json!({"id": id, "name": name}))
            .collect();

        let mut out = HandlerOutput::new();
        out.insert("Users".into(), json!(list));
        Ok(out)
    });

    let users = store.clone();
    registry.register(Method::Post, "/users", move |ctx: &RequestContext| -> HandlerResult {
        let name: String = required(ctx, "Name")?;
        let mut users = lock(&users)?;
        if users.names.values().any(|n| *n == name) {
            return Err(ApiError::Conflict(format!("user `{name}` exists")));
        }
        users.next_id += 1;
        let id = users.next_id;
        users.names.insert(id, name);

        let mut out = HandlerOutput::new();
        out.insert("ID".into(), json!(id));
        Ok(out)
    });

    let users = store.clone();
    registry.register(Method::Get, "/users/{id}", move |ctx: &RequestContext| -> HandlerResult {
        let id: u64 = required(ctx, "ID")?;
        let users = lock(&users)?;
        let name = users
            .names
            .get(&id)
            .ok_or_else(|| ApiError::NotFound(format!("user {id}")))?;

        let mut out = HandlerOutput::new();
        out.insert("ID".into(), json!(id));
        out.insert("Name".into(), json!(name));
        Ok(out)
    });

    registry.register(Method::Delete, "/users/{id}", move |ctx: &RequestContext| -> HandlerResult {
        let id: u64 = required(ctx, "ID")?;
        lock(&store)?
            .names
            .remove(&id)
            .ok_or_else(|| ApiError::NotFound(format!("user {id}")))?;
        Ok(HandlerOutput::new())
    });

    registry
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("demos/router.toml"));
    let config = load_config(&path)?;
    logging::init(&config.observability.log_level)?;

    let validators = ValidatorRegistry::with_builtins();
    let index = load_routes(Path::new(&config.manifest.path), &validators)?;
    let bound = handlers(Store::default()).bind(&index)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "users_api listening");

    let shutdown = Arc::new(Shutdown::new());
    let receiver = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    let roles = ApiKeyRoles::from_config(&config.auth);
    HttpServer::new(config, index, validators, bound, roles)
        .run(listener, receiver)
        .await?;
    Ok(())
}
