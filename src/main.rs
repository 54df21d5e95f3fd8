//! # CRUD Resource Demo
//!
//! Lists the `todos` resource of a REST server twice. The first call goes to
//! the network; the second is served from the store.
//!
//! ```bash
//! RUST_LOG=info cargo run -- https://jsonplaceholder.typicode.com
//! ```

use crud_resource::telemetry::setup_tracing;
use crud_resource::transport::HttpTransport;
use crud_resource::{make_resource, StoreActor};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, Instrument};

const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    info!(%base_url, "Starting demo");

    let (actor, store) = StoreActor::<Value>::new(32);
    let handle = tokio::spawn(actor.run());

    let transport = Arc::new(HttpTransport::with_base_url(base_url));
    let todos = make_resource::<Value>("todos", "/todos", transport).map_err(|e| e.to_string())?;

    for round in 1..=2 {
        let span = tracing::info_span!("list_todos", round);
        let result = async {
            let call = todos.list().map_err(|e| e.to_string())?;
            store.dispatch(call).await.map_err(|e| e.to_string())
        }
        .instrument(span)
        .await;

        if let Err(e) = result {
            error!(error = %e, "Listing todos failed");
            return Err(e);
        }
    }

    let size = store
        .snapshot_json()
        .await
        .map_err(|e| e.to_string())?
        .get("todos")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    info!(size, "Todos in store");

    drop(store);
    handle.await.map_err(|e| e.to_string())?;
    Ok(())
}
