//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden; every event carries the structured
//! fields it needs (`resource`, `operation`, `kind`, `size`, ...).
//!
//! ## What Gets Traced
//!
//! - **Store**: startup, one `Reduced` event per folded notification, shutdown
//! - **Orchestrator**: a span per dispatched operation, cache hits, outgoing requests, transport failures
//! - **Transport**: response status and body length
//!
//! ```bash
//! # Reductions and requests
//! RUST_LOG=info cargo run
//!
//! # Payloads and response sizes too
//! RUST_LOG=debug cargo run
//! ```
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Store started record_type="Value"
//! INFO dispatch:run: Sending request resource=todos operation=list verb=GET url=/todos
//! INFO Reduced resource=todos kind=CRUD_LIST size=200
//! INFO dispatch:run: Served from store resource=todos operation=list size=200
//! INFO Reduced resource=todos kind=CRUD_LIST size=200
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
