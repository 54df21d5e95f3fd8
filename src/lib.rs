#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # CRUD Resource
//!
//! > **Declarative REST resources mirrored into an in-memory store.**
//!
//! Declare a named resource (`users`, `todos`, ...) with a base URL or an explicit
//! per-operation configuration. The crate derives the standard operations (`list`,
//! `read`, `create`, `update`, `delete`), performs the HTTP calls and turns every
//! response into a [`Notification`](notification::Notification) that a pure
//! reducer folds into the collection of that resource.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Why notifications + a reducer?
//! The store is only ever changed by folding notifications, one at a time. The
//! network layer never touches the state directly, so the state always reflects
//! the sequence of completed operations in the order they were dispatched.
//!
//! ### Generics: The Power of `T`
//! Collections hold any `T: Record`, an item type with a stable merge key. Untyped
//! JSON works out of the box (`serde_json::Value` keyed by its `"id"` field);
//! typed records get their payloads checked when a response is decoded.
//!
//! ## 🚀 Core Concepts
//!
//! 1. **Notification Model** ([`notification`]): eight change kinds, each with a
//!    fixed payload shape, plus per-resource factories.
//! 2. **Collection Reducer** ([`reducer`]): `reduce(state, action) -> state`, pure
//!    and structurally shared.
//! 3. **Operation Binder** ([`method`], [`config`]): explicit overrides merged onto
//!    defaults derived from the base URL.
//! 4. **Dispatch Orchestrator** ([`dispatch`]): cache check, payload modifiers,
//!    before/after hooks and the transport call.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Model ([`record`], [`notification`], [`reducer`])
//! - **Role**: What a collection is and how it changes.
//! - **Key items**: [`Record`](record::Record), [`Change`](notification::Change), [`reduce`](reducer::reduce).
//!
//! ### 2. The Binder ([`config`], [`method`], [`resource`])
//! - **Role**: Turns configuration into callable operations.
//! - **Key items**: [`make_resource`](resource::make_resource), [`MethodConfig`](method::MethodConfig),
//!   [`ResourceManifest`](config::ResourceManifest).
//!
//! ### 3. The Runtime ([`dispatch`], [`store`], [`transport`])
//! - **Role**: Executes operations against the network and the store.
//! - **Key items**: [`StoreActor`](store::StoreActor), [`StoreClient`](store::StoreClient),
//!   [`HttpTransport`](transport::HttpTransport).
//!
//! ### 4. Support ([`mock`], [`telemetry`], [`error`])
//! - **Role**: Test doubles, logging setup and the shared error type.
//!
//! ## 🚀 Quick Start
//!
//! ```ignore
//! let (actor, store) = StoreActor::<Value>::new(32);
//! tokio::spawn(actor.run());
//!
//! let todos = make_resource("todos", "/todos", Arc::new(HttpTransport::with_base_url(base)))?;
//! store.dispatch(todos.list()?).await?;
//! store.dispatch(todos.create(json!({ "title": "write docs" }))?).await?;
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run -- https://jsonplaceholder.typicode.com
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod method;
pub mod mock;
pub mod notification;
pub mod record;
pub mod reducer;
pub mod resource;
pub mod store;
pub mod telemetry;
pub mod transport;
pub mod url;

pub use config::{ResourceConfig, ResourceManifest};
pub use dispatch::{Dispatchable, Dispatcher};
pub use error::ResourceError;
pub use method::{MethodConfig, Verb};
pub use notification::{make_notifications, Action, Change, ChangeKind, Notification};
pub use record::{Record, RecordKey};
pub use reducer::{reduce, StoreState};
pub use resource::{make_resource, Resource};
pub use store::{StoreActor, StoreClient};
