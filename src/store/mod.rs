//! # Store Runtime
//!
//! The store owns the [`StoreState`](crate::reducer::StoreState) of every
//! resource and is the only place it changes.
//!
//! - [`StoreActor`]: the "server" half. Owns the state and the receiving end of
//!   the channel, and folds actions one at a time in arrival order.
//! - [`StoreClient`]: the cloneable "client" half. Implements
//!   [`Dispatcher`](crate::dispatch::Dispatcher) and runs pending calls and
//!   thunks on the caller's task, so network calls never block the actor loop.
//! - [`StoreRequest`]: the message type exchanged between the two.
//!
//! ```ignore
//! let (actor, store) = StoreActor::<Value>::new(32);
//! let handle = tokio::spawn(actor.run());
//!
//! store.dispatch(todos.list()?).await?;
//! let state = store.get_state().await?;
//!
//! drop(store);
//! let final_state = handle.await?;
//! ```

mod actor;
mod client;
mod message;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use message::StoreRequest;
