use super::StoreRequest;
use crate::dispatch::{Dispatchable, Dispatcher};
use crate::error::ResourceError;
use crate::notification::Action;
use crate::record::Record;
use crate::reducer::StoreState;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

/// A cloneable handle to a running [`StoreActor`](super::StoreActor).
pub struct StoreClient<T: Record> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: Record> Clone for StoreClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Record> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    /// Runs a dispatchable: plain actions are folded, pending calls and thunks
    /// execute on the current task with this client as their dispatcher.
    #[instrument(skip_all)]
    pub async fn dispatch(&self, dispatchable: impl Into<Dispatchable<T>>) -> Result<(), ResourceError> {
        let dispatchable: Dispatchable<T> = dispatchable.into();
        dispatchable.run(Arc::new(self.clone())).await
    }

    /// Current state rendered as `{ resource: [items...] }`.
    pub async fn snapshot_json(&self) -> Result<Value, ResourceError> {
        let state = self.get_state().await?;
        serde_json::to_value(&state).map_err(ResourceError::Encode)
    }
}

#[async_trait]
impl<T: Record> Dispatcher<T> for StoreClient<T> {
    async fn dispatch_action(&self, action: Action<T>) -> Result<(), ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Dispatch { action, respond_to })
            .await
            .map_err(|_| ResourceError::StoreClosed)?;
        response.await.map_err(|_| ResourceError::StoreDropped)
    }

    async fn get_state(&self) -> Result<StoreState<T>, ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::GetState { respond_to })
            .await
            .map_err(|_| ResourceError::StoreClosed)?;
        response.await.map_err(|_| ResourceError::StoreDropped)
    }
}
