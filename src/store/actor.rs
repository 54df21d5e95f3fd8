use super::{StoreClient, StoreRequest};
use crate::notification::Action;
use crate::record::Record;
use crate::reducer::{reduce, StoreState};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Owns the store state and reduces actions sequentially.
///
/// **Concurrency Model**: many clients may dispatch at once, but the actor
/// processes its queue one message at a time, so every reduction sees the
/// result of the previous one. No locks guard the state.
pub struct StoreActor<T: Record> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    state: StoreState<T>,
}

impl<T: Record> StoreActor<T> {
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        Self::with_state(buffer_size, StoreState::new())
    }

    /// Starts from a preloaded state (e.g. rehydrated collections).
    pub fn with_state(buffer_size: usize, state: StoreState<T>) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self { receiver, state };
        (actor, StoreClient::new(sender))
    }

    /// Runs the event loop until every client is dropped, then returns the final state.
    pub async fn run(mut self) -> StoreState<T> {
        let record_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(record_type, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Dispatch { action, respond_to } => {
                    self.apply(&action);
                    let _ = respond_to.send(());
                }
                StoreRequest::GetState { respond_to } => {
                    let _ = respond_to.send(self.state.clone());
                }
            }
        }

        info!(record_type, resources = self.state.resources().count(), "Shutdown");
        self.state
    }

    fn apply(&mut self, action: &Action<T>) {
        match action {
            Action::Crud(notification) => {
                self.state = reduce(&self.state, action);
                let size = self
                    .state
                    .collection(&notification.resource)
                    .map_or(0, |collection| collection.len());
                info!(resource = %notification.resource, kind = %notification.kind(), size, "Reduced");
            }
            Action::Custom { kind, payload } => {
                debug!(%kind, %payload, "Custom action");
            }
        }
    }
}
