use crate::notification::Action;
use crate::record::Record;
use crate::reducer::StoreState;
use tokio::sync::oneshot;

/// Messages accepted by the [`StoreActor`](super::StoreActor).
#[derive(Debug)]
pub enum StoreRequest<T: Record> {
    /// Fold `action` into the state; answered once the reduction is applied.
    Dispatch {
        action: Action<T>,
        respond_to: oneshot::Sender<()>,
    },
    GetState {
        respond_to: oneshot::Sender<StoreState<T>>,
    },
}
