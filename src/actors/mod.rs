//! Background actors.
//!
//! Each actor is an independent tokio task that talks to the logic thread by
//! sending [`Message`](crate::tea::Message)s. Input is not an actor; the
//! logic thread polls the terminal itself.

pub mod refresh;

use tokio_util::sync::CancellationToken;

pub use refresh::RefreshActor;

/// Handle to a running actor, used for shutdown.
pub struct ActorHandle {
    cancel: CancellationToken,
}

impl ActorHandle {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
