//! Periodic board refresh.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::klog_debug;
use crate::tea::Message;

use super::ActorHandle;

/// Sends [`Message::RefreshTick`] every `interval`. Whether a tick turns into
/// a fetch is up to the update function.
pub struct RefreshActor {
    msg_tx: mpsc::UnboundedSender<Message>,
    interval: Duration,
}

impl RefreshActor {
    pub fn new(msg_tx: mpsc::UnboundedSender<Message>, interval: Duration) -> Self {
        Self { msg_tx, interval }
    }

    pub fn spawn(self) -> ActorHandle {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        klog_debug!("RefreshActor::spawn interval={:?}", self.interval);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; the board was just loaded.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancel_clone.cancelled() => {
                        klog_debug!("RefreshActor cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        if self.msg_tx.send(Message::RefreshTick).is_err() {
                            klog_debug!("RefreshActor: message channel closed");
                            break;
                        }
                    }
                }
            }
        });

        ActorHandle::new(cancel)
    }
}
