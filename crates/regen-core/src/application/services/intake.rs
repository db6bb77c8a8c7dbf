//! Notification intake: the channel feeding the controller.
//!
//! Host adapters and the render pipeline both push [`Notification`]s into the
//! same channel; the intake loop hands them to the controller one at a time.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::{
    application::{ports::EventSink, services::GenerationController},
    domain::Notification,
};

/// [`EventSink`] that forwards into an intake channel.
#[derive(Clone)]
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelEventSink {
    pub fn new(sender: mpsc::UnboundedSender<Notification>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            warn!("notification intake closed; dropping notification");
        }
    }
}

/// [`EventSink`] that discards everything. For one-shot runs with no intake.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, notification: Notification) {
        debug!(event = ?notification.event, "no intake; notification discarded");
    }
}

/// Receiving end of the notification channel.
pub struct EventIntake {
    sender: mpsc::UnboundedSender<Notification>,
    receiver: mpsc::UnboundedReceiver<Notification>,
}

impl Default for EventIntake {
    fn default() -> Self {
        Self::new()
    }
}

impl EventIntake {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Notification> {
        self.sender.clone()
    }

    pub fn sink(&self) -> ChannelEventSink {
        ChannelEventSink::new(self.sender())
    }

    /// Feed notifications to `controller` until cancelled or every sender is
    /// dropped. Returns the number of notifications handled.
    ///
    /// Each notification is handled on the blocking pool; they are handled
    /// strictly one after another.
    pub async fn run(
        self,
        controller: Arc<GenerationController>,
        cancel: CancellationToken,
    ) -> usize {
        let Self {
            sender,
            mut receiver,
        } = self;
        drop(sender);

        let mut handled = 0;
        loop {
            let notification = tokio::select! {
                _ = cancel.cancelled() => break,
                next = receiver.recv() => match next {
                    Some(notification) => notification,
                    None => break,
                },
            };

            let controller = controller.clone();
            if let Err(e) =
                tokio::task::spawn_blocking(move || controller.handle(notification)).await
            {
                error!(error = %e, "notification handler panicked");
            }
            handled += 1;
        }

        debug!(handled, "notification intake stopped");
        handled
    }
}
