//! Actors and the channels between them.

pub mod bridge;
pub mod reactor;

use tokio::sync::mpsc;
use tracing::Span;

/// Sends events to an actor, carrying the sender's span along.
pub struct Sender<Event>(mpsc::UnboundedSender<(Span, Event)>);
pub type Receiver<Event> = mpsc::UnboundedReceiver<(Span, Event)>;

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), rx)
}

impl<Event> Sender<Event> {
    /// Sends an event. A closed receiver is ignored.
    pub fn send(&self, event: Event) { _ = self.try_send(event) }

    pub fn try_send(&self, event: Event) -> Result<(), mpsc::error::SendError<(Span, Event)>> {
        self.0.send((Span::current(), event))
    }
}

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Event> std::fmt::Debug for Sender<Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Sender").finish()
    }
}
