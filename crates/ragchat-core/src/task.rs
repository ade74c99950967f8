//! Background dispatch task.

use std::sync::Arc;

use ragchat_client::QueryDispatcher;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::session::{DispatchTicket, Settlement};

/// Run one dispatch on a background task and post its [`Settlement`] to
/// `tx`.  The call always runs to completion; if the receiver is gone the
/// result is dropped.
pub fn spawn_dispatch(
    dispatcher: Arc<dyn QueryDispatcher>,
    ticket: DispatchTicket,
    tx: mpsc::Sender<Settlement>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(ticket = ticket.id, via = dispatcher.name(), "dispatch started");
        let outcome = dispatcher.dispatch(&ticket.query).await;
        if tx.send(Settlement::new(&ticket, outcome)).await.is_err() {
            debug!(ticket = ticket.id, "settlement dropped: receiver closed");
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ragchat_client::{Answer, ScriptedDispatcher};

    use super::*;
    use crate::Session;

    #[tokio::test]
    async fn settlement_arrives_on_channel() {
        let d: Arc<dyn QueryDispatcher> = Arc::new(ScriptedDispatcher::always_text("Hi there"));
        let (tx, mut rx) = mpsc::channel(4);
        let mut s = Session::new();
        s.on_draft_change("Hello");
        let ticket = s.submit().unwrap();
        spawn_dispatch(d, ticket, tx);

        let settlement = rx.recv().await.unwrap();
        assert_eq!(settlement.outcome.as_ref().unwrap(), &Answer::text("Hi there"));
        assert!(s.settle(settlement));
        assert!(!s.is_busy());
    }

    #[tokio::test]
    async fn session_stays_busy_until_settled() {
        let d: Arc<dyn QueryDispatcher> = Arc::new(
            ScriptedDispatcher::always_text("late").with_delay(Duration::from_millis(50)),
        );
        let (tx, mut rx) = mpsc::channel(4);
        let mut s = Session::new();
        s.on_draft_change("q");
        let handle = spawn_dispatch(d, s.submit().unwrap(), tx);

        s.on_draft_change("again");
        assert!(s.submit().is_none());
        assert!(s.is_busy());

        handle.await.unwrap();
        assert!(s.settle(rx.recv().await.unwrap()));
        assert_eq!(s.log().len(), 2);
    }

    #[tokio::test]
    async fn closed_receiver_does_not_panic() {
        let d: Arc<dyn QueryDispatcher> = Arc::new(ScriptedDispatcher::always_text("x"));
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let ticket = DispatchTicket { id: 1, query: "q".into() };
        spawn_dispatch(d, ticket, tx).await.unwrap();
    }
}
