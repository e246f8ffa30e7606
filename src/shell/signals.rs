//! Termination signals
//!
//! SIGTERM and SIGINT close the dialog through the same path as Escape.

use iced::Subscription;
use iced::futures::{SinkExt, Stream};
use tokio::signal::unix::{SignalKind, signal};
use tracing::warn;

use crate::shell::Message;

pub fn subscription() -> Subscription<Message> {
    Subscription::run(termination)
}

fn termination() -> impl Stream<Item = Message> {
    iced::stream::channel(1, |mut output| async move {
        let (mut term, mut int) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to install signal handlers: {}", e);
                return;
            }
        };

        let name = tokio::select! {
            _ = term.recv() => "SIGTERM",
            _ = int.recv() => "SIGINT",
        };

        let _ = output.send(Message::Signal(name)).await;
        std::future::pending::<()>().await;
    })
}
