use anyhow::Context;
use tokio::sync::{
    mpsc::{Sender, UnboundedReceiver},
    oneshot,
};

use crate::app::DashboardView;

mod core;
mod data;
mod message;
mod mock;

pub use self::core::restore;
pub use data::{UiEvent, map_event};
use message::Message;

/// The terminal actor.
///
/// Owns stdout while the dashboard runs: switches to the alternate screen in
/// raw mode, reads key and focus events on a dedicated thread and draws
/// [`DashboardView`] frames.
#[derive(Debug, Clone)]
pub enum Terminal {
    Actual(Sender<Message>),
    /// Records frames and replays events pushed by a test
    Mock(mock::Mock),
}

impl Terminal {
    pub fn spawn() -> anyhow::Result<Self> {
        let (terminal, _) = self::core::TerminalCore::build()?.spawn();
        Ok(terminal)
    }

    /// A terminal that never touches stdout. Events sent through the returned
    /// sender are delivered after [`Terminal::take_over`].
    pub fn mock() -> (Self, tokio::sync::mpsc::UnboundedSender<UiEvent>) {
        let (mock, events) = mock::Mock::new();
        (Self::Mock(mock), events)
    }

    async fn request<R>(
        sender: &Sender<Message>,
        message: impl FnOnce(oneshot::Sender<anyhow::Result<R>>) -> Message,
    ) -> anyhow::Result<R> {
        let (tx, rx) = oneshot::channel();
        sender
            .send(message(tx))
            .await
            .context("Sending message to Terminal actor")
            .expect("Terminal actor died");
        rx.await
            .context("Awaiting response from Terminal actor")
            .expect("Terminal actor died")
    }

    /// Enters the alternate screen and starts reading input.
    pub async fn take_over(&self) -> anyhow::Result<UnboundedReceiver<UiEvent>> {
        match self {
            Terminal::Actual(sender) => Self::request(sender, Message::TakeOver).await,
            Terminal::Mock(mock) => mock.take_over(),
        }
    }

    /// Stops reading input and gives the screen back to the shell.
    pub async fn release(&self) -> anyhow::Result<()> {
        match self {
            Terminal::Actual(sender) => Self::request(sender, Message::Release).await,
            Terminal::Mock(mock) => mock.release(),
        }
    }

    pub async fn draw(&self, view: DashboardView) -> anyhow::Result<()> {
        match self {
            Terminal::Actual(sender) => {
                Self::request(sender, |tx| Message::Draw {
                    view: Box::new(view),
                    tx,
                })
                .await
            }
            Terminal::Mock(mock) => {
                mock.draw(view);
                Ok(())
            }
        }
    }

    /// Frames drawn on a mock terminal, `None` for the real one.
    pub fn frames(&self) -> Option<Vec<DashboardView>> {
        match self {
            Terminal::Actual(_) => None,
            Terminal::Mock(mock) => Some(mock.frames()),
        }
    }
}
