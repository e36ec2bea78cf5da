use tokio::sync::{mpsc::UnboundedReceiver, oneshot};

use super::UiEvent;
use crate::app::DashboardView;

#[derive(Debug)]
pub enum Message {
    TakeOver(oneshot::Sender<anyhow::Result<UnboundedReceiver<UiEvent>>>),
    Release(oneshot::Sender<anyhow::Result<()>>),
    Draw {
        view: Box<DashboardView>,
        tx: oneshot::Sender<anyhow::Result<()>>,
    },
}
