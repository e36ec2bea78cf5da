use tokio::sync::oneshot::Sender;

use super::data::FetchError;
use crate::ArcStr;

/// Messages understood by the networking actor.
#[derive(Debug)]
pub enum Message {
    /// Performs an HTTP GET request and replies with the body
    Get {
        url: ArcStr,
        tx: Sender<Result<ArcStr, FetchError>>,
    },
}
