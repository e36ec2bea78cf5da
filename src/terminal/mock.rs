use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::UiEvent;
use crate::app::DashboardView;

#[derive(Debug, Default)]
struct State {
    events: Option<UnboundedReceiver<UiEvent>>,
    taken_over: bool,
    frames: Vec<DashboardView>,
}

#[derive(Debug, Clone)]
pub struct Mock {
    state: Arc<Mutex<State>>,
}

impl Mock {
    pub fn new() -> (Self, UnboundedSender<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = State {
            events: Some(rx),
            ..Default::default()
        };
        (
            Self {
                state: Arc::new(Mutex::new(state)),
            },
            tx,
        )
    }

    pub fn take_over(&self) -> anyhow::Result<UnboundedReceiver<UiEvent>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("Terminal mock poisoned"))?;
        if state.taken_over {
            bail!("Terminal already taken over");
        }
        state.taken_over = true;
        state
            .events
            .take()
            .ok_or_else(|| anyhow!("Terminal mock events already consumed"))
    }

    pub fn release(&self) -> anyhow::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("Terminal mock poisoned"))?;
        if !state.taken_over {
            bail!("Terminal not taken over");
        }
        state.taken_over = false;
        Ok(())
    }

    pub fn draw(&self, view: DashboardView) {
        if let Ok(mut state) = self.state.lock() {
            state.frames.push(view);
        }
    }

    pub fn frames(&self) -> Vec<DashboardView> {
        self.state
            .lock()
            .map(|state| state.frames.clone())
            .unwrap_or_default()
    }
}
