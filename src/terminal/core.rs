use std::{
    io::{Stdout, stdout},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use anyhow::bail;
use ratatui::{
    crossterm::{
        event::{self, DisableFocusChange, EnableFocusChange},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::CrosstermBackend,
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

use super::{Terminal, UiEvent, map_event, message::Message};
use crate::app::{DashboardView, ui};

/// How long the reader thread blocks before checking whether it should stop.
const POLL_PERIOD: Duration = Duration::from_millis(100);

/// Puts the terminal back into cooked mode on the main screen. Safe to call
/// when it was never taken over.
pub fn restore() {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), DisableFocusChange, LeaveAlternateScreen);
}

/// Reads crossterm events on a blocking thread until stopped or the
/// receiving side is gone.
#[derive(Debug)]
struct EventReader {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

impl EventReader {
    fn start(tx: UnboundedSender<UiEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stopped = stop.clone();
        let handle = thread::spawn(move || {
            while !stopped.load(Ordering::Relaxed) {
                match event::poll(POLL_PERIOD) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                let Ok(raw) = event::read() else {
                    break;
                };
                let Some(event) = map_event(raw) else {
                    continue;
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
        Self { stop, handle }
    }

    fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.handle.join();
    }
}

pub struct TerminalCore {
    taken_over: bool,
    terminal: ratatui::Terminal<CrosstermBackend<Stdout>>,
    reader: Option<EventReader>,
}

impl TerminalCore {
    pub fn build() -> anyhow::Result<Self> {
        let terminal = ratatui::Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self {
            taken_over: false,
            terminal,
            reader: None,
        })
    }

    pub fn spawn(mut self) -> (Terminal, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::TakeOver(tx) => {
                        let _ = tx.send(self.take_over());
                    }
                    Message::Release(tx) => {
                        let _ = tx.send(self.release());
                    }
                    Message::Draw { view, tx } => {
                        let _ = tx.send(self.draw(&view));
                    }
                }
            }
            if self.taken_over {
                let _ = self.release();
            }
        });
        (Terminal::Actual(tx), handle)
    }

    fn take_over(&mut self) -> anyhow::Result<UnboundedReceiver<UiEvent>> {
        if self.taken_over {
            bail!("Terminal already taken over");
        }
        execute!(
            self.terminal.backend_mut(),
            EnterAlternateScreen,
            EnableFocusChange
        )?;
        enable_raw_mode()?;
        self.terminal.clear()?;
        self.taken_over = true;

        let (tx, rx) = mpsc::unbounded_channel();
        self.reader = Some(EventReader::start(tx));
        Ok(rx)
    }

    fn release(&mut self) -> anyhow::Result<()> {
        if !self.taken_over {
            bail!("Terminal not taken over");
        }
        self.taken_over = false;
        if let Some(reader) = self.reader.take() {
            reader.stop();
        }
        execute!(
            self.terminal.backend_mut(),
            DisableFocusChange,
            LeaveAlternateScreen
        )?;
        disable_raw_mode()?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn draw(&mut self, view: &DashboardView) -> anyhow::Result<()> {
        if !self.taken_over {
            bail!("Terminal not taken over");
        }
        self.terminal.draw(|frame| ui::draw(frame, view))?;
        Ok(())
    }
}
