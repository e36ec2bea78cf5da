use std::{io::Write, sync::Arc};

use anyhow::Context;

use crate::{
    ArcStr,
    api::DashboardApi,
    config::{Data, DurationOpt, StrOpt},
    log::Log,
    net::Net,
    terminal::Terminal,
};

mod core;
mod dashboard;
mod data;
#[cfg(test)]
mod tests;
mod text;
pub mod ui;

pub use dashboard::Dashboard;
pub use data::{Command, DashboardSettings, DashboardView, Resource, ResourceKind, ResourceView};

/// Wires the networking, API and synchronization actors together and runs
/// either a one-shot command or the interactive dashboard.
///
/// # Examples
/// ```ignore
/// let app = App::build(&config.snapshot().await, log.clone())?;
/// app.resolve(Command::Overview, &mut std::io::stdout()).await?;
/// ```
#[derive(Clone)]
pub struct App {
    core: Arc<self::core::Core>,
}

impl App {
    /// Spawns the actors described by a validated configuration.
    pub fn build(config: &Data, log: Log) -> anyhow::Result<Self> {
        let net = Net::spawn(log.clone(), config.duration(DurationOpt::Timeout))
            .context("Building the HTTP client")?;
        let api_url = config.str(StrOpt::ApiUrl);
        let api = DashboardApi::spawn(net, api_url.clone());
        Ok(Self::with_api(
            log,
            api,
            api_url,
            DashboardSettings::from_config(config),
        ))
    }

    /// Builds the app on top of an existing API actor, typically a mock.
    pub fn with_api(log: Log, api: DashboardApi, api_url: ArcStr, settings: DashboardSettings) -> Self {
        let core = self::core::Core::new(log, api, api_url, settings);
        Self {
            core: Arc::new(core),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        self.core.dashboard()
    }

    /// Runs a one-shot command, writing its report to `out`. Fails when the
    /// resource could not be loaded at all.
    pub async fn resolve<W: Write>(&self, command: Command, out: &mut W) -> anyhow::Result<()> {
        let report = match command {
            Command::Overview => self.core.handle_overview_command().await?,
            Command::Charts => self.core.handle_charts_command().await?,
            Command::Activities { limit } => self.core.handle_activities_command(limit).await?,
            Command::Health => self.core.handle_health_command().await?,
        };
        out.write_all(report.as_bytes())
            .context("Writing report to stdout")?;
        out.flush().context("Flushing stdout")
    }

    /// Runs the full-screen dashboard until the user quits. The terminal is
    /// released even when the loop fails.
    pub async fn watch(&self, terminal: &Terminal) -> anyhow::Result<()> {
        let events = terminal.take_over().await?;
        let result = self.core.run_interactive(terminal, events).await;
        let released = terminal.release().await;
        result.and(released)
    }
}
