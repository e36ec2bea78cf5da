use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use logidash::{
    ArcPath, ArcStr,
    app::{App, Command},
    config::{Config, PathOpt, StrOpt, USizeOpt},
    log::Log,
    terminal::Terminal,
    utils::install_panic_hook,
};

const SCOPE: &str = "main";

#[derive(Parser)]
#[command(name = "logidash")]
#[command(about = "Terminal dashboard for the logistics backend", version)]
struct Cli {
    /// Configuration file, defaults to ~/.config/logidash/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Backend base URL, overrides the configuration file
    #[arg(long, global = true, env = "LOGIDASH_API_URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full-screen dashboard that keeps every panel fresh (default)
    Watch,
    /// Print the overview statistics once
    Overview,
    /// Print the chart series once
    Charts,
    /// Print the most recent activities once
    Activities {
        /// Number of activities, between 1 and 100
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Probe the backend health endpoint
    Health,
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME is not set, pass --config")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("logidash")
        .join("config.toml"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    install_panic_hook();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = Config::spawn(ArcPath::from(&config_path));
    config.load().await?;
    if let Some(api_url) = cli.api_url {
        config.set_str(StrOpt::ApiUrl, ArcStr::from(api_url)).await;
    }
    let data = config.snapshot().await;
    data.validate().context("Invalid --api-url")?;

    let log = Log::spawn(
        data.log_level(),
        data.usize(USizeOpt::MaxAge),
        data.path(PathOpt::LogDir),
    )
    .await?;
    log.collect_garbage().await;
    log.info(SCOPE, format!("Using backend {}", data.str(StrOpt::ApiUrl)));

    let app = App::build(&data, log.clone())?;
    let result = match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => {
            let terminal = Terminal::spawn()?;
            app.watch(&terminal).await
        }
        Commands::Overview => app.resolve(Command::Overview, &mut std::io::stdout()).await,
        Commands::Charts => app.resolve(Command::Charts, &mut std::io::stdout()).await,
        Commands::Activities { limit } => {
            app.resolve(Command::Activities { limit }, &mut std::io::stdout())
                .await
        }
        Commands::Health => app.resolve(Command::Health, &mut std::io::stdout()).await,
    };

    let result = log.error_on_error(SCOPE, result);
    log.flush().await;
    result
}
