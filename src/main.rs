mod app;
mod commands;
mod config;
mod event;
mod logging;
mod query;
mod shop;
mod ui;
mod workflow;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "r9s")]
#[command(about = "A terminal UI for repair-shop tickets")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./r9s.yaml, then $XDG_CONFIG_HOME/r9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Repair-shop API base URL, overrides api.url from the config file
  #[arg(short, long)]
  url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Keep the guard alive so buffered log lines are flushed on exit
  let _log_guard = logging::init()?;

  // Load configuration; a --url alone is enough to run without a file
  let config = match (config::Config::load(args.config.as_deref()), args.url) {
    (Ok(config), Some(url)) => config::Config {
      api: config::ApiConfig { url },
      ..config
    },
    (Ok(config), None) => config,
    (Err(_), Some(url)) if args.config.is_none() => config::Config::from_url(url),
    (Err(e), _) => return Err(e),
  };

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
