use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `r9s=debug`)
pub const LOG_ENV: &str = "R9S_LOG";
const LOG_FILE: &str = "r9s.log";

/// Directory the log file is written to
pub fn log_dir() -> Result<PathBuf> {
  dirs::data_dir()
    .map(|dir| dir.join("r9s"))
    .ok_or_else(|| eyre!("Could not determine data directory for the log file"))
}

/// Filter from `R9S_LOG`, falling back to `info`
fn env_filter() -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Route tracing output to a file; the terminal belongs to the UI.
///
/// Keep the returned guard alive for the whole run, or buffered lines are
/// lost on exit.
pub fn init() -> Result<WorkerGuard> {
  let dir = log_dir()?;
  std::fs::create_dir_all(&dir)?;

  let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter())
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}
