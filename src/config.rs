use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub board: BoardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the repair-shop REST API, e.g. https://shop.example.com/api
  pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
  /// How long success/error notifications stay visible
  #[serde(default = "default_toast_seconds")]
  pub toast_seconds: u64,
}

impl Default for BoardConfig {
  fn default() -> Self {
    Self {
      toast_seconds: default_toast_seconds(),
    }
  }
}

fn default_toast_seconds() -> u64 {
  4
}

impl BoardConfig {
  pub fn toast_duration(&self) -> Duration {
    Duration::from_secs(self.toast_seconds.max(1))
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./r9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/r9s/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/r9s/config.yaml\n\
                 with at least:\n\napi:\n  url: https://your-shop.example.com/api"
      )),
    }
  }

  /// Configuration with only an API URL, for running without a file
  pub fn from_url(url: String) -> Self {
    Self {
      api: ApiConfig { url },
      title: None,
      board: BoardConfig::default(),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("r9s.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("r9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Get the API bearer token from environment variables.
  ///
  /// Checks R9S_API_TOKEN first, then REPAIR_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("R9S_API_TOKEN")
      .or_else(|_| std::env::var("REPAIR_API_TOKEN"))
      .map_err(|_| {
        eyre!("API token not found. Set R9S_API_TOKEN or REPAIR_API_TOKEN environment variable.")
      })
  }
}
