//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::connectivity::ConnectivityStatus;
use crate::query::SortKey;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything?q=football";

/// Browse NewsAPI articles in the terminal.
#[derive(Debug, Parser)]
#[command(name = "news-explorer", version, about)]
pub struct Config {
    /// NewsAPI key.
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Query URL without the key; must already carry its search parameters.
    #[arg(long, env = "NEWS_EXPLORER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Initial sort key.
    #[arg(long, value_enum, default_value_t = SortKey::Title)]
    pub sort: SortKey,

    /// Assume no network until the first reachability check says otherwise.
    #[arg(long)]
    pub start_offline: bool,

    /// `host:port` used to check reachability.
    #[arg(long, default_value = "newsapi.org:443")]
    pub probe_addr: String,

    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub probe_interval_secs: u64,

    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    pub probe_timeout_secs: u64,

    /// Whole-request timeout for article fetches.  Unset means no timeout.
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Log file; the terminal itself is taken by the UI.
    #[arg(long, env = "NEWS_EXPLORER_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn initial_connectivity(&self) -> ConnectivityStatus {
        if self.start_offline {
            ConnectivityStatus::Disconnected
        } else {
            ConnectivityStatus::Connected
        }
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("news-explorer.log"))
    }

    /// HTTP client shared by every fetch.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }
}
