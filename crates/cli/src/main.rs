//! `ipo-watch`: fetch IPO listings, sort them into Upcoming / Open / Closed
//! and print the result.

mod app;
mod logging;

use anyhow::{Context, Result};
use app::RunOptions;
use chrono::DateTime;
use clap::{Parser, ValueEnum};
use ipo_core::{now_ms, Config, LifecycleStatus};
use ipo_report::RenderFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Track IPO subscription windows and grey market premiums")]
struct Cli {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which bucket to show
    #[arg(long, value_enum, default_value_t = StatusArg::All)]
    status: StatusArg,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,

    /// Feed URL (overrides config/env)
    #[arg(long)]
    url: Option<String>,

    /// Seed dataset used when the feed fails, or on its own with --offline
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Read the seed dataset only, without contacting the feed
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Classify as of this RFC 3339 instant instead of the current time
    #[arg(long)]
    now: Option<String>,

    /// Log level or filter directives (overrides config/env)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Colour GMP cells in text output
    #[arg(long, default_value_t = false)]
    color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatusArg {
    Upcoming,
    Open,
    Closed,
    All,
}

impl StatusArg {
    fn to_status(self) -> Option<LifecycleStatus> {
        match self {
            StatusArg::Upcoming => Some(LifecycleStatus::Upcoming),
            StatusArg::Open => Some(LifecycleStatus::Open),
            StatusArg::Closed => Some(LifecycleStatus::Closed),
            StatusArg::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Html,
    Json,
}

impl From<FormatArg> for RenderFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => RenderFormat::Text,
            FormatArg::Html => RenderFormat::Html,
            FormatArg::Json => RenderFormat::Json,
        }
    }
}

impl Cli {
    /// File, then environment, then flags.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        config.apply_env_overrides()?;
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.feed.url = url.clone();
        }
        if let Some(seed) = &self.seed {
            config.feed.seed_path = Some(seed.clone());
        }
        if self.offline {
            config.feed.live = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json = true;
        }
        if self.color {
            config.display.color = true;
        }
    }

    fn now(&self) -> Result<i64> {
        match &self.now {
            Some(text) => Ok(DateTime::parse_from_rfc3339(text)
                .with_context(|| format!("--now must be an RFC 3339 timestamp, got '{}'", text))?
                .timestamp_millis()),
            None => Ok(now_ms()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("invalid configuration")?;
    logging::setup_logging(&config.logging.level, config.logging.json);

    let options = RunOptions {
        status: cli.status.to_status(),
        format: cli.format.into(),
        now: cli.now()?,
    };
    tracing::info!(
        live = config.feed.live,
        url = %config.feed.url,
        rule = ?config.classification.rule,
        "starting IPO watch"
    );

    let output = app::run(&config, options).await?;
    print!("{}", output);
    Ok(())
}
