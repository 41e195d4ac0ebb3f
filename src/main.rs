use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use line_monitor::monitor::config::MonitorConfig;
use line_monitor::monitor::poller::poll_ticks;
use line_monitor::monitor::supervisor;
use line_monitor::transport::status::fetch_status_document;
use line_monitor::utils;

#[derive(Parser)]
#[command(name = "line-monitor", version, about = "Monitoring client for a vision inspection station")]
struct AppCli {
    /// Config file path; defaults apply when the file does not exist
    #[arg(short, long, default_value = "monitor.json", global = true)]
    config: String,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the station status document and print it
    Status {
        /// Keep fetching at the poll interval
        #[arg(long, default_value_t = false)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::logging::init();

    let args = AppCli::parse();
    let config = MonitorConfig::load(&args.config)?;

    match args.command {
        Some(Commands::Status { watch }) => show_status(&config, watch).await?,
        None => {
            // Default: run the monitor until Ctrl-C
            supervisor::run(config).await?;
        }
    }

    Ok(())
}

/// One-shot (or repeated) status dump for operators.
async fn show_status(config: &MonitorConfig, watch: bool) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("building status http client")?;

    if !watch {
        let document = fetch_status_document(&client, &config.status_url).await?;
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    let mut ticks = poll_ticks(config.poll_interval());
    loop {
        ticks.tick().await;
        match fetch_status_document(&client, &config.status_url).await {
            Ok(document) => println!("{}", serde_json::to_string_pretty(&document)?),
            Err(error) => warn!(error = %error, "status fetch failed"),
        }
    }
}
