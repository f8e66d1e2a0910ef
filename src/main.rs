// src/main.rs
mod chart;
mod config;
mod error;
mod palette;
mod record;
mod series;
mod web;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::chart::TrafficChart;
use crate::config::Settings;
use crate::record::RawRecord;

#[derive(Parser)]
#[command(name = "trafficviz")]
#[command(about = "API traffic records -> per-endpoint time-series chart", long_about = None)]
struct Cli {
    /// TOML settings file (chart titles, palette, data path, bind address)
    #[arg(long, global = true)]
    config: Option<String>,

    /// JSON array of raw records; overrides the settings file
    #[arg(long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the chart page and its JSON API
    Serve {
        /// Bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the chart configuration for a date range as JSON
    Render {
        /// Start of the range (exclusive)
        #[arg(long)]
        start: Option<String>,

        /// End of the range (exclusive)
        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        pretty: bool,
    },
}

fn load_dataset(settings: &Settings) -> Result<Vec<RawRecord>> {
    match &settings.data {
        Some(path) => record::load_records(path).with_context(|| format!("load {}", path)),
        None => record::sample_records().context("load bundled sample"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = config::load_settings(cli.config.as_deref())?;
    if cli.data.is_some() {
        settings.data = cli.data;
    }

    let records = load_dataset(&settings)?;
    let chart = TrafficChart::new(records, settings.palette, settings.chart);
    info!(labels = chart.labels().len(), "dataset ready");

    match cli.cmd {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or(settings.bind);
            let bind: SocketAddr = bind.parse().context("parse bind addr")?;
            web::serve(chart, bind).await?;
        }

        Command::Render { start, end, pretty } => {
            let mut chart = chart;
            if let Some(start) = start {
                chart.set_start_date(&start)?;
            }
            if let Some(end) = end {
                chart.set_end_date(&end)?;
            }

            let config = chart.config();
            let out = if pretty {
                serde_json::to_string_pretty(&config)?
            } else {
                serde_json::to_string(&config)?
            };
            println!("{}", out);
        }
    }

    Ok(())
}
