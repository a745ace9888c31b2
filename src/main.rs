mod bio;
mod error;
mod export;
mod http;
mod leaders;
mod model;
mod pipeline;
mod sanitize;
mod session;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::bio::BioScraper;
use crate::export::OutputFormat;
use crate::http::HttpTransport;
use crate::leaders::LeadersApi;
use crate::pipeline::{Pipeline, Selector};
use crate::session::{Authenticator, COOKIE_PATH};
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "leaders_scraper", about = "Country leaders + Wikipedia bios collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch leaders and their bios, then write them to disk
    Run {
        /// Output format
        #[arg(short = 't', long = "type", value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Output path (default: <output_dir>/leaders.<format>)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Only these country codes (repeatable)
        #[arg(short, long = "country")]
        countries: Vec<String>,
        /// Max leaders per country
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// No progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// List the country codes offered by the API
    Countries,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    info!(api = %settings.api_base_url, "Settings loaded");

    let transport = HttpTransport::new(settings.request_timeout(), &settings.user_agent)?;
    let pipeline = Pipeline::new(
        Authenticator::new(&transport, settings.endpoint(COOKIE_PATH), settings.token_ttl()),
        LeadersApi::new(&transport, &settings.api_base_url),
        BioScraper::new(&transport),
    );

    match cli.command {
        Commands::Countries => {
            for code in pipeline.countries()? {
                println!("{}", code);
            }
        }
        Commands::Run {
            format,
            out,
            countries,
            limit,
            quiet,
        } => {
            let path = out.unwrap_or_else(|| {
                settings
                    .output_dir
                    .join(format!("leaders.{}", format.extension()))
            });
            let selector = Selector { countries, limit };

            let (dataset, stats) = pipeline.with_progress(!quiet).run(&selector)?;
            export::write(&dataset, format, &path)?;

            println!(
                "Wrote {} leaders from {} countries to {} ({} bios, {} failed, {} without URL)",
                stats.leaders,
                stats.countries,
                path.display(),
                stats.bios,
                stats.failures,
                stats.missing_url
            );
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
