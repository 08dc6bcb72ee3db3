//! NGS Dashboard CLI
//!
//! Terminal client for the sample API:
//! - List samples
//! - Show a sample's runs
//! - Search by run metadata
//! - Check backend health
//! - Generate a config file

use clap::{Parser, Subcommand};
use ngs_dashboard::config::generate_default_config;
use ngs_dashboard::views::{metadata_entries, truncate_hash};
use ngs_dashboard::{
    ApiClient, BackendConfig, Config, ListSamplesParams, MetadataSearchParams, Sample,
    SampleSource,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ngs-dashboard-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse NGS samples and runs from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sample API base URL (default: from config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// API key sent as X-API-Key (default: from config)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List samples
    Samples {
        /// Number of samples to skip
        #[arg(long, default_value = "0")]
        skip: u32,

        /// Page size (1-100)
        #[arg(short, long, default_value = "50")]
        limit: u32,

        /// Only samples with a run of this assay type
        #[arg(short = 'a', long)]
        assay_type: Option<String>,
    },

    /// Show one sample and its runs
    Show {
        /// Sample ID
        sample_id: String,
    },

    /// Search samples by a run metadata key/value pair
    Search {
        /// Metadata key (e.g. sequencer)
        key: String,
        /// Metadata value
        value: String,
    },

    /// Check sample API health
    Health,

    /// Print or write a default config file
    Config {
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_default();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ngs_dashboard=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Commands::Config { output } = &cli.command {
        let template = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                println!("Wrote {}", path.display());
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let client = ApiClient::new(backend_config(&cli, config.backend))?;
    let json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::Samples {
            skip,
            limit,
            assay_type,
        } => {
            let params = ListSamplesParams {
                skip,
                limit,
                assay_type,
            }
            .normalized();
            let samples = client.list_samples(&params).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&samples)?);
            } else {
                print_samples(&samples);
            }
        }

        Commands::Show { sample_id } => {
            let sample = match client.get_sample(&sample_id).await {
                Ok(sample) => sample,
                Err(e) if e.is_not_found() => {
                    eprintln!("Sample {} not found", sample_id);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&sample)?);
            } else {
                print_sample(&sample);
            }
        }

        Commands::Search { key, value } => {
            let samples = client
                .search_by_metadata(&MetadataSearchParams::new(key, value))
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&samples)?);
            } else {
                print_samples(&samples);
            }
        }

        Commands::Health => match client.health().await {
            Ok(health) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&health)?);
                } else {
                    println!("Sample API: {}", client.config().base_url);
                    println!("Status:     {}", health.status);
                    println!("Database:   {}", health.database.as_deref().unwrap_or("-"));
                }
            }
            Err(e) => {
                eprintln!("Sample API unhealthy: {}", e);
                std::process::exit(1);
            }
        },

        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Command-line flags win over the config file
fn backend_config(cli: &Cli, mut backend: BackendConfig) -> BackendConfig {
    if let Some(url) = &cli.api_url {
        backend.base_url = url.clone();
    }
    if let Some(key) = &cli.api_key {
        backend = backend.with_api_key(key.clone());
    }
    backend
}

fn print_samples(samples: &[Sample]) {
    if samples.is_empty() {
        println!("No samples");
        return;
    }

    println!("{:<20} | {:<16} | Runs", "Sample ID", "Patient Hash");
    println!("{}", "-".repeat(60));

    for sample in samples {
        let assays: Vec<&str> = sample.runs.iter().map(|r| r.assay_type.as_str()).collect();
        println!(
            "{:<20} | {:<16} | {}",
            sample.sample_id,
            truncate_hash(&sample.patient_hash),
            assays.join(", ")
        );
    }
}

fn print_sample(sample: &Sample) {
    println!("Sample:       {}", sample.sample_id);
    println!("Patient hash: {}", sample.patient_hash);
    if let Some(created) = sample.created_at {
        println!("Created:      {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    for run in &sample.runs {
        println!();
        println!("Run {} ({})", run.run_id, run.assay_type);

        for entry in metadata_entries(&run.metadata_col) {
            println!("  {:<20} {}", entry.label, entry.value);
        }

        let meta = &run.metadata_col;
        println!(
            "  {:<20} {} coverage / {} quality points",
            "profiles",
            meta.coverage_or_empty().len(),
            meta.quality_or_empty().len()
        );

        for file in &run.files {
            println!("  {:<20} {}", file.file_type, file.s3_uri);
        }
    }
}
