use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sevwatch",
    about = "Anomaly accumulation and incident severity monitor",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon (poll loop + metrics/status API)
    Serve {
        /// Bind address for the HTTP API
        #[arg(long, default_value = "0.0.0.0:8110")]
        bind: String,

        /// Path to the TOML config file (built-in defaults if omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a single poll cycle and print the resulting snapshot
    Check {
        /// Path to the TOML config file (built-in defaults if omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a config file, then exit
    Validate {
        /// Path to the TOML config file
        #[arg(long)]
        config: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<sevwatch::config::Config> {
    match path {
        Some(p) => sevwatch::config::Config::load(p),
        None => {
            let config = sevwatch::config::Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, config } => {
            let config = load_config(config.as_ref())?;
            tracing::info!(%bind, signals = config.signals.len(), "Starting sevwatch daemon");
            sevwatch::serve(&bind, config).await?;
        }
        Commands::Check { config, json } => {
            let config = load_config(config.as_ref())?;
            tracing::info!(signals = config.signals.len(), "Running single poll cycle");

            let registry = sevwatch::metrics::GaugeRegistry::for_incidents();
            let mut engine = sevwatch::detect::IncidentEngine::from_config(
                &config,
                std::sync::Arc::new(registry),
            );
            let snapshot = engine.run_cycle().await;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("\nsevwatch cycle @ {}", snapshot.timestamp.to_rfc3339());
                println!("{:<24} | {:<10} | Accumulator", "Signal", "Reading");
                println!("{:-<24}-|-{:-<10}-|-{:-<12}", "", "", "");
                for signal in &snapshot.signals {
                    let reading = match signal.reading {
                        Some(r) => format!("{r}"),
                        None => "held".to_string(),
                    };
                    println!(
                        "{:<24} | {:<10} | {}",
                        signal.name, reading, signal.accumulator
                    );
                }
                println!(
                    "\nTemperature: {}  Severity: {}\n",
                    snapshot.temperature, snapshot.severity
                );
            }
        }
        Commands::Validate { config } => {
            let loaded = sevwatch::config::Config::load(&config)?;
            println!(
                "Config OK: {} signal(s), threshold {}, cap {}, every {}s",
                loaded.signals.len(),
                loaded.threshold,
                loaded.temperature_cap,
                loaded.poll_interval_secs
            );
        }
    }

    Ok(())
}
