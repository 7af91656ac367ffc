use adwatch::cli::commands::{Cli, Commands};
use adwatch::config::Config;
use adwatch::AdWatch;
use chrono::NaiveDate;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let aw = match AdWatch::new(&config) {
        Ok(aw) => aw,
        Err(e) => {
            eprintln!("Error initializing adwatch: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(aw, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(aw: AdWatch, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            let rows = adwatch::application::import::ImportUseCase::parse(&json)?;
            let summary = aw.import_rows(rows)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Evaluate { as_of, record } => {
            let report = aw.evaluate_as_of(parse_day(&as_of)?).await;
            if record {
                let flags = aw.record_flags(&report)?;
                eprintln!(
                    "Recorded {} flags ({} already logged)",
                    flags.recorded, flags.duplicates
                );
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Recommendation { id, as_of } => {
            let report = aw.campaign_report_as_of(parse_day(&as_of)?).await;
            let rec = report
                .evaluation
                .find_recommendation(&id)
                .ok_or_else(|| format!("Recommendation not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(rec)?);
        }
        Commands::Report { as_of, refresh } => {
            if refresh {
                aw.invalidate_report();
            }
            let report = aw.campaign_report_as_of(parse_day(&as_of)?).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::CacheStatus => match aw.report_cache_metadata() {
            Some(meta) => println!("{}", serde_json::to_string_pretty(&meta)?),
            None => println!("No cached report"),
        },
        Commands::CheckAlerts => {
            let report = aw.dispatch_alerts().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Alerts { limit } => {
            let alerts = aw.recent_alerts(limit)?;
            println!("{}", serde_json::to_string_pretty(&alerts)?);
        }
        Commands::AlertResolve { id } => {
            aw.resolve_alert(&id)?;
            println!("Alert {id} resolved");
        }
        Commands::Flags { ad, limit } => {
            let flags = aw.flag_history(ad, Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&flags)?);
        }
        Commands::Run { every } => match every {
            None => {
                let summary = aw.run_cycle().await;
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            Some(minutes) => {
                let mut ticker = tokio::time::interval(Duration::from_secs(minutes.max(1) * 60));
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            aw.run_cycle().await;
                        }
                        _ = tokio::signal::ctrl_c() => {
                            tracing::info!("shutting down");
                            break;
                        }
                    }
                }
            }
        },
    }
    Ok(())
}

fn parse_day(s: &Option<String>) -> Result<NaiveDate, String> {
    match s {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| format!("Invalid date '{s}': {e}. Use YYYY-MM-DD")),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}
