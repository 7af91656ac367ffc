use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "adwatch", about = "Ad performance monitoring and alerting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import daily ad rows from a JSON array file
    Import {
        /// Path to the JSON file
        file: String,
    },
    /// Evaluate the campaign: recommendations, funnel leaks, creative fatigue
    Evaluate {
        /// Evaluate as of this day (YYYY-MM-DD), default today (UTC)
        #[arg(long)]
        as_of: Option<String>,
        /// Also log strike-bearing recommendations to flag history
        #[arg(long)]
        record: bool,
    },
    /// Show one recommendation from the current campaign report
    Recommendation {
        id: String,
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Campaign report (cached for 30 minutes)
    Report {
        #[arg(long)]
        as_of: Option<String>,
        /// Drop the cached report first
        #[arg(long)]
        refresh: bool,
    },
    /// Show when the cached report was built and when it expires
    CacheStatus,
    /// Run the campaign alert checks once
    CheckAlerts,
    /// List recent alerts
    Alerts {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Mark an alert resolved so the same type can fire again
    AlertResolve { id: String },
    /// Strike history, newest first
    Flags {
        #[arg(long)]
        ad: Option<String>,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Evaluate, record flags and check alerts; repeat with --every
    Run {
        /// Minutes between cycles. Runs once when omitted.
        #[arg(long)]
        every: Option<u64>,
    },
}
