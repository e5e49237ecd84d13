//! ChurnInsight command line
//!
//! Runs churn predictions against the ML service and queries the local
//! prediction history. Results are printed to stdout as JSON; logs go to
//! stderr.
//!
//! # Usage
//! ```sh
//! churninsight predict --customer-id user-123 --subscription Basic --fee 8.99 \
//!     --watch-hours 3 --last-login-days 45 --profiles 1 --avg-daily 0.2 --payment Crypto
//! churninsight explain user-123
//! churninsight history latest
//! ```
//!
//! # Environment Variables
//! - `ML_SERVICE_BASE_URL` - ML service address (default: http://localhost:8000)
//! - `DATABASE_URL` - Prediction history database (default: sqlite://data/churninsight.db)
//! - `RUST_LOG` - Log filter (default: info)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use churninsight::application::ChurnInsight;
use churninsight::config::Config;
use churninsight::domain::customer::{CustomerFeatures, PredictionRequest};
use churninsight::domain::history::PageRequest;
use churninsight::domain::risk_tier::RiskTier;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Churn prediction and risk explainability", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict churn for one customer and record the result
    Predict(PredictArgs),
    /// Explain the risk of a customer's latest prediction
    Explain {
        customer_id: String,
    },
    /// Retention suggestion for a customer's latest prediction
    Recommend {
        customer_id: String,
    },
    /// Churn KPIs over the latest prediction of every customer
    Kpis,
    /// Browse the prediction history
    History {
        #[command(subcommand)]
        query: HistoryQuery,
    },
    /// Delete the whole prediction history
    Clear {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Report backend and ML service status
    Health {
        /// Skip probing the ML service
        #[arg(long)]
        basic: bool,
    },
}

#[derive(Subcommand)]
enum HistoryQuery {
    /// Latest prediction of each customer
    Latest,
    /// All predictions, newest first
    All(PageArgs),
    /// Predictions of one customer
    Customer {
        customer_id: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Predictions created between two RFC 3339 instants (inclusive)
    Range {
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: DateTime<Utc>,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Args)]
struct PageArgs {
    /// Zero-based page index
    #[arg(long, default_value = "0")]
    page: u32,

    #[arg(long, default_value = "20")]
    size: u32,
}

impl PageArgs {
    fn request(&self) -> Result<PageRequest> {
        Ok(PageRequest::new(self.page, self.size)?)
    }
}

#[derive(Args)]
struct PredictArgs {
    /// JSON file holding a full prediction request
    #[arg(long, conflicts_with_all = ["customer_id", "subscription"])]
    file: Option<PathBuf>,

    #[arg(long, required_unless_present = "file")]
    customer_id: Option<String>,

    /// Basic, Standard or Premium
    #[arg(long, required_unless_present = "file")]
    subscription: Option<String>,

    /// Monthly fee; defaults to the plan price
    #[arg(long)]
    fee: Option<f64>,

    #[arg(long, default_value = "0")]
    watch_hours: f64,

    #[arg(long, default_value = "0")]
    last_login_days: u32,

    #[arg(long, default_value = "1")]
    profiles: u8,

    /// Average watch time per day, in hours
    #[arg(long, default_value = "0")]
    avg_daily: f64,

    /// Credit Card, Debit Card, PayPal, Gift Card or Crypto
    #[arg(long, default_value = "Credit Card")]
    payment: String,
}

impl PredictArgs {
    fn into_request(self) -> Result<PredictionRequest> {
        let request = match self.file {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str::<PredictionRequest>(&raw)
                    .with_context(|| format!("Invalid prediction request in {}", path.display()))?
            }
            None => {
                let subscription_type = self.subscription.unwrap_or_default().parse()?;
                let features = CustomerFeatures {
                    subscription_type,
                    watch_hours: self.watch_hours,
                    last_login_days: self.last_login_days,
                    monthly_fee: self.fee.unwrap_or_else(|| subscription_type.price()),
                    number_of_profiles: self.profiles,
                    avg_watch_time_per_day: self.avg_daily,
                    payment_method: self.payment.parse()?,
                };
                PredictionRequest::new(self.customer_id.unwrap_or_default(), features)
            }
        };

        request.validate()?;
        Ok(request)
    }
}

#[derive(Serialize)]
struct PredictionOutput {
    customer_id: String,
    label: String,
    probability: f64,
    interpretation: &'static str,
    risk_tier: &'static str,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `RUST_LOG` when it parses, `info` otherwise
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();

    if let Commands::Health { basic: true } = cli.command {
        return print_json(&churninsight::application::health::HealthReport::basic());
    }

    let config = Config::from_env()?;
    let app = ChurnInsight::build(&config).await?;

    match cli.command {
        Commands::Predict(args) => {
            let request = args.into_request()?;
            info!(
                "Predicting churn for {} (worst case {:?})",
                request.customer_id,
                app.worst_case_latency()
            );

            let cancel = async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            let result = app.predict_with_cancel(&request, cancel).await?;

            if let Some(metrics) = app.metrics() {
                debug!("Prediction metrics:\n{}", metrics.encode()?);
            }

            print_json(&PredictionOutput {
                customer_id: request.customer_id,
                label: result.label.to_string(),
                probability: result.probability,
                interpretation: result.label.interpretation(),
                risk_tier: RiskTier::classify(result.probability).label(),
            })?;
        }
        Commands::Explain { customer_id } => {
            print_json(&app.explain(&customer_id).await?)?;
        }
        Commands::Recommend { customer_id } => {
            let suggestion = app.recommend_latest(&customer_id).await?;
            print_json(&serde_json::json!({
                "customer_id": customer_id,
                "recommendation": suggestion,
            }))?;
        }
        Commands::Kpis => {
            print_json(&app.compute_kpis().await?)?;
        }
        Commands::History { query } => {
            let entries = match query {
                HistoryQuery::Latest => app.latest_per_customer().await?,
                HistoryQuery::All(page) => app.list_history(page.request()?).await?,
                HistoryQuery::Customer { customer_id, page } => {
                    app.list_history_by_customer(&customer_id, page.request()?)
                        .await?
                }
                HistoryQuery::Range { start, end, page } => {
                    app.list_history_by_range(start, end, page.request()?)
                        .await?
                }
            };
            print_json(&entries)?;
        }
        Commands::Clear { yes } => {
            anyhow::ensure!(yes, "Refusing to clear the prediction history without --yes");
            let removed = app.clear_history().await?;
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
        Commands::Health { .. } => {
            print_json(&app.health().await)?;
        }
    }

    Ok(())
}
