#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the Texas traffic stop dashboard.
//!
//! `tx_stops summary` renders the same snapshot the web page receives,
//! `tx_stops views` lists the registered views, and `tx_stops serve`
//! starts the API server. Without a subcommand an interactive menu is
//! shown.
//!
//! Uses `indicatif-log-bridge` (via [`tx_stops_cli_utils::init_logger`])
//! so log lines and the dataset progress bar share the terminal.

mod interactive;
mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tx_stops_analytics::filter::parse_category_param;
use tx_stops_analytics::{Dashboard, DashboardConfig, DashboardParams};
use tx_stops_analytics_models::{StopFilter, TimeGranularity, ViewName, ViewParams};
use tx_stops_cli_utils::{IndicatifProgress, MultiProgress};
use tx_stops_server::ServerConfig;
use tx_stops_source::RowLimit;

#[derive(Parser)]
#[command(name = "tx_stops", about = "Texas traffic stop dashboard tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where to read stops from. Unset values fall back to the environment.
#[derive(Args)]
struct DatasetArgs {
    /// Dataset CSV (overrides `TX_STOPS_DATASET`)
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Row count a fractional limit is a fraction of (overrides `TX_STOPS_MAX_ROWS`)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_rows: Option<u64>,
    /// Label override TOML (overrides `TX_STOPS_LABELS`)
    #[arg(long)]
    labels: Option<PathBuf>,
}

impl DatasetArgs {
    fn into_config(self) -> DashboardConfig {
        let mut config = DashboardConfig::from_env();
        if let Some(dataset) = self.dataset {
            config.dataset = dataset;
        }
        if let Some(max_rows) = self.max_rows {
            config.max_rows = max_rows;
        }
        if self.labels.is_some() {
            config.labels = self.labels;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render dashboard cards and views for one set of control values
    Summary {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Row limit: a fraction in (0, 1] or an absolute row count
        #[arg(long, default_value = "1000")]
        limit: RowLimit,
        /// Comma-separated view names (default: every view)
        #[arg(long)]
        views: Option<String>,
        /// Granularity for `tickets_over_time` (hours, days, months, years)
        #[arg(long, default_value = "years")]
        period: TimeGranularity,
        /// Race shown by `gender_by_race`, as a code or label
        #[arg(long, default_value = "White")]
        selected_race: String,
        /// Number of counties in `county_ranking`
        #[arg(long, default_value = "30")]
        top_n: usize,
        /// Only stops of this race (code or label)
        #[arg(long)]
        race: Option<String>,
        /// Only stops of this sex (code or label)
        #[arg(long)]
        sex: Option<String>,
        /// Only stops for this violation (code or label)
        #[arg(long)]
        violation: Option<String>,
        /// Only stops in this county
        #[arg(long)]
        county: Option<String>,
        /// Only stops in this year
        #[arg(long)]
        year: Option<i32>,
        /// Only stops in this month (1-12)
        #[arg(long)]
        month: Option<u32>,
        /// Only stops where a search was (or was not) conducted
        #[arg(long)]
        searched: Option<bool>,
        /// Maximum number of map points in JSON output
        #[arg(long, default_value = "1000")]
        point_limit: usize,
        /// Print the snapshot as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the registered views
    Views,
    /// Start the API server
    Serve {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind_addr: Option<String>,
        /// Port to bind (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Builds a dashboard that draws its load progress on `multi`.
fn dashboard(
    config: DashboardConfig,
    multi: &MultiProgress,
) -> Result<Dashboard, Box<dyn std::error::Error>> {
    Ok(Dashboard::new(config)?
        .with_progress(IndicatifProgress::records_bar(multi, "Loading stops")))
}

fn print_views() {
    for view in ViewName::all() {
        println!("{:<24} {}", view.to_string(), view.title());
    }
}

fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    actix_web::rt::System::new().block_on(tx_stops_server::run_server(config))?;
    Ok(())
}

#[allow(clippy::too_many_lines)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = tx_stops_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Summary {
            dataset,
            limit,
            views,
            period,
            selected_race,
            top_n,
            race,
            sex,
            violation,
            county,
            year,
            month,
            searched,
            point_limit,
            json,
        } => {
            let dashboard = dashboard(dataset.into_config(), &multi)?;

            let params = DashboardParams {
                limit,
                views: views
                    .as_deref()
                    .map(tx_stops_server::params::split_list)
                    .unwrap_or_default(),
                filter: StopFilter {
                    race: race.as_deref().and_then(parse_category_param),
                    sex: sex.as_deref().and_then(parse_category_param),
                    violation: violation.as_deref().and_then(parse_category_param),
                    county,
                    year,
                    month,
                    search_conducted: searched,
                },
                view: ViewParams {
                    period,
                    selected_race: parse_category_param(&selected_race)
                        .unwrap_or_else(|| ViewParams::default().selected_race),
                    top_n,
                },
                point_limit: Some(point_limit),
            };

            let snapshot = dashboard.render(&params)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", report::format_snapshot(&snapshot));
            }
        }
        Commands::Views => print_views(),
        Commands::Serve {
            dataset,
            bind_addr,
            port,
        } => {
            let mut config = ServerConfig::from_env();
            config.dashboard = dataset.into_config();
            if let Some(bind_addr) = bind_addr {
                config.bind_addr = bind_addr;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config)?;
        }
    }

    Ok(())
}
