//! Menu-driven mode, shown when `tx_stops` runs without a subcommand.

use dialoguer::{Input, MultiSelect, Select};
use tx_stops_analytics::{DashboardConfig, DashboardParams};
use tx_stops_analytics_models::{TimeGranularity, ViewName, ViewParams};
use tx_stops_cli_utils::MultiProgress;
use tx_stops_source::RowLimit;

use crate::report::format_snapshot;

/// Top-level actions.
enum Action {
    Summary,
    ListViews,
    Server,
}

impl Action {
    const ALL: &[Self] = &[Self::Summary, Self::ListViews, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Summary => "Render dashboard summary",
            Self::ListViews => "List views",
            Self::Server => "Start server",
        }
    }
}

fn prompt_limit() -> Result<RowLimit, Box<dyn std::error::Error>> {
    loop {
        let raw: String = Input::new()
            .with_prompt("Row limit (fraction in (0, 1] or row count)")
            .default(RowLimit::default().to_string())
            .interact_text()?;

        match raw.parse::<RowLimit>() {
            Ok(limit) => return Ok(limit),
            Err(e) => println!("{e}"),
        }
    }
}

fn prompt_views() -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let titles: Vec<&str> = ViewName::all().iter().map(|v| v.title()).collect();
    let defaults = vec![true; titles.len()];

    let selected = MultiSelect::new()
        .with_prompt("Views (space to toggle)")
        .items(&titles)
        .defaults(&defaults)
        .interact()?;

    Ok(selected
        .into_iter()
        .map(|i| ViewName::all()[i].to_string())
        .collect())
}

fn prompt_period() -> Result<TimeGranularity, Box<dyn std::error::Error>> {
    let periods = TimeGranularity::all();
    let labels: Vec<String> = periods.iter().map(ToString::to_string).collect();
    let default = periods
        .iter()
        .position(|p| *p == TimeGranularity::default())
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Tickets over time by")
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(periods[idx])
}

fn summary(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = crate::dashboard(DashboardConfig::from_env(), multi)?;
    println!("Dataset: {}", dashboard.dataset().display());

    let limit = prompt_limit()?;
    let views = prompt_views()?;
    if views.is_empty() {
        println!("No views selected.");
        return Ok(());
    }
    let period = prompt_period()?;

    let params = DashboardParams {
        limit,
        views,
        view: ViewParams {
            period,
            ..ViewParams::default()
        },
        point_limit: Some(0),
        ..DashboardParams::default()
    };

    let snapshot = dashboard.render(&params)?;
    print!("{}", format_snapshot(&snapshot));

    Ok(())
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected action fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Texas Traffic Stops");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Summary => summary(multi)?,
        Action::ListViews => crate::print_views(),
        Action::Server => {
            actix_web::rt::System::new().block_on(tx_stops_server::interactive::run())?;
        }
    }

    Ok(())
}
