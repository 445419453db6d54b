// Entry point and high-level CLI flow.
//
// Every invocation loads the configured sheets (or the built-in samples),
// selects a platform, applies the optional date range and prints one view.
use ads_cost_report::budget::resolve_budget;
use ads_cost_report::output;
use ads_cost_report::pacing::{compute_pacing, SelectedMonth};
use ads_cost_report::reports;
use ads_cost_report::source::FileSource;
use ads_cost_report::state::{AppState, RefreshSchedule};
use ads_cost_report::util::{format_currency, month_code, parse_date_input};
use ads_cost_report::{CanonicalDataset, Config, Origin, Platform, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// ads-cost: spend reports from exported advertising cost sheets.
#[derive(Debug, Parser)]
struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser)]
struct Common {
    /// Path to the JSON configuration file. Defaults apply when it is missing.
    #[arg(long, env = "ADS_COST_CONFIG", default_value = "ads-cost.json")]
    config: PathBuf,

    /// The logging verbosity: off, error, warn, info, debug, trace.
    /// RUST_LOG takes precedence when set.
    #[arg(long, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    /// Which sheet to report on: summary, tiktok or facebook.
    #[arg(long, default_value = "tiktok")]
    platform: Platform,

    /// First day of the date filter (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// Last day of the date filter (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summary cards and categories ranked by spend.
    Summary {
        /// Rank categories for one month only (JAN..DEC or 1-12).
        #[arg(long)]
        month: Option<String>,
    },
    /// The spend table.
    Table {
        /// Only show categories containing this text.
        #[arg(long, default_value = "")]
        search: String,
        /// Only show rows of one month (JAN..DEC or 1-12).
        #[arg(long)]
        month: Option<String>,
        #[arg(long, default_value_t = 50)]
        rows: usize,
    },
    /// Data behind the daily and category charts.
    Chart,
    /// Budget pacing for a month.
    Pacing {
        /// Month to pace (JAN..DEC or 1-12) in the configured reference year.
        #[arg(long)]
        month: String,
        /// Budget sheet to use instead of the configured one.
        #[arg(long)]
        budget: Option<PathBuf>,
    },
    /// Write the table as CSV and a JSON summary into a directory.
    Export {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Show the next scheduled refresh.
    Schedule,
}

#[derive(Serialize)]
struct ExportSummary {
    platform: Platform,
    cards: reports::SummaryCards,
    ranking: reports::CategoryRanking,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.common.log_level);
    debug!("{args:?}");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(&args.common.config)?;
    let today = Local::now().date_naive();
    let start = args.common.start.as_deref().map(parse_date_input).transpose()?;
    let end = args.common.end.as_deref().map(parse_date_input).transpose()?;

    let mut state = AppState::new();
    state.refresh(&FileSource::from_config(&config))?;
    state.switch_platform(args.common.platform);
    let platform = state.current();
    let filtering = start.is_some() || end.is_some();
    if filtering {
        let range = state.apply_date_range(start, end)?;
        debug!("Date filter: {:?}", range);
    }
    let empty = CanonicalDataset::empty(Origin::TimeSeries);
    let view = state.view().unwrap_or_else(|| empty.clone());

    match args.command {
        Command::Summary { month } => {
            let cards = cards_for(&view, filtering, today);
            let month = month_arg(month.as_deref(), &config)?;
            let ranking = reports::rank_categories(&view, month);
            println!("{}\n", output::render_cards(&cards));
            println!("Period total: {}", format_currency(ranking.period_total));
            println!("{}", output::render_rows(&output::ranking_rows(&ranking), usize::MAX));
        }
        Command::Table {
            search,
            month,
            rows,
        } => {
            let month = month_arg(month.as_deref(), &config)?;
            let table = reports::table_view(&view, &search, month);
            println!("{}", output::render_table(&table, rows));
        }
        Command::Chart => {
            let daily = reports::daily_series(&view);
            let categories = reports::category_series(&view, config.top_categories);
            println!("Daily spend\n");
            println!("{}\n", output::render_rows(&output::daily_chart_rows(&daily), usize::MAX));
            println!("Top categories\n");
            println!("{}", output::render_rows(&output::category_chart_rows(&categories), usize::MAX));
        }
        Command::Pacing { month, budget } => {
            let selected = SelectedMonth::resolve(&month, config.reference_year)?;
            let sheet_path = budget.or_else(|| {
                month_code(selected.month()).and_then(|code| config.budget_sheet(platform, code))
            });
            let sheet = sheet_path.and_then(|path| match std::fs::read_to_string(&path) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Unable to read budget sheet {}: {}", path.display(), e);
                    None
                }
            });
            let model = resolve_budget(sheet.as_deref(), config.default_budget(platform), today);
            let spend = state.dataset().unwrap_or(&empty);
            let metrics = compute_pacing(spend, &model, selected, today);
            println!("{}\n", output::render_pacing(&metrics));
            println!("{}", output::render_rows(&output::pacing_rows(&metrics), usize::MAX));
        }
        Command::Export { out_dir } => {
            std::fs::create_dir_all(&out_dir)?;
            let table_file = out_dir.join(format!("{}_table.csv", platform));
            output::write_table_csv(&table_file, &reports::table_view(&view, "", None))?;
            let summary = ExportSummary {
                platform,
                cards: cards_for(&view, filtering, today),
                ranking: reports::rank_categories(&view, None),
            };
            let summary_file = out_dir.join(format!("{}_summary.json", platform));
            output::write_json(&summary_file, &summary)?;
            println!("Table exported to {}", table_file.display());
            println!("Summary exported to {}", summary_file.display());
        }
        Command::Schedule => {
            let schedule = RefreshSchedule::new(config.refresh_hour, config.refresh_minute)?;
            let now = Local::now().naive_local();
            let (hours, minutes) = schedule.countdown(now);
            println!("Next refresh: {}", schedule.next_after(now).format("%Y-%m-%d %H:%M"));
            println!("In {}h {}m", hours, minutes);
        }
    }
    Ok(())
}

fn cards_for(view: &CanonicalDataset, filtering: bool, today: NaiveDate) -> reports::SummaryCards {
    if filtering {
        reports::summary_cards_filtered(view)
    } else {
        reports::summary_cards(view, today)
    }
}

fn month_arg(month: Option<&str>, config: &Config) -> Result<Option<u32>> {
    month
        .map(|m| SelectedMonth::resolve(m, config.reference_year).map(|s| s.month()))
        .transpose()
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "ads_cost_report={},{}={}",
            level,
            env!("CARGO_CRATE_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
