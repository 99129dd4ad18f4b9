use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use hushold_core::{Forecast, MonthKey, Transaction, reference_date_in};
use hushold_finance::{
    Adjustment, ForecastSet, HttpForecastProvider, MonthlySeries, aggregate_by_month,
    aggregate_income, aggregate_income_by_subcategory, aggregate_subcategory, available_years,
    build_aggregate_projection, build_history, build_projection, build_savings_plan, clamp_months,
    compute_average, default_year, fetch_transactions, income_subcategories, load_transactions,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

mod config;
mod logging;
mod render;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "hushold",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("HUSHOLD_BUILD_SHA"), ")"),
    about = "Household spending tables, averages and projections"
)]
struct Cli {
    /// JSON transaction dump (overrides [feed] in config)
    #[arg(long, global = true)]
    transactions: Option<PathBuf>,

    /// Reference date YYYY-MM-DD (default: today in the configured timezone)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Debug logging for hushold crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default config to ~/.hushold/config.toml
    Init,

    /// Expense table (category × month) plus income for one year
    Categories {
        #[arg(long)]
        year: Option<i32>,

        /// Emit unrounded CSV instead of a table
        #[arg(long)]
        csv: bool,
    },

    /// Subcategory breakdown of one main category
    Breakdown {
        #[arg(long)]
        category: String,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        csv: bool,
    },

    /// Monthly income for one year
    Income {
        #[arg(long)]
        year: Option<i32>,

        /// Only this income subcategory
        #[arg(long)]
        subcategory: Option<String>,
    },

    /// Historical monthly average of a category (current month excluded)
    Average {
        #[arg(long)]
        category: String,
    },

    /// Projection for one category, or total expenses when omitted
    Project {
        #[arg(long)]
        category: Option<String>,

        /// Future months (default from config, max 60)
        #[arg(long)]
        horizon: Option<u32>,

        /// Skip the forecasting service and use averages only
        #[arg(long)]
        no_forecast: bool,

        /// Emit the series as JSON (for chart front ends)
        #[arg(long)]
        json: bool,
    },

    /// Savings plan from historical averages
    Plan {
        #[arg(long)]
        months: Option<u32>,

        #[arg(long, default_value_t = 0.0)]
        initial_savings: f64,

        /// Per-category change, e.g. --adjust Mat=-10 (repeatable)
        #[arg(long = "adjust")]
        adjustments: Vec<String>,
    },
}

/// Config, reference date and transactions shared by every command that
/// reads the feed.
struct Session {
    cfg: Config,
    today: NaiveDate,
    txns: Vec<Transaction>,
}

impl Session {
    async fn open(transactions: Option<&PathBuf>, today: Option<NaiveDate>) -> Result<Self> {
        let cfg = config::load_config()?;
        let today = match today {
            Some(d) => d,
            None => reference_date_in(&cfg.projection.timezone, Utc::now())?,
        };
        let txns = load_feed(&cfg, transactions).await?;
        Ok(Self { cfg, today, txns })
    }

    fn year(&self, year: Option<i32>) -> i32 {
        year.unwrap_or_else(|| default_year(&available_years(&self.txns), self.today.year()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Command::Init = cli.command {
        return config::init_config();
    }

    let session = Session::open(cli.transactions.as_ref(), cli.today).await?;
    let (cfg, today, txns) = (&session.cfg, session.today, &session.txns);
    let taxonomy = &cfg.taxonomy;

    match cli.command {
        Command::Init => {}

        Command::Categories { year, csv } => {
            let year = session.year(year);
            let table = aggregate_by_month(txns, taxonomy, year);
            if csv {
                render::write_table_csv(&table, "category", std::io::stdout().lock())?;
            } else {
                println!("Expenses {year}\n");
                render::print_table(&table, "Category");
                println!("\nIncome {year}\n");
                let income = aggregate_income(txns, &taxonomy.income_category, year);
                render::print_series_row("Income", &income);
            }
        }

        Command::Breakdown { category, year, csv } => {
            let year = session.year(year);
            let table = aggregate_subcategory(txns, taxonomy, &category, year)?;
            if csv {
                render::write_table_csv(&table, "subcategory", std::io::stdout().lock())?;
            } else {
                println!("{} subcategories {year}\n", category.trim());
                render::print_table(&table, "Sub Category");
            }
        }

        Command::Income { year, subcategory } => {
            let year = session.year(year);
            let income = &taxonomy.income_category;
            let series = match &subcategory {
                Some(sub) => aggregate_income_by_subcategory(txns, income, year, sub),
                None => aggregate_income(txns, income, year),
            };
            println!("Income {year} ({})\n", subcategory.as_deref().unwrap_or("All"));
            render::print_series_row("Income", &series);

            let subs = income_subcategories(txns, income);
            if !subs.is_empty() {
                println!("\nSubcategories: {}", subs.join(", "));
            }
        }

        Command::Average { category } => {
            let history = build_history(txns, taxonomy);
            let series = if taxonomy.is_income(&category) {
                &history.income
            } else {
                history
                    .category(&category)
                    .with_context(|| format!("unknown category: {}", category.trim()))?
            };
            println!(
                "{}: {:.2} / month (completed months before {})",
                category.trim(),
                compute_average(series, today),
                MonthKey::from_date(today)
            );
        }

        Command::Project {
            category,
            horizon,
            no_forecast,
            json,
        } => {
            let horizon = clamp_months(horizon.unwrap_or(cfg.projection.horizon_months));
            let history = build_history(txns, taxonomy);
            let provider = forecast_provider(cfg, no_forecast)?;

            let series = match category {
                Some(category) => {
                    let name = taxonomy
                        .find_category(&category)
                        .filter(|e| !taxonomy.is_income(&e.name))
                        .map(|e| e.name.clone())
                        .with_context(|| format!("unknown category: {}", category.trim()))?;
                    let forecast = match &provider {
                        Some(p) => p.fetch_async(&name, horizon).await,
                        None => Forecast::Unavailable,
                    };
                    info!(
                        category = %name,
                        available = forecast.is_available(),
                        "forecast collected"
                    );
                    let empty = MonthlySeries::new();
                    let series = history.category(&name).unwrap_or(&empty);
                    build_projection(series, today, horizon, &forecast)
                }
                None => {
                    let names = taxonomy.expense_category_names();
                    let forecasts: ForecastSet = match &provider {
                        Some(p) => p.fetch_many(&names, horizon).await,
                        None => ForecastSet::new(),
                    };
                    let covered = forecasts.values().filter(|f| f.is_available()).count();
                    info!(covered, categories = names.len(), "forecasts collected");
                    build_aggregate_projection(&history.expenses, &forecasts, today, horizon)
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                render::print_projection(&series);
            }
        }

        Command::Plan {
            months,
            initial_savings,
            adjustments,
        } => {
            let adjustments = adjustments
                .iter()
                .map(|a| Adjustment::parse(a, taxonomy))
                .collect::<Result<Vec<_>, _>>()?;
            let months = months.unwrap_or(cfg.projection.horizon_months);
            let history = build_history(txns, taxonomy);
            let plan = build_savings_plan(&history, today, months, initial_savings, &adjustments);
            render::print_plan(&plan);
        }
    }

    Ok(())
}

/// Transactions from `--transactions`, else `[feed] path`, else `[feed] api_url`.
async fn load_feed(cfg: &Config, override_path: Option<&PathBuf>) -> Result<Vec<Transaction>> {
    if let Some(path) = override_path.or(cfg.feed.path.as_ref()) {
        if !path.exists() {
            bail!("transactions not found: {} (pass --transactions <file>)", path.display());
        }
        return load_transactions(path);
    }
    if let Some(url) = &cfg.feed.api_url {
        return fetch_transactions(url, cfg.feed.token.as_deref())
            .await
            .with_context(|| format!("fetching transactions from {url}"));
    }
    bail!(
        "no transaction feed configured (pass --transactions <file> or set [feed] in config.toml)"
    )
}

fn forecast_provider(cfg: &Config, disabled: bool) -> Result<Option<HttpForecastProvider>> {
    if disabled || !cfg.forecast.enabled {
        return Ok(None);
    }
    let provider = HttpForecastProvider::new(
        &cfg.forecast.base_url,
        cfg.forecast.token.clone(),
        Duration::from_secs(cfg.forecast.timeout_secs),
    )?;
    Ok(Some(provider))
}
