mod config;
mod main_lib;

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use config::Config;
use fipe_core::{
    evaluate_deal, parse_brl_price, CascadeSnapshot, CompareList, HistoryEntry, RecentHistory,
    SelectionCascade,
};
use fipe_data::{FetchError, ModelCode, PriceResult, VehicleType};
use main_lib::{build_state, init_tracing, AppState};

/// FIPE vehicle price lookup
#[derive(Parser)]
#[command(name = "fipe")]
#[command(about = "Look up FIPE reference prices for cars, motorcycles and trucks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Selection {
    /// Vehicle type (car, motorcycle, truck)
    #[arg(short = 't', long = "type", default_value = "car")]
    vehicle_type: VehicleType,
}

#[derive(Args)]
struct PriceArgs {
    #[command(flatten)]
    selection: Selection,
    /// Brand code
    #[arg(short, long)]
    brand: String,
    /// Model code
    #[arg(short, long)]
    model: ModelCode,
    /// Year code (e.g. 2023-1) or a bare year (e.g. 2023)
    #[arg(short, long)]
    year: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List brands
    Brands {
        #[command(flatten)]
        selection: Selection,
    },
    /// List the models of a brand
    Models {
        #[command(flatten)]
        selection: Selection,
        /// Brand code
        #[arg(short, long)]
        brand: String,
    },
    /// List the model years of a model
    Years {
        #[command(flatten)]
        selection: Selection,
        /// Brand code
        #[arg(short, long)]
        brand: String,
        /// Model code
        #[arg(short, long)]
        model: ModelCode,
    },
    /// Fetch a reference price and record it in the history
    Price {
        #[command(flatten)]
        args: PriceArgs,
        /// Also add the vehicle to the compare list
        #[arg(long)]
        compare: bool,
    },
    /// Compare an asking price with the reference price
    Deal {
        #[command(flatten)]
        args: PriceArgs,
        /// Asking price, e.g. "R$ 42.000,00"
        #[arg(short, long)]
        asking: String,
    },
    /// Show or clear the recent lookups
    History {
        #[arg(long)]
        clear: bool,
    },
    /// Show or edit the compare list
    Compare {
        /// Remove the entry at this position (0-based)
        #[arg(long)]
        remove: Option<usize>,
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Serialize)]
struct DealReport {
    result: PriceResult,
    evaluation: fipe_core::DealEvaluation,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env();
    let state = build_state(&config);

    match cli.command {
        Commands::Brands { selection } => {
            let snapshot = run_cascade(&state.cascade, selection.vehicle_type, None, None, None).await;
            ensure_loaded(&snapshot, snapshot.brands.is_empty())?;
            print_json(&snapshot.brands)
        }
        Commands::Models { selection, brand } => {
            let snapshot =
                run_cascade(&state.cascade, selection.vehicle_type, Some(&brand), None, None).await;
            ensure_loaded(&snapshot, snapshot.models.is_empty())?;
            print_json(&snapshot.models)
        }
        Commands::Years {
            selection,
            brand,
            model,
        } => {
            let snapshot = run_cascade(
                &state.cascade,
                selection.vehicle_type,
                Some(&brand),
                Some(model),
                None,
            )
            .await;
            ensure_loaded(&snapshot, snapshot.years.is_empty())?;
            print_json(&snapshot.years)
        }
        Commands::Price { args, compare } => {
            let (result, year) = lookup_price(&state, &args).await?;
            if compare {
                let entry = HistoryEntry::from_result(&result, &year, Utc::now());
                if let Err(rejection) = CompareList::load(state.cache.clone()).add(entry) {
                    tracing::warn!("Not added to the compare list: {:?}", rejection);
                }
            }
            print_json(&result)
        }
        Commands::Deal { args, asking } => {
            let asking = parse_brl_price(&asking)
                .ok_or_else(|| anyhow!("Asking price '{}' has no digits", asking))?;
            let (result, _) = lookup_price(&state, &args).await?;
            let reference = parse_brl_price(&result.price)
                .ok_or_else(|| anyhow!("Unreadable reference price '{}'", result.price))?;
            let evaluation = evaluate_deal(asking, reference)
                .context("Reference price is zero, nothing to compare against")?;
            print_json(&DealReport { result, evaluation })
        }
        Commands::History { clear } => {
            let mut history = RecentHistory::load(state.cache.clone());
            if clear {
                history.clear();
            }
            print_json(&history.entries())
        }
        Commands::Compare { remove, clear } => {
            let mut compare = CompareList::load(state.cache.clone());
            if clear {
                compare.clear();
            } else if let Some(index) = remove {
                if compare.remove(index).is_none() {
                    bail!("No compare entry at position {}", index);
                }
            }
            print_json(&compare.entries())
        }
    }
}

/// Runs the selection to the deepest level given and waits for it to settle.
///
/// The year goes in before the model, so a bare year is reconciled against
/// the model's years the same way an interactive user's would be.
async fn run_cascade(
    cascade: &SelectionCascade,
    vehicle_type: VehicleType,
    brand: Option<&str>,
    model: Option<ModelCode>,
    year: Option<&str>,
) -> CascadeSnapshot {
    cascade.select_vehicle_type(vehicle_type);
    if brand.is_some() {
        cascade.select_brand(brand);
        cascade.select_year(year);
        cascade.select_model(model);
    }
    cascade.wait_idle().await;
    cascade.snapshot()
}

/// Fails with the cascade error when the level the command asked for is empty.
fn ensure_loaded(snapshot: &CascadeSnapshot, empty: bool) -> anyhow::Result<()> {
    match (&snapshot.error, empty) {
        (Some(error), true) => bail!("{}", error.message),
        _ => Ok(()),
    }
}

async fn lookup_price(state: &AppState, args: &PriceArgs) -> anyhow::Result<(PriceResult, String)> {
    let snapshot = run_cascade(
        &state.cascade,
        args.selection.vehicle_type,
        Some(&args.brand),
        Some(args.model),
        Some(&args.year),
    )
    .await;
    ensure_loaded(&snapshot, snapshot.result.is_none())?;

    let (Some(result), Some(year)) = (snapshot.result, snapshot.selected_year) else {
        return Err(FetchError::UnavailableCombination)
            .with_context(|| format!("Year {} is not offered for model {}", args.year, args.model));
    };

    let mut history = RecentHistory::load(state.cache.clone());
    history.record(HistoryEntry::from_result(&result, &year, Utc::now()));
    Ok((result, year))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
