//! TickLab CLI — replay historical CSV data against a demo strategy.
//!
//! Commands:
//! - `replay` — run a momentum strategy over a CSV file and print the
//!   resulting balance and equity

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ticklab_core::domain::{Bar, Order, Signal};
use ticklab_core::engine::BacktestEngine;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ticklab", about = "TickLab — event-driven backtest engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV file through the momentum demo strategy.
    Replay {
        /// CSV file of bars: start time, open, high, low, close, volume.
        csv: PathBuf,

        /// Starting account balance.
        #[arg(long, default_value_t = 1000.0)]
        balance: f64,

        /// Volume per order.
        #[arg(long, default_value_t = 2)]
        volume: i64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay {
            csv,
            balance,
            volume,
        } => run_replay(csv, balance, volume),
    }
}

fn run_replay(csv: PathBuf, balance: f64, volume: i64) -> Result<()> {
    let engine = BacktestEngine::new(balance);
    attach_momentum_strategy(&engine, volume);

    {
        let engine = engine.clone();
        engine.clone().dispatcher().on_balance(move |balance| {
            debug!(balance, equity = engine.equity(), "balance update");
        });
    }

    engine
        .replay_path(&csv)
        .with_context(|| format!("replaying {}", csv.display()))?;

    info!(
        balance = engine.balance(),
        equity = engine.equity(),
        "replay finished"
    );
    println!("balance: {:.2}", engine.balance());
    println!("equity:  {:.2}", engine.equity());
    if let Some(position) = engine.position() {
        println!(
            "open:    {} {} @ {}",
            position.signal, position.volume, position.entry_price
        );
    }
    Ok(())
}

/// Follow each bar's direction: buy when it closed up, sell when it closed
/// down, flatten when it was flat. Skips a bar whenever an order is still
/// in flight, so submission can never fail on a full slot.
fn attach_momentum_strategy(engine: &BacktestEngine, volume: i64) {
    let engine = engine.clone();
    engine.clone().dispatcher().on_bar(move |bar: &Bar| {
        if engine.dispatcher().order_in_flight() {
            return;
        }
        let (Some(open), Some(close)) = (bar.open, bar.close) else {
            return;
        };

        let order = if close > open {
            Order::buy(volume)
        } else if close < open {
            Order::sell(volume)
        } else {
            Order::out()
        };

        // Flattening while already flat would be rejected; skip it.
        if order.signal() == Signal::Out && engine.position().is_none() {
            return;
        }
        if let Some(position) = engine.position() {
            if position.signal == order.signal() {
                return;
            }
        }

        debug!(%order, "submitting");
        let notifier = match engine.update_order(order) {
            Ok(notifier) => notifier,
            Err(err) => {
                warn!(%err, "order not accepted");
                return;
            }
        };
        notifier
            .on_fulfill(|price| info!(price, "filled"))
            .on_reject(|reason| warn!(reason, "rejected"));
    });
}
