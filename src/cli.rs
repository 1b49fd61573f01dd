//! Command line interface.
//!
//! `replay` drives the engine over a recorded trading day: it loads CSV bar
//! and tick files, feeds every minute between the session open and the end of
//! the monitoring window through the engine, and settles fills against an
//! in-memory paper account.

use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use crate::adapters::csv_market_data::CsvMarketData;
use crate::adapters::ini_config::load_config;
use crate::adapters::paper_account::PaperAccount;
use crate::domain::error::EngineError;
use crate::domain::session::Engine;
use crate::ports::position_source::PositionSource;

#[derive(Parser)]
#[command(name = "mintrend", version, about = "Per-symbol intraday decision engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay one recorded trading day against a paper account
    Replay {
        /// Engine configuration file (INI)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory with {symbol}_daily.csv and {symbol}_minute.csv files
        #[arg(short, long)]
        data: PathBuf,

        /// Trading day to replay (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Starting cash for the paper account
        #[arg(long, default_value_t = 1_000_000.0)]
        cash: f64,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Replay {
            config,
            data,
            date,
            cash,
        } => replay(&config, &data, date, cash),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "replay failed");
            ExitCode::from(&err)
        }
    }
}

fn replay(
    config_path: &PathBuf,
    data_path: &PathBuf,
    date: NaiveDate,
    cash: f64,
) -> Result<(), EngineError> {
    let config = load_config(config_path)?;
    let market_data = CsvMarketData::load(data_path, &config.universe)?;
    let account = PaperAccount::new(cash);
    let mut engine = Engine::new(config)?;

    let open = date.and_time(engine.config().open_time);
    let close = date.and_time(engine.config().monitor_end);

    let mut now = open;
    while now <= close {
        for order in engine.on_tick(now, &market_data, &account, &account) {
            println!(
                "{} {} {} {} x{} @ {:.3}",
                now.date(),
                now.time().format("%H:%M"),
                order.side,
                order.symbol,
                order.shares,
                order.price
            );
        }
        now += Duration::minutes(1);
    }

    let mut positions: Vec<(String, i64)> = account
        .fetch_positions(&engine.config().account)
        .into_iter()
        .collect();
    positions.sort();

    println!("--- end of day ---");
    println!("cash: {:.2}", account.cash());
    for (symbol, shares) in positions {
        println!("held: {symbol} x{shares}");
    }
    Ok(())
}
