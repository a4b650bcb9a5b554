//! Headless bot tables for exercising the table engine.
//!
//! Spawns table actors through a TableManager, fills every table with bots
//! and lets them play until enough hands were dealt or Ctrl-C is pressed.

mod config;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use poker_table::{
    TableManager,
    entities::{DisplayName, Phase, PlayerId, TableSnapshot},
    table::TableId,
};

use config::{Overrides, SimConfig};

const HELP: &str = "\
Run poker tables populated only by bots

USAGE:
  pt_bots [OPTIONS]

OPTIONS:
  --tables      N        Number of tables        [default: env SIM_TABLES or 1]
  --bots        N        Bots per table          [default: env SIM_BOTS_PER_TABLE or 6]
  --hands       N        Hands to play per table [default: env SIM_HANDS or 100]
  --seed        N        Shuffle and bot seed    [default: env SIM_SEED or random]
  --difficulty  LEVEL    easy, standard or tag   [default: env DEFAULT_BOT_DIFFICULTY or standard]

FLAGS:
  -h, --help             Print help information

ENVIRONMENT:
  SIM_TICK_MS            Milliseconds between bot moves
  TABLE_SMALL_BLIND      Small blind
  TABLE_BIG_BLIND        Big blind
  TABLE_STARTING_STACK   Chips per bot
  TABLE_SPEED            normal, turbo or hyper
  RUST_LOG               Log level (e.g. info, poker_table=debug)
";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        num_tables: pargs.opt_value_from_str("--tables")?,
        bots_per_table: pargs.opt_value_from_str("--bots")?,
        target_hands: pargs.opt_value_from_str("--hands")?,
        seed: pargs.opt_value_from_str("--seed")?,
        difficulty: pargs.opt_value_from_str("--difficulty")?,
    };

    let config = SimConfig::from_env(overrides)?;
    config.validate()?;

    // Stop polling on Ctrl-C and report what was played so far.
    let stopped = Arc::new(AtomicBool::new(false));
    let flag = stopped.clone();
    set_handler(move || flag.store(true, Ordering::SeqCst))?;

    env_logger::builder().format_target(false).init();
    info!(
        "Starting {} bot table(s) with {} {} bots each",
        config.num_tables, config.bots_per_table, config.table.bot_difficulty
    );

    let manager = TableManager::new(config.table.clone())
        .map_err(|e| anyhow::anyhow!("Invalid table configuration: {}", e))?
        .with_tick_interval(config.tick);

    let mut table_ids = Vec::with_capacity(config.num_tables);
    for index in 0..config.num_tables {
        let table_id = manager
            .create_table(config.table_config(index))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create table {}: {}", index + 1, e))?;

        for seat in 0..config.bots_per_table {
            let player_id = PlayerId::new(&format!("bot-{table_id}-{seat}"));
            let name = DisplayName::new(&format!("Bot{}", seat + 1));
            manager.add_bot(table_id, player_id, name, None).await?;
        }

        info!("✓ Created table {} with {} bots", table_id, config.bots_per_table);
        table_ids.push(table_id);
    }

    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        if stopped.load(Ordering::SeqCst) {
            info!("Interrupted");
            break;
        }

        let mut all_done = true;
        for &table_id in &table_ids {
            let snapshot = manager.get_table_state(table_id, None).await?;
            if !is_finished(&snapshot, config.target_hands) {
                all_done = false;
                break;
            }
        }
        if all_done {
            break;
        }
    }

    for &table_id in &table_ids {
        let snapshot = manager.get_table_state(table_id, None).await?;
        report(table_id, &snapshot);
        if let Err(e) = manager.close_table(table_id).await {
            log::warn!("Failed to close table {}: {}", table_id, e);
        }
    }

    Ok(())
}

/// Whether a table dealt enough hands or can no longer deal one.
fn is_finished(snapshot: &TableSnapshot, target_hands: u64) -> bool {
    let funded = snapshot.players.iter().filter(|p| p.chips > 0).count();
    snapshot.hand_number >= target_hands || (snapshot.phase == Phase::Waiting && funded < 2)
}

fn report(table_id: TableId, snapshot: &TableSnapshot) {
    info!(
        "Table {}: {} hand(s) dealt, phase {}",
        table_id, snapshot.hand_number, snapshot.phase
    );

    let mut stacks: Vec<_> = snapshot
        .players
        .iter()
        .map(|p| (p.name.to_string(), p.chips))
        .chain(snapshot.spectators.iter().map(|u| (u.name.to_string(), u.chips)))
        .collect();
    stacks.sort_by(|a, b| b.1.cmp(&a.1));
    for (name, chips) in stacks {
        info!("  {name:<16} ${chips}");
    }
}
