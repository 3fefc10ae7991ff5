//! Tea Ledger Service
//!
//! Thin host around the ledger library:
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌──────────┐
//! │  Config  │───▶│ Workflow  │◀───│ Sweeper  │
//! │  (YAML)  │    │ (Escrow)  │    │ (Expiry) │
//! └──────────┘    └───────────┘    └──────────┘
//! ```
//!
//! Loads configuration, starts logging, wires the stores and the
//! transfer workflow, and keeps the expiry sweeper running until
//! Ctrl-C. The embedding application drives the workflow and query
//! handles through the library API.

use std::sync::Arc;

use tracing::info;

use tea_ledger::account::AccountStore;
use tea_ledger::clock::Clock;
use tea_ledger::config::AppConfig;
use tea_ledger::logging::init_logging;
use tea_ledger::transfer::{
    ExpirySweeper, MembershipVerifier, StaticMembership, SweeperConfig, TransferStore,
    TransferWorkflow,
};

// ============================================================
// STARTUP ARGUMENTS
// ============================================================

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

// ============================================================
// ENTRY POINT
// ============================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %env,
        "Starting tea ledger service"
    );

    let clock = Clock::system();
    let accounts = Arc::new(AccountStore::new(clock.clone()));
    let transfers = Arc::new(TransferStore::new());
    let membership: Arc<dyn MembershipVerifier> = Arc::new(StaticMembership::new());

    let workflow = Arc::new(TransferWorkflow::new(
        Arc::clone(&accounts),
        Arc::clone(&transfers),
        membership,
        clock.clone(),
        config.transfer.ttl(),
    ));

    let sweeper = ExpirySweeper::new(
        Arc::clone(&workflow),
        Arc::clone(&transfers),
        clock,
        SweeperConfig {
            sweep_interval: config.transfer.sweep_interval(),
            batch_size: config.transfer.sweep_batch_size,
        },
    );
    let sweeper_handle = tokio::spawn(async move { sweeper.run().await });

    info!(
        ttl_secs = config.transfer.ttl_secs,
        sweep_interval_secs = config.transfer.sweep_interval_secs,
        "Tea ledger ready"
    );

    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, stopping sweeper");
    sweeper_handle.abort();

    Ok(())
}
