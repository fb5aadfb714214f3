pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::ledger::{Ledger, current_month};
use crate::core::preferences::{PREFERENCES_COLLECTION, Preferences};
use crate::core::FxContext;
use crate::store::KeyValueStore;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Summary {
        month: Option<String>,
    },
    Rates,
    Convert {
        amount: f64,
        from: String,
        to: Option<String>,
    },
    Base {
        code: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("brational starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.default_data_path()?;
    let store = KeyValueStore::open(&data_path);
    if !store.is_durable() {
        eprintln!("{}", cli::ui::memory_store_notice(&data_path));
    }
    let preferences = Preferences::new(store.collection_or_memory(PREFERENCES_COLLECTION));
    let chain = providers::default_chain(&config.providers);
    let ctx = FxContext::init(preferences, chain, &config.currency).await;

    match command {
        AppCommand::Summary { month } => {
            let ledger = Ledger::from_config(&config.categories, &config.expenses, &config.incomes);
            let month = month.unwrap_or_else(current_month);
            cli::summary::run(&ledger, &ctx, &month).await
        }
        AppCommand::Rates => cli::rates::run(&ctx).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&ctx, amount, &from, to.as_deref()).await
        }
        AppCommand::Base { code } => cli::base::run(&ctx, &code).await,
    }
}
