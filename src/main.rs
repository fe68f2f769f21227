mod config;
mod db;
mod logging;
mod models;
mod payoff;
mod run;
mod ui;

use anyhow::Result;
use tracing::info;

use config::Config;

fn main() -> Result<()> {
    let raw_args: Vec<String> = std::env::args().collect();
    let (config, args) = Config::from_args(&raw_args)?;
    config.ensure_data_dir()?;
    logging::init_tracing(&config.log_path())?;

    let mut db = db::Database::open(&config.db_path())?;
    let profile = db.ensure_profile(&config.profile)?;
    info!(profile = %config.profile, id = %profile, "session started");

    match args.len() {
        0 | 1 => run::as_tui(&mut db, profile, &config),
        2.. => run::as_cli(&args, &mut db, profile, &config),
    }
}
