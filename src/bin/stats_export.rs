use anyhow::Result;
use chrono::Utc;

use compile_stats::config::AppConfig;
use compile_stats::export;
use compile_stats::stats::aggregate;
use compile_stats::store::LogStore;

fn main() -> Result<()> {
    let config = AppConfig::load();
    env_logger::init();

    let store = LogStore::open(&config.db_path)?;
    let logs = store.list()?;
    let stats = aggregate(&logs);

    let path = config
        .export_dir
        .join(export::default_export_name(Utc::now()));
    let report = export::export_stats(&path, &stats, &logs)?;

    println!("Export complete");
    println!("File: {}", report.path.display());
    println!("Games played: {}", stats.games_played);
    println!(
        "Players: {} | Protocols: {} | Matchups: {} | Logs: {}",
        report.players, report.protocols, report.matchups, report.logs
    );
    Ok(())
}
