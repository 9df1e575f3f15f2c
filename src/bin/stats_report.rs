use anyhow::Result;

use compile_stats::config::{AppConfig, cli_args, has_flag};
use compile_stats::response::ApiResponse;
use compile_stats::stats::{StatsSnapshot, aggregate_with_report};
use compile_stats::store::LogStore;

fn main() -> Result<()> {
    let config = AppConfig::load();
    env_logger::init();
    let pretty = has_flag(&cli_args(), "--pretty");

    let loaded = LogStore::open(&config.db_path).and_then(|store| store.list());
    let logs = match loaded {
        Ok(logs) => logs,
        Err(err) => {
            let response =
                ApiResponse::<StatsSnapshot>::error(format!("Failed to retrieve stats: {err:#}"));
            println!("{}", response.to_json(pretty)?);
            std::process::exit(1);
        }
    };

    let report = aggregate_with_report(&logs);
    if !report.skipped.is_empty() {
        log::warn!(
            "{} of {} game logs excluded from stats",
            report.skipped.len(),
            logs.len()
        );
    }
    println!("{}", ApiResponse::data(report.snapshot).to_json(pretty)?);
    Ok(())
}
