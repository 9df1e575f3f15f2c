use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;

use compile_stats::config::{AppConfig, cli_args, positional_args};
use compile_stats::response::ApiResponse;
use compile_stats::store::LogStore;
use compile_stats::validation;

/// Logs one game from a JSON submission (file path argument, or stdin):
/// `{"player1Name", "player1Protocols", "player2Name", "player2Protocols", "winnerName"}`.
fn main() -> Result<()> {
    let config = AppConfig::load();
    env_logger::init();

    let body = read_body(&positional_args(&cli_args()))?;
    let game = match validation::parse_new_game(&body) {
        Ok(game) => game,
        Err(err) => {
            println!("{}", ApiResponse::<()>::error(err.to_string()).to_json(false)?);
            std::process::exit(2);
        }
    };

    let store = LogStore::open(&config.db_path)?;
    let timestamp = Utc::now().to_rfc3339();
    let id = store.append(&timestamp, &game)?;

    let response = ApiResponse::Success {
        data: Some(json!({ "id": id, "timestamp": timestamp })),
        message: Some("Game logged successfully.".to_string()),
    };
    println!("{}", response.to_json(false)?);
    Ok(())
}

fn read_body(positional: &[String]) -> Result<String> {
    match positional.first() {
        Some(path) if path != "-" => {
            let path = PathBuf::from(path);
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
        }
        _ => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("read submission from stdin")?;
            Ok(raw)
        }
    }
}
