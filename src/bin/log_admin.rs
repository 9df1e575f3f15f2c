use anyhow::{Context, Result, anyhow};

use compile_stats::config::{AppConfig, cli_args, has_flag, positional_args};
use compile_stats::game_log::GameLogView;
use compile_stats::response::ApiResponse;
use compile_stats::store::LogStore;
use compile_stats::validation;

const USAGE: &str = "usage: log_admin [--db PATH] [--pretty] <list | show ID | update ID JSON | delete ID | clear --yes | players>";

fn main() -> Result<()> {
    let config = AppConfig::load();
    env_logger::init();

    let args = cli_args();
    let pretty = has_flag(&args, "--pretty");
    let positional = positional_args(&args);
    let Some(command) = positional.first().map(String::as_str) else {
        return Err(anyhow!(USAGE));
    };

    let store = LogStore::open(&config.db_path)?;
    match command {
        "list" => {
            let logs = store
                .list()?
                .iter()
                .map(|log| log.to_view())
                .collect::<Vec<GameLogView>>();
            print_response(&ApiResponse::data(logs), pretty)
        }
        "show" => {
            let id = parse_id(positional.get(1))?;
            match store.get(id)? {
                Some(log) => print_response(&ApiResponse::data(log.to_view()), pretty),
                None => fail(&format!("Log {id} not found.")),
            }
        }
        "update" => {
            let id = parse_id(positional.get(1))?;
            let body = positional
                .get(2)
                .ok_or_else(|| anyhow!("update needs a JSON body\n{USAGE}"))?;
            let update = match validation::parse_update(body) {
                Ok(update) => update,
                Err(err) => return fail(&err.to_string()),
            };
            if store.update(id, &update)? > 0 {
                print_response(
                    &ApiResponse::<()>::message(format!("Log ID {id} updated successfully.")),
                    pretty,
                )
            } else {
                fail("Log not found or no changes made.")
            }
        }
        "delete" => {
            let id = parse_id(positional.get(1))?;
            if store.delete(id)? > 0 {
                print_response(
                    &ApiResponse::<()>::message(format!("Log ID {id} deleted successfully.")),
                    pretty,
                )
            } else {
                fail("Log not found.")
            }
        }
        "clear" => {
            if !has_flag(&args, "--yes") {
                return fail("Refusing to clear without --yes.");
            }
            store.clear()?;
            print_response(&ApiResponse::<()>::message("All game logs cleared."), pretty)
        }
        "players" => print_response(&ApiResponse::data(store.player_names()?), pretty),
        other => Err(anyhow!("unknown command {other:?}\n{USAGE}")),
    }
}

fn parse_id(raw: Option<&String>) -> Result<i64> {
    let raw = raw.ok_or_else(|| anyhow!("missing log id\n{USAGE}"))?;
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("invalid log id {raw:?}"))
}

fn print_response<T: serde::Serialize>(response: &ApiResponse<T>, pretty: bool) -> Result<()> {
    println!("{}", response.to_json(pretty)?);
    Ok(())
}

fn fail(message: &str) -> Result<()> {
    println!("{}", ApiResponse::<()>::error(message).to_json(false)?);
    std::process::exit(1);
}
