use anyhow::{Context, Result, anyhow};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use compile_stats::config::{AppConfig, arg_value, cli_args, has_flag};
use compile_stats::draft::simulate_draft;
use compile_stats::game_log::Side;
use compile_stats::store::LogStore;

const DEFAULT_GAMES: usize = 20;
const DEFAULT_PLAYERS: &[&str] = &["Ada", "Grace", "Linus", "Barbara"];

/// Appends randomly drafted games: `--games N`, `--seed S`, `--players a,b,c`, `--aux`.
fn main() -> Result<()> {
    let config = AppConfig::load();
    env_logger::init();

    let args = cli_args();
    let games = match arg_value(&args, "--games") {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid --games {raw:?}"))?,
        None => DEFAULT_GAMES,
    };
    let mut rng = match arg_value(&args, "--seed") {
        Some(raw) => StdRng::seed_from_u64(
            raw.parse::<u64>()
                .with_context(|| format!("invalid --seed {raw:?}"))?,
        ),
        None => StdRng::from_entropy(),
    };
    let players = arg_value(&args, "--players")
        .map(|raw| parse_names(&raw))
        .unwrap_or_else(|| DEFAULT_PLAYERS.iter().map(|s| s.to_string()).collect());
    if players.len() < 2 {
        return Err(anyhow!("need at least two distinct players"));
    }
    let include_aux = has_flag(&args, "--aux");

    let store = LogStore::open(&config.db_path)?;
    let start = Utc::now() - Duration::minutes(games as i64 * 30);
    let mut first_id = None;
    for idx in 0..games {
        let mut pair = players.choose_multiple(&mut rng, 2);
        let (Some(player1), Some(player2)) = (pair.next(), pair.next()) else {
            continue;
        };
        let winner = if rng.gen_bool(0.5) {
            Side::Player1
        } else {
            Side::Player2
        };
        let game = simulate_draft(&mut rng, include_aux).into_game(player1, player2, winner);
        let timestamp = (start + Duration::minutes(idx as i64 * 30)).to_rfc3339();
        let id = store.append(&timestamp, &game)?;
        first_id.get_or_insert(id);
    }

    println!("Seeded {games} games into {}", config.db_path.display());
    if let Some(id) = first_id {
        println!("First new log id: {id}");
    }
    Ok(())
}

fn parse_names(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !out.iter().any(|existing| existing == name) {
            out.push(name.to_string());
        }
    }
    out
}
