use rand::Rng;
use rand::seq::SliceRandom;

use crate::game_log::{NewGameLog, PROTOCOLS_PER_SIDE, Side};

pub const MAIN_PROTOCOLS: [&str; 12] = [
    "Spirit", "Death", "Metal", "Gravity", "Plague", "Life", "Fire", "Darkness", "Water",
    "Psychic", "Speed", "Hate",
];

pub const AUX_PROTOCOLS: [&str; 3] = ["Light", "Love", "Apathy"];

pub const DRAFT_PICKS: usize = PROTOCOLS_PER_SIDE * 2;

pub fn protocol_pool(include_aux: bool) -> Vec<&'static str> {
    let mut pool = MAIN_PROTOCOLS.to_vec();
    if include_aux {
        pool.extend(AUX_PROTOCOLS);
    }
    pool
}

/// Who makes pick `pick` (1-based): starter, other twice, starter twice, other.
pub fn picker_for(pick: usize, starting: Side) -> Option<Side> {
    match pick {
        1 | 4 | 5 => Some(starting),
        2 | 3 | 6 => Some(starting.other()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub starting: Side,
    pub player1: Vec<String>,
    pub player2: Vec<String>,
}

impl Draft {
    pub fn into_game(self, player1: &str, player2: &str, winner: Side) -> NewGameLog {
        let winner_name = match winner {
            Side::Player1 => player1,
            Side::Player2 => player2,
        };
        NewGameLog {
            player1_name: player1.to_string(),
            player1_protocols: self.player1,
            player2_name: player2.to_string(),
            player2_protocols: self.player2,
            winner_name: winner_name.to_string(),
        }
    }
}

/// Random starter, shuffled pool, each pick takes the next protocol.
pub fn simulate_draft<R: Rng + ?Sized>(rng: &mut R, include_aux: bool) -> Draft {
    let starting = if rng.gen_bool(0.5) {
        Side::Player1
    } else {
        Side::Player2
    };
    let mut pool = protocol_pool(include_aux);
    pool.shuffle(rng);

    let mut draft = Draft {
        starting,
        player1: Vec::with_capacity(PROTOCOLS_PER_SIDE),
        player2: Vec::with_capacity(PROTOCOLS_PER_SIDE),
    };
    for (pick, protocol) in (1..=DRAFT_PICKS).zip(pool) {
        match picker_for(pick, starting) {
            Some(Side::Player1) => draft.player1.push(protocol.to_string()),
            Some(Side::Player2) => draft.player2.push(protocol.to_string()),
            None => break,
        }
    }
    draft
}
