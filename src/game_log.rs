use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const PROTOCOLS_PER_SIDE: usize = 3;
pub const UNKNOWN_PLAYER1: &str = "Unknown P1";
pub const UNKNOWN_PLAYER2: &str = "Unknown P2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }

    pub fn protocols_field(self) -> &'static str {
        match self {
            Side::Player1 => "player1Protocols",
            Side::Player2 => "player2Protocols",
        }
    }
}

/// Why a stored record was left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordDefect {
    #[error("{field} is not valid JSON: {reason}")]
    Undecodable { field: &'static str, reason: String },
    #[error("{field} is missing")]
    Missing { field: &'static str },
    #[error("{field} does not decode to a list")]
    NotASequence { field: &'static str },
}

/// One row of the `game_logs` table.
///
/// Protocol columns keep their stored JSON text. They are decoded during
/// aggregation so that a damaged row only costs itself, never the whole report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLog {
    pub id: i64,
    pub timestamp: String,
    pub player1_name: Option<String>,
    pub player1_protocols: Option<String>,
    pub player2_name: Option<String>,
    pub player2_protocols: Option<String>,
    pub winner_name: Option<String>,
}

impl GameLog {
    /// Builds the record the store would hand back for a freshly appended game.
    pub fn from_new(id: i64, timestamp: &str, game: &NewGameLog) -> Self {
        Self {
            id,
            timestamp: timestamp.to_string(),
            player1_name: Some(game.player1_name.clone()),
            player1_protocols: Some(encode_protocols(&game.player1_protocols)),
            player2_name: Some(game.player2_name.clone()),
            player2_protocols: Some(encode_protocols(&game.player2_protocols)),
            winner_name: Some(game.winner_name.clone()),
        }
    }

    pub fn player1(&self) -> &str {
        self.player1_name.as_deref().unwrap_or(UNKNOWN_PLAYER1)
    }

    pub fn player2(&self) -> &str {
        self.player2_name.as_deref().unwrap_or(UNKNOWN_PLAYER2)
    }

    pub fn player(&self, side: Side) -> &str {
        match side {
            Side::Player1 => self.player1(),
            Side::Player2 => self.player2(),
        }
    }

    /// Winner label as stored; an empty string counts as no winner.
    pub fn winner(&self) -> Option<&str> {
        self.winner_name.as_deref().filter(|name| !name.is_empty())
    }

    /// The side whose player name matches the winner, player 1 checked first.
    pub fn winning_side(&self) -> Option<Side> {
        let winner = self.winner()?;
        if winner == self.player1() {
            Some(Side::Player1)
        } else if winner == self.player2() {
            Some(Side::Player2)
        } else {
            None
        }
    }

    pub fn decode_protocols(&self) -> Result<(Vec<String>, Vec<String>), RecordDefect> {
        let p1 = decode_protocols(
            self.player1_protocols.as_deref(),
            Side::Player1.protocols_field(),
        )?;
        let p2 = decode_protocols(
            self.player2_protocols.as_deref(),
            Side::Player2.protocols_field(),
        )?;
        Ok((p1, p2))
    }

    pub fn to_view(&self) -> GameLogView {
        GameLogView {
            id: self.id,
            timestamp: self.timestamp.clone(),
            player1_name: self.player1().to_string(),
            player1_protocols: protocols_view(self.player1_protocols.as_deref()),
            player2_name: self.player2().to_string(),
            player2_protocols: protocols_view(self.player2_protocols.as_deref()),
            winner_name: self.winner_name.clone().unwrap_or_default(),
        }
    }
}

/// JSON shape of a stored log as listed by the admin tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLogView {
    pub id: i64,
    pub timestamp: String,
    pub player1_name: String,
    pub player1_protocols: Value,
    pub player2_name: String,
    pub player2_protocols: Value,
    pub winner_name: String,
}

/// A game submitted for logging; the timestamp is stamped at ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameLog {
    pub player1_name: String,
    pub player1_protocols: Vec<String>,
    pub player2_name: String,
    pub player2_protocols: Vec<String>,
    pub winner_name: String,
}

/// Replacement values for an existing log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogUpdate {
    pub player1_name: String,
    pub player1_protocols: Vec<String>,
    pub player2_name: String,
    pub player2_protocols: Vec<String>,
    pub winner_name: String,
}

/// Decodes a stored protocol column.
///
/// A missing column is a defect, like any other value that is not a list.
/// Elements that are not JSON strings keep their slot but become empty labels.
pub fn decode_protocols(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Vec<String>, RecordDefect> {
    let Some(raw) = raw else {
        return Err(RecordDefect::Missing { field });
    };
    let value = serde_json::from_str::<Value>(raw).map_err(|err| RecordDefect::Undecodable {
        field,
        reason: err.to_string(),
    })?;
    match value {
        Value::Array(items) => Ok(items
            .iter()
            .map(|item| item.as_str().unwrap_or_default().to_string())
            .collect()),
        _ => Err(RecordDefect::NotASequence { field }),
    }
}

pub fn encode_protocols(protocols: &[String]) -> String {
    serde_json::to_string(protocols).unwrap_or_else(|_| "[]".to_string())
}

fn protocols_view(raw: Option<&str>) -> Value {
    let Some(raw) = raw else {
        return Value::Array(Vec::new());
    };
    serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
