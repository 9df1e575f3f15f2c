use serde_json::{Map, Value};
use thiserror::Error;

use crate::game_log::{LogUpdate, NewGameLog, PROTOCOLS_PER_SIDE};

const NEW_GAME_FIELDS: [&str; 5] = [
    "player1Name",
    "player1Protocols",
    "player2Name",
    "player2Protocols",
    "winnerName",
];

const UPDATE_FIELDS: [&str; 5] = [
    "player1_name",
    "player1_protocols",
    "player2_name",
    "player2_protocols",
    "winner_name",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No JSON data received.")]
    EmptyBody,
    #[error("Invalid JSON format received: {0}")]
    InvalidJson(String),
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{field} must be a string.")]
    NotText { field: &'static str },
    #[error("{field} must be a list.")]
    NotAList { field: &'static str },
    #[error("{field} must be a list of {expected} (got {found}).")]
    WrongLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{field} may only contain strings.")]
    NotAString { field: &'static str },
}

pub fn parse_new_game(body: &str) -> Result<NewGameLog, ValidationError> {
    validate_new_game(&parse_body(body)?)
}

/// Checks a logging submission: every field present, names as strings and
/// exactly three protocols per side.
pub fn validate_new_game(value: &Value) -> Result<NewGameLog, ValidationError> {
    let obj = require_object(value)?;
    require_fields(obj, &NEW_GAME_FIELDS)?;
    Ok(NewGameLog {
        player1_name: text_field(obj, "player1Name")?,
        player1_protocols: protocol_field(obj, "player1Protocols", Some(PROTOCOLS_PER_SIDE))?,
        player2_name: text_field(obj, "player2Name")?,
        player2_protocols: protocol_field(obj, "player2Protocols", Some(PROTOCOLS_PER_SIDE))?,
        winner_name: text_field(obj, "winnerName")?,
    })
}

pub fn parse_update(body: &str) -> Result<LogUpdate, ValidationError> {
    validate_update(&parse_body(body)?)
}

/// Checks an edit of an existing log. Protocols must be lists of any length.
pub fn validate_update(value: &Value) -> Result<LogUpdate, ValidationError> {
    let obj = require_object(value)?;
    require_fields(obj, &UPDATE_FIELDS)?;
    Ok(LogUpdate {
        player1_name: text_field(obj, "player1_name")?,
        player1_protocols: protocol_field(obj, "player1_protocols", None)?,
        player2_name: text_field(obj, "player2_name")?,
        player2_protocols: protocol_field(obj, "player2_protocols", None)?,
        winner_name: text_field(obj, "winner_name")?,
    })
}

fn parse_body(body: &str) -> Result<Value, ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyBody);
    }
    serde_json::from_str::<Value>(body).map_err(|err| ValidationError::InvalidJson(err.to_string()))
}

fn require_object(value: &Value) -> Result<&Map<String, Value>, ValidationError> {
    match value {
        Value::Object(obj) if !obj.is_empty() => Ok(obj),
        Value::Object(_) | Value::Null => Err(ValidationError::EmptyBody),
        _ => Err(ValidationError::InvalidJson(
            "expected a JSON object".to_string(),
        )),
    }
}

fn require_fields(
    obj: &Map<String, Value>,
    fields: &[&'static str],
) -> Result<(), ValidationError> {
    let missing = fields
        .iter()
        .copied()
        .filter(|field| !obj.contains_key(*field))
        .collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

fn text_field(obj: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ValidationError::NotText { field })
}

fn protocol_field(
    obj: &Map<String, Value>,
    field: &'static str,
    expected_len: Option<usize>,
) -> Result<Vec<String>, ValidationError> {
    let Some(items) = obj.get(field).and_then(Value::as_array) else {
        return Err(ValidationError::NotAList { field });
    };
    if let Some(expected) = expected_len
        && items.len() != expected
    {
        return Err(ValidationError::WrongLength {
            field,
            expected,
            found: items.len(),
        });
    }
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or(ValidationError::NotAString { field })
        })
        .collect()
}
