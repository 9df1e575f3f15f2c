use compile_stats::game_log::GameLog;
use compile_stats::stats::aggregate;
use compile_stats::store::LogStore;
use compile_stats::validation::{ValidationError, parse_new_game, parse_update};

const VALID: &str = r#"{
    "player1Name": "Ada",
    "player1Protocols": ["Fire", "Water", "Life"],
    "player2Name": "Grace",
    "player2Protocols": ["Death", "Metal", "Speed"],
    "winnerName": "Grace"
}"#;

#[test]
fn valid_submission_parses() {
    let game = parse_new_game(VALID).expect("valid submission");
    assert_eq!(game.player1_name, "Ada");
    assert_eq!(game.player2_protocols, vec!["Death", "Metal", "Speed"]);
    assert_eq!(game.winner_name, "Grace");
}

#[test]
fn submission_needs_exactly_three_protocols() {
    let body = VALID.replace(r#"["Fire", "Water", "Life"]"#, r#"["Fire", "Water"]"#);
    assert_eq!(
        parse_new_game(&body),
        Err(ValidationError::WrongLength {
            field: "player1Protocols",
            expected: 3,
            found: 2,
        })
    );

    let body = VALID.replace(r#"["Death", "Metal", "Speed"]"#, r#""Death""#);
    assert_eq!(
        parse_new_game(&body),
        Err(ValidationError::NotAList {
            field: "player2Protocols"
        })
    );
}

#[test]
fn submission_rejects_non_string_protocols_and_bad_json() {
    let body = VALID.replace(r#"["Fire", "Water", "Life"]"#, r#"["Fire", 3, "Life"]"#);
    assert_eq!(
        parse_new_game(&body),
        Err(ValidationError::NotAString {
            field: "player1Protocols"
        })
    );
    assert!(matches!(
        parse_new_game("{not json"),
        Err(ValidationError::InvalidJson(_))
    ));
    assert!(matches!(
        parse_new_game("[1, 2]"),
        Err(ValidationError::InvalidJson(_))
    ));
}

#[test]
fn validation_messages_read_like_api_errors() {
    let err = parse_new_game(r#"{"player1Name": "Ada"}"#).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required fields: player1Protocols, player2Name, player2Protocols, winnerName"
    );
    assert_eq!(ValidationError::EmptyBody.to_string(), "No JSON data received.");
}

#[test]
fn update_accepts_any_list_length() {
    let update = parse_update(
        r#"{
            "player1_name": "Ada",
            "player1_protocols": [],
            "player2_name": "Grace",
            "player2_protocols": ["Fire", "Water", "Life", "Hate"],
            "winner_name": "Ada"
        }"#,
    )
    .expect("valid update");
    assert!(update.player1_protocols.is_empty());
    assert_eq!(update.player2_protocols.len(), 4);

    assert_eq!(
        parse_update(r#"{"player1_name": "Ada", "player1_protocols": "x", "player2_name": "B", "player2_protocols": [], "winner_name": "Ada"}"#),
        Err(ValidationError::NotAList {
            field: "player1_protocols"
        })
    );
}

#[test]
fn logged_game_flows_into_stats() {
    let store = LogStore::open_in_memory().expect("store");
    let game = parse_new_game(VALID).expect("valid submission");
    let id = store
        .append("2026-03-01T09:30:00+00:00", &game)
        .expect("append");

    let stored = store.get(id).expect("get").expect("log exists");
    assert_eq!(stored, GameLog::from_new(id, "2026-03-01T09:30:00+00:00", &game));

    let stats = aggregate(&store.list().expect("list"));
    assert_eq!(stats.games_played, 1);
    assert_eq!(stats.player_wins.get("Grace"), Some(&1));
    assert_eq!(stats.player_wins.get("Ada"), Some(&0));
    assert_eq!(stats.protocol_stats["Speed"].wins, 1);
    assert_eq!(stats.protocol_stats["Fire"].losses, 1);
    assert_eq!(stats.protocol_matchups["Death_vs_Fire"].wins_a, 1);
}
