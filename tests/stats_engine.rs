use compile_stats::game_log::{GameLog, NewGameLog, RecordDefect};
use compile_stats::stats::{
    MatchupRecord, ProtocolRecord, StatsSnapshot, aggregate, aggregate_with_report, matchup_key,
};

fn game(
    id: i64,
    p1: &str,
    p1_protos: &[&str],
    p2: &str,
    p2_protos: &[&str],
    winner: &str,
) -> GameLog {
    let new = NewGameLog {
        player1_name: p1.to_string(),
        player1_protocols: p1_protos.iter().map(|s| s.to_string()).collect(),
        player2_name: p2.to_string(),
        player2_protocols: p2_protos.iter().map(|s| s.to_string()).collect(),
        winner_name: winner.to_string(),
    };
    GameLog::from_new(id, "2026-01-01T12:00:00+00:00", &new)
}

fn raw_game(id: i64, p1_protos: Option<&str>, p2_protos: Option<&str>) -> GameLog {
    GameLog {
        id,
        timestamp: "2026-01-01T12:00:00+00:00".to_string(),
        player1_name: Some("Ada".to_string()),
        player1_protocols: p1_protos.map(str::to_string),
        player2_name: Some("Grace".to_string()),
        player2_protocols: p2_protos.map(str::to_string),
        winner_name: Some("Ada".to_string()),
    }
}

fn record(wins: u32, losses: u32) -> ProtocolRecord {
    ProtocolRecord { wins, losses }
}

#[test]
fn empty_input_yields_zeroed_snapshot() {
    let stats = aggregate(&[]);
    assert_eq!(stats, StatsSnapshot::default());
    assert!(stats.is_empty());

    let json = serde_json::to_value(&stats).expect("snapshot serializes");
    assert_eq!(
        json,
        serde_json::json!({
            "gamesPlayed": 0,
            "playerWins": {},
            "protocolStats": {},
            "protocolMatchups": {}
        })
    );
}

#[test]
fn rotated_triples_credit_each_position() {
    let logs = vec![game(
        1,
        "Ada",
        &["A", "B", "C"],
        "Grace",
        &["B", "C", "A"],
        "Ada",
    )];
    let stats = aggregate(&logs);

    assert_eq!(stats.games_played, 1);
    assert_eq!(stats.player_wins.get("Ada"), Some(&1));
    assert_eq!(stats.player_wins.get("Grace"), Some(&0));
    for label in ["A", "B", "C"] {
        assert_eq!(stats.protocol_stats.get(label), Some(&record(1, 1)), "{label}");
    }

    // Positions: A vs B, B vs C, C vs A; Ada's label wins every slot.
    assert_eq!(
        stats.protocol_matchups.get("A_vs_B"),
        Some(&MatchupRecord { wins_a: 1, losses_a: 0 })
    );
    assert_eq!(
        stats.protocol_matchups.get("B_vs_C"),
        Some(&MatchupRecord { wins_a: 1, losses_a: 0 })
    );
    assert_eq!(
        stats.protocol_matchups.get("A_vs_C"),
        Some(&MatchupRecord { wins_a: 0, losses_a: 1 })
    );
}

#[test]
fn matchup_key_is_lexicographic_whoever_supplied_it() {
    assert_eq!(matchup_key("Rock", "Paper"), "Paper_vs_Rock");

    let rock_first = vec![game(1, "Ada", &["Rock", "X", "Y"], "Grace", &["Paper", "Z", "W"], "Ada")];
    let paper_first = vec![game(1, "Ada", &["Paper", "X", "Y"], "Grace", &["Rock", "Z", "W"], "Grace")];

    let a = aggregate(&rock_first);
    let b = aggregate(&paper_first);
    // Rock won both times, so Paper (the A label) lost both times.
    assert_eq!(
        a.protocol_matchups.get("Paper_vs_Rock"),
        Some(&MatchupRecord { wins_a: 0, losses_a: 1 })
    );
    assert_eq!(a.protocol_matchups.get("Paper_vs_Rock"), b.protocol_matchups.get("Paper_vs_Rock"));
    assert!(!a.protocol_matchups.contains_key("Rock_vs_Paper"));
}

#[test]
fn winner_gets_exactly_one_win_per_game() {
    let logs = vec![
        game(1, "Ada", &["A", "B", "C"], "Grace", &["D", "E", "F"], "Ada"),
        game(2, "Grace", &["A", "B", "C"], "Ada", &["D", "E", "F"], "Ada"),
        game(3, "Linus", &["A", "B", "C"], "Grace", &["D", "E", "F"], "Grace"),
    ];
    let stats = aggregate(&logs);
    assert_eq!(stats.player_wins.get("Ada"), Some(&2));
    assert_eq!(stats.player_wins.get("Grace"), Some(&1));
    assert_eq!(stats.player_wins.get("Linus"), Some(&0));
    assert_eq!(stats.games_played, 3);
}

#[test]
fn unmatched_winner_registers_presence_only() {
    // Deliberate choice: protocols seen in any valid game are listed at 0/0
    // even when no decisive result touched them.
    let logs = vec![game(
        1,
        "Ada",
        &["Fire", "Water", "Life"],
        "Grace",
        &["Death", "Metal", "Speed"],
        "Nobody",
    )];
    let stats = aggregate(&logs);

    assert_eq!(stats.games_played, 1);
    assert_eq!(stats.player_wins.len(), 2);
    assert!(stats.player_wins.values().all(|wins| *wins == 0));
    assert!(!stats.player_wins.contains_key("Nobody"));
    assert_eq!(stats.protocol_stats.len(), 6);
    assert!(stats.protocol_stats.values().all(|r| *r == record(0, 0)));
    assert!(stats.protocol_matchups.is_empty());
}

#[test]
fn empty_or_missing_winner_credits_no_one() {
    let mut missing = game(1, "Ada", &["A", "B", "C"], "Grace", &["D", "E", "F"], "");
    let empty = missing.clone();
    missing.winner_name = None;

    for log in [missing, empty] {
        let stats = aggregate(&[log]);
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.player_wins.get("Ada"), Some(&0));
        assert_eq!(stats.player_wins.get("Grace"), Some(&0));
        assert_eq!(stats.protocol_stats.get("A"), Some(&record(0, 0)));
        assert!(stats.protocol_matchups.is_empty());
    }
}

#[test]
fn short_sequences_skip_matchups_but_still_count() {
    let logs = vec![game(1, "Ada", &["A", "B"], "Grace", &["C", "D", "E"], "Grace")];
    let stats = aggregate(&logs);

    assert_eq!(stats.games_played, 1);
    assert_eq!(stats.player_wins.get("Grace"), Some(&1));
    assert_eq!(stats.protocol_stats.get("A"), Some(&record(0, 1)));
    assert_eq!(stats.protocol_stats.get("E"), Some(&record(1, 0)));
    assert!(stats.protocol_matchups.is_empty());
}

#[test]
fn malformed_records_are_skipped_and_reported() {
    let logs = vec![
        raw_game(1, Some(r#"["A","B","C"]"#), Some("not json")),
        raw_game(2, Some(r#"{"a": 1}"#), Some(r#"["A","B","C"]"#)),
        raw_game(3, Some(r#""Fire""#), Some(r#"["A","B","C"]"#)),
        raw_game(4, Some(r#"["A","B","C"]"#), Some(r#"["D","E","F"]"#)),
    ];
    let report = aggregate_with_report(&logs);

    assert_eq!(report.snapshot.games_played, 1);
    assert_eq!(
        report.skipped.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(matches!(
        report.skipped[0].defect,
        RecordDefect::Undecodable { field: "player2Protocols", .. }
    ));
    assert_eq!(
        report.skipped[1].defect,
        RecordDefect::NotASequence {
            field: "player1Protocols"
        }
    );
    // Skipped rows leave no trace behind.
    assert_eq!(report.snapshot.player_wins.get("Ada"), Some(&1));
    assert_eq!(report.snapshot.protocol_stats.get("A"), Some(&record(1, 0)));
}

#[test]
fn any_length_sequence_counts_as_played() {
    let logs = vec![
        raw_game(1, Some("[]"), Some("[]")),
        raw_game(2, Some(r#"["X"]"#), Some(r#"["A","B","C","D"]"#)),
    ];
    let stats = aggregate(&logs);
    assert_eq!(stats.games_played, 2);
    assert_eq!(stats.protocol_stats.get("D"), Some(&record(0, 1)));
    assert_eq!(stats.protocol_stats.get("X"), Some(&record(1, 0)));
    assert!(stats.protocol_matchups.is_empty());
}

#[test]
fn null_protocol_column_is_skipped_like_json_null() {
    for p1_protos in [None, Some("null")] {
        let logs = vec![raw_game(1, p1_protos, Some(r#"["D","E","F"]"#))];
        let report = aggregate_with_report(&logs);

        assert_eq!(report.snapshot, StatsSnapshot::default(), "{p1_protos:?}");
        assert_eq!(report.skipped.len(), 1);
    }

    let report = aggregate_with_report(&[raw_game(7, None, Some("[]"))]);
    assert_eq!(
        report.skipped[0].defect,
        RecordDefect::Missing {
            field: "player1Protocols"
        }
    );
}

#[test]
fn empty_labels_are_ignored_everywhere() {
    let logs = vec![game(1, "Ada", &["A", "", "C"], "Grace", &["B", "D", ""], "Ada")];
    let stats = aggregate(&logs);

    assert!(!stats.protocol_stats.contains_key(""));
    assert_eq!(stats.protocol_stats.len(), 4);
    assert_eq!(stats.protocol_matchups.len(), 1);
    assert_eq!(
        stats.protocol_matchups.get("A_vs_B"),
        Some(&MatchupRecord { wins_a: 1, losses_a: 0 })
    );
}

#[test]
fn mirror_labels_always_credit_wins_a() {
    let p1_wins = vec![game(1, "Ada", &["Fire", "X", "Y"], "Grace", &["Fire", "Z", "W"], "Ada")];
    let p2_wins = vec![game(1, "Ada", &["Fire", "X", "Y"], "Grace", &["Fire", "Z", "W"], "Grace")];

    for logs in [p1_wins, p2_wins] {
        let stats = aggregate(&logs);
        assert_eq!(
            stats.protocol_matchups.get("Fire_vs_Fire"),
            Some(&MatchupRecord { wins_a: 1, losses_a: 0 })
        );
        assert_eq!(stats.protocol_stats.get("Fire"), Some(&record(1, 1)));
    }
}

#[test]
fn missing_names_fall_back_to_placeholders() {
    let mut log = game(1, "", &["A", "B", "C"], "", &["D", "E", "F"], "");
    log.player1_name = None;
    log.player2_name = None;
    log.winner_name = Some("Unknown P2".to_string());

    let stats = aggregate(&[log]);
    assert_eq!(stats.player_wins.get("Unknown P1"), Some(&0));
    assert_eq!(stats.player_wins.get("Unknown P2"), Some(&1));
    assert_eq!(stats.protocol_stats.get("D"), Some(&record(1, 0)));
}

#[test]
fn aggregation_is_repeatable_and_order_free() {
    let logs = vec![
        game(1, "Ada", &["Fire", "Water", "Life"], "Grace", &["Death", "Metal", "Speed"], "Ada"),
        game(2, "Grace", &["Fire", "Hate", "Life"], "Linus", &["Water", "Metal", "Plague"], "Linus"),
        raw_game(3, Some("oops"), Some("[]")),
        game(4, "Ada", &["Spirit", "Gravity"], "Linus", &["Love", "Light", "Apathy"], "Ada"),
    ];
    let first = aggregate(&logs);
    let second = aggregate(&logs);
    assert_eq!(first, second);

    let mut reversed = logs.clone();
    reversed.reverse();
    assert_eq!(aggregate(&reversed), first);
    assert_eq!(first.games_played, 3);
}

#[test]
fn same_name_on_both_sides_credits_player_one_side() {
    let logs = vec![game(1, "Ada", &["A", "B", "C"], "Ada", &["D", "E", "F"], "Ada")];
    let stats = aggregate(&logs);
    assert_eq!(stats.player_wins.len(), 1);
    assert_eq!(stats.player_wins.get("Ada"), Some(&1));
    assert_eq!(stats.protocol_stats.get("A"), Some(&record(1, 0)));
    assert_eq!(stats.protocol_stats.get("D"), Some(&record(0, 1)));
}

#[test]
fn snapshot_serializes_with_wire_names() {
    let logs = vec![game(1, "Ada", &["Rock", "X", "Y"], "Grace", &["Paper", "Z", "W"], "Ada")];
    let json = serde_json::to_value(aggregate(&logs)).expect("snapshot serializes");
    assert_eq!(json["gamesPlayed"], 1);
    assert_eq!(json["playerWins"]["Ada"], 1);
    assert_eq!(json["protocolStats"]["Rock"]["wins"], 1);
    assert_eq!(json["protocolStats"]["Paper"]["losses"], 1);
    assert_eq!(json["protocolMatchups"]["Paper_vs_Rock"]["wins_A"], 0);
    assert_eq!(json["protocolMatchups"]["Paper_vs_Rock"]["losses_A"], 1);
}
