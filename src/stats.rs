use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game_log::{GameLog, PROTOCOLS_PER_SIDE, RecordDefect, Side};

const MATCHUP_SEPARATOR: &str = "_vs_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    pub wins: u32,
    pub losses: u32,
}

impl ProtocolRecord {
    pub fn games(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }

    /// Whole-number win percentage, 0 when the protocol never decided a game.
    pub fn win_rate_pct(&self) -> u32 {
        let total = self.games();
        if total == 0 {
            return 0;
        }
        (f64::from(self.wins) * 100.0 / f64::from(total)).round() as u32
    }
}

/// Head-to-head tally from the point of view of the first label in the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupRecord {
    #[serde(rename = "wins_A")]
    pub wins_a: u32,
    #[serde(rename = "losses_A")]
    pub losses_a: u32,
}

impl MatchupRecord {
    pub fn games(&self) -> u32 {
        self.wins_a.saturating_add(self.losses_a)
    }

    pub fn side_a(&self) -> ProtocolRecord {
        ProtocolRecord {
            wins: self.wins_a,
            losses: self.losses_a,
        }
    }

    pub fn side_b(&self) -> ProtocolRecord {
        ProtocolRecord {
            wins: self.losses_a,
            losses: self.wins_a,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub games_played: u32,
    pub player_wins: BTreeMap<String, u32>,
    pub protocol_stats: BTreeMap<String, ProtocolRecord>,
    pub protocol_matchups: BTreeMap<String, MatchupRecord>,
}

impl StatsSnapshot {
    pub fn is_empty(&self) -> bool {
        self.games_played == 0
    }

    /// The two labels behind a matchup key. A label may itself contain the
    /// separator, so the split is checked against the protocols seen here.
    pub fn matchup_labels<'a>(&self, key: &'a str) -> Option<(&'a str, &'a str)> {
        key.match_indices(MATCHUP_SEPARATOR)
            .map(|(idx, sep)| (&key[..idx], &key[idx + sep.len()..]))
            .find(|(a, b)| {
                a <= b
                    && self.protocol_stats.contains_key(*a)
                    && self.protocol_stats.contains_key(*b)
            })
            .or_else(|| split_matchup_key(key))
    }

    fn protocol_entry(&mut self, label: &str) -> &mut ProtocolRecord {
        self.protocol_stats.entry(label.to_string()).or_default()
    }

    fn player_entry(&mut self, name: &str) -> &mut u32 {
        self.player_wins.entry(name.to_string()).or_insert(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub id: i64,
    pub defect: RecordDefect,
}

/// Snapshot plus the records that were left out of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    pub snapshot: StatsSnapshot,
    pub skipped: Vec<SkippedRecord>,
}

pub fn aggregate(logs: &[GameLog]) -> StatsSnapshot {
    aggregate_with_report(logs).snapshot
}

/// Builds fresh statistics from a frozen set of logs.
///
/// Records whose protocol columns do not decode to lists are skipped and
/// reported; they never fail the run and are not counted as played.
pub fn aggregate_with_report(logs: &[GameLog]) -> AggregateReport {
    let mut report = AggregateReport::default();
    for game in logs {
        if let Err(defect) = tally_game(&mut report.snapshot, game) {
            log::warn!("skipping game log {}: {defect}", game.id);
            report.skipped.push(SkippedRecord {
                id: game.id,
                defect,
            });
        }
    }
    log::debug!(
        "aggregated {} of {} game logs ({} skipped)",
        report.snapshot.games_played,
        logs.len(),
        report.skipped.len()
    );
    report
}

fn tally_game(snapshot: &mut StatsSnapshot, game: &GameLog) -> Result<(), RecordDefect> {
    let (p1_protos, p2_protos) = game.decode_protocols()?;

    snapshot.player_entry(game.player1());
    snapshot.player_entry(game.player2());

    // Every played protocol is listed, even one that never decided a game.
    for label in p1_protos.iter().chain(&p2_protos) {
        if !label.is_empty() {
            snapshot.protocol_entry(label);
        }
    }

    if let Some(side) = game.winning_side() {
        *snapshot.player_entry(game.player(side)) += 1;

        let (winning, losing) = match side {
            Side::Player1 => (&p1_protos, &p2_protos),
            Side::Player2 => (&p2_protos, &p1_protos),
        };
        for label in winning.iter().filter(|label| !label.is_empty()) {
            snapshot.protocol_entry(label).wins += 1;
        }
        for label in losing.iter().filter(|label| !label.is_empty()) {
            snapshot.protocol_entry(label).losses += 1;
        }

        if p1_protos.len() == PROTOCOLS_PER_SIDE && p2_protos.len() == PROTOCOLS_PER_SIDE {
            tally_matchups(snapshot, &p1_protos, &p2_protos, side);
        }
    }

    snapshot.games_played += 1;
    Ok(())
}

fn tally_matchups(
    snapshot: &mut StatsSnapshot,
    p1_protos: &[String],
    p2_protos: &[String],
    winner: Side,
) {
    for (proto1, proto2) in p1_protos.iter().zip(p2_protos) {
        if proto1.is_empty() || proto2.is_empty() {
            continue;
        }
        let (proto_a, proto_b) = ordered_pair(proto1, proto2);
        let winning_label = match winner {
            Side::Player1 => proto1,
            Side::Player2 => proto2,
        };
        let record = snapshot
            .protocol_matchups
            .entry(matchup_key(proto_a, proto_b))
            .or_default();
        // Equal labels always land on wins_A.
        if winning_label == proto_a {
            record.wins_a += 1;
        } else {
            record.losses_a += 1;
        }
    }
}

fn ordered_pair<'a>(left: &'a str, right: &'a str) -> (&'a str, &'a str) {
    if right < left { (right, left) } else { (left, right) }
}

/// Canonical key for two labels that met at the same draft position.
pub fn matchup_key(left: &str, right: &str) -> String {
    let (a, b) = ordered_pair(left, right);
    format!("{a}{MATCHUP_SEPARATOR}{b}")
}

pub fn split_matchup_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(MATCHUP_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matchup_key_is_order_independent() {
        assert_eq!(matchup_key("Rock", "Paper"), "Paper_vs_Rock");
        assert_eq!(matchup_key("Paper", "Rock"), "Paper_vs_Rock");
        assert_eq!(matchup_key("Fire", "Fire"), "Fire_vs_Fire");
    }

    #[test]
    fn split_matchup_key_round_trips_plain_labels() {
        assert_eq!(split_matchup_key("Death_vs_Life"), Some(("Death", "Life")));
        assert_eq!(split_matchup_key("Death"), None);
    }

    #[test]
    fn win_rate_rounds_to_whole_percent() {
        let record = ProtocolRecord { wins: 2, losses: 1 };
        assert_eq!(record.win_rate_pct(), 67);
        assert_eq!(ProtocolRecord::default().win_rate_pct(), 0);
    }

    #[test]
    fn matchup_sides_mirror_each_other() {
        let record = MatchupRecord {
            wins_a: 3,
            losses_a: 1,
        };
        assert_eq!(record.side_a(), ProtocolRecord { wins: 3, losses: 1 });
        assert_eq!(record.side_b(), ProtocolRecord { wins: 1, losses: 3 });
        assert_eq!(record.games(), 4);
    }

    #[test]
    fn games_saturate_instead_of_overflowing() {
        let record = ProtocolRecord {
            wins: u32::MAX,
            losses: 2,
        };
        assert_eq!(record.games(), u32::MAX);
        assert_eq!(record.win_rate_pct(), 100);

        let matchup = MatchupRecord {
            wins_a: 1,
            losses_a: u32::MAX,
        };
        assert_eq!(matchup.games(), u32::MAX);
    }
}
