//! Game log storage and protocol statistics for two-player drafted games.

pub mod config;
pub mod draft;
pub mod export;
pub mod game_log;
pub mod response;
pub mod state;
pub mod stats;
pub mod store;
pub mod store_worker;
pub mod validation;

pub use game_log::{GameLog, LogUpdate, NewGameLog, RecordDefect, Side};
pub use stats::{
    AggregateReport, MatchupRecord, ProtocolRecord, StatsSnapshot, aggregate,
    aggregate_with_report, matchup_key,
};
pub use store::LogStore;
