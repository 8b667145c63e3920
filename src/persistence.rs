//! Scores kept between sessions
//!
//! Sessions are ephemeral; the only thing that outlives them is a small
//! record of the last game's totals, stored per user by an external backend
//! behind the [`ScoreStore`] trait. The store is read when the skill
//! launches and written when the players decide to quit.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    animation::Color,
    device::Role,
    session::Session,
};

/// Identity the persisted record is keyed by
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct UserId(String);

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// A player's line in the persisted record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Button the player used
    pub role: Role,
    /// Color the player had in the last round
    pub color: Option<Color>,
    /// Points over every round of the game
    pub score: i64,
}

/// Totals of the last game played by a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Players, highest total first
    pub players: Vec<PlayerRecord>,
    /// Rounds played
    pub rounds: usize,
}

impl ScoreRecord {
    /// Builds the record for the game played in `session`
    pub fn from_session(session: &Session) -> Self {
        let color_of = |role: Role| {
            let device = session.roster().device(role)?;
            Some(session.scoreboard.as_ref()?.entry(device)?.color)
        };
        Self {
            players: session
                .leaderboard
                .standings()
                .iter()
                .map(|(role, score)| PlayerRecord {
                    role: *role,
                    color: color_of(*role),
                    score: *score,
                })
                .collect_vec(),
            rounds: session.leaderboard.rounds(),
        }
    }

    /// The player with the highest total
    pub fn winner(&self) -> Option<&PlayerRecord> {
        self.players.first()
    }
}

/// Failures of the persistence backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached
    #[error("score store unavailable: {0}")]
    Unavailable(String),
    /// A stored record could not be decoded
    #[error("stored score record is corrupt: {0}")]
    Corrupt(String),
}

/// Backend keeping one [`ScoreRecord`] per user
pub trait ScoreStore {
    /// Fetches the record of `user`
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn load(&self, user: &UserId) -> Result<Option<ScoreRecord>, StoreError>;

    /// Replaces the record of `user`
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn save(&mut self, user: &UserId, record: ScoreRecord) -> Result<(), StoreError>;
}

/// Store keeping records as JSON documents in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: HashMap<UserId, String>,
}

impl ScoreStore for MemoryStore {
    fn load(&self, user: &UserId) -> Result<Option<ScoreRecord>, StoreError> {
        self.documents
            .get(user)
            .map(|document| {
                serde_json::from_str(document).map_err(|e| StoreError::Corrupt(e.to_string()))
            })
            .transpose()
    }

    fn save(&mut self, user: &UserId, record: ScoreRecord) -> Result<(), StoreError> {
        let document =
            serde_json::to_string(&record).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        self.documents.insert(user.clone(), document);
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::scoreboard::{Scoreboard, ScoringPolicy};

    fn record() -> ScoreRecord {
        ScoreRecord {
            players: vec![
                PlayerRecord {
                    role: Role::SECOND,
                    color: Some(Color::Red),
                    score: 7,
                },
                PlayerRecord {
                    role: Role::FIRST,
                    color: Some(Color::Yellow),
                    score: 4,
                },
            ],
            rounds: 3,
        }
    }

    #[test]
    fn test_memory_store_load_missing() {
        let store = MemoryStore::default();
        assert_eq!(store.load(&"user".into()), Ok(None));
    }

    #[test]
    fn test_memory_store_save_then_load() {
        let mut store = MemoryStore::default();
        store.save(&"user".into(), record()).unwrap();

        assert_eq!(store.load(&"user".into()), Ok(Some(record())));
        assert_eq!(store.load(&"other".into()), Ok(None));
    }

    #[test]
    fn test_memory_store_corrupt_document() {
        let mut store = MemoryStore::default();
        store
            .documents
            .insert("user".into(), "{not json".to_owned());
        assert!(matches!(
            store.load(&"user".into()),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_winner_is_first_player() {
        assert_eq!(record().winner().map(|p| p.score), Some(7));
        assert!(ScoreRecord::default().winner().is_none());
    }

    #[test]
    fn test_record_from_session() {
        let mut session = Session::default();
        session.enroll(Role::FIRST, "A".into(), 2).unwrap();
        session.enroll(Role::SECOND, "B".into(), 2).unwrap();

        let mut rng = fastrand::Rng::with_seed(5);
        let mut board = Scoreboard::deal(session.roster().devices(), &mut rng);
        board.record_press(&"B".into(), ScoringPolicy::AllowNegative);
        let b_color = board.entry(&"B".into()).map(|e| e.color);
        session.scoreboard = Some(board);
        session.tally_round();

        let record = ScoreRecord::from_session(&session);
        assert_eq!(record.rounds, 1);
        assert_eq!(record.players.len(), 2);
        assert_eq!(record.players[0].role, Role::SECOND);
        assert_eq!(record.players[0].score, 2);
        assert_eq!(record.players[0].color, b_color);
        assert_eq!(record.players[1].score, 0);
    }
}
