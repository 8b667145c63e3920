//! Running totals across rounds
//!
//! The round scoreboard is rebuilt with fresh colors every round. The
//! leaderboard keeps what survives between rounds: the points each role
//! earned in every finished round and the totals derived from them.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    device::{Role, Roster},
    scoreboard::Scoreboard,
};

/// Serialization helper for Leaderboard struct
#[derive(Deserialize)]
struct LeaderboardSerde {
    points_earned: Vec<Vec<(Role, i64)>>,
}

/// Points earned by each role over the rounds of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LeaderboardSerde")]
pub struct Leaderboard {
    /// Points earned by each role, one entry per finished round
    points_earned: Vec<Vec<(Role, i64)>>,

    /// Totals in descending order (cached)
    #[serde(skip)]
    scores_descending: Vec<(Role, i64)>,
    /// Mapping from role to its total (cached)
    #[serde(skip)]
    totals: HashMap<Role, i64>,
}

impl From<LeaderboardSerde> for Leaderboard {
    fn from(serde: LeaderboardSerde) -> Self {
        let totals = serde
            .points_earned
            .iter()
            .flat_map(|points_earned| points_earned.iter().copied())
            .sorted_by_key(|(role, _)| *role)
            .coalesce(|(role1, points1), (role2, points2)| {
                if role1 == role2 {
                    Ok((role1, points1 + points2))
                } else {
                    Err(((role1, points1), (role2, points2)))
                }
            })
            .collect::<HashMap<_, _>>();

        Leaderboard {
            scores_descending: Self::descending(&totals),
            totals,
            points_earned: serde.points_earned,
        }
    }
}

impl Leaderboard {
    /// Totals sorted by points, highest first, ties broken by role
    fn descending(totals: &HashMap<Role, i64>) -> Vec<(Role, i64)> {
        totals
            .iter()
            .map(|(role, points)| (*role, *points))
            .sorted_by(|(role1, points1), (role2, points2)| {
                points2.cmp(points1).then(role1.cmp(role2))
            })
            .collect_vec()
    }

    /// Adds the points of one finished round
    pub fn add_scores(&mut self, scores: &[(Role, i64)]) {
        for (role, points) in scores {
            *self.totals.entry(*role).or_default() += points;
        }
        self.points_earned.push(scores.to_vec());
        self.scores_descending = Self::descending(&self.totals);
    }

    /// Adds the points of a finished round, matching scoreboard devices to
    /// their roles
    ///
    /// Devices not on the roster are skipped.
    pub fn add_round(&mut self, roster: &Roster, scoreboard: &Scoreboard) {
        let scores = scoreboard
            .entries()
            .iter()
            .filter_map(|entry| Some((roster.role_of(&entry.device)?, entry.score)))
            .collect_vec();
        self.add_scores(&scores);
    }

    /// Number of finished rounds
    pub fn rounds(&self) -> usize {
        self.points_earned.len()
    }

    /// Total points of `role`, if it ever scored in a round
    pub fn total(&self, role: Role) -> Option<i64> {
        self.totals.get(&role).copied()
    }

    /// Totals, highest first
    pub fn standings(&self) -> &[(Role, i64)] {
        &self.scores_descending
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::scoreboard::ScoringPolicy;

    #[test]
    fn test_add_scores_accumulates() {
        let mut leaderboard = Leaderboard::default();
        leaderboard.add_scores(&[(Role::FIRST, 2), (Role::SECOND, 1)]);
        leaderboard.add_scores(&[(Role::FIRST, 0), (Role::SECOND, 2)]);

        assert_eq!(leaderboard.rounds(), 2);
        assert_eq!(leaderboard.total(Role::FIRST), Some(2));
        assert_eq!(leaderboard.total(Role::SECOND), Some(3));
        assert_eq!(leaderboard.total(Role::THIRD), None);
        assert_eq!(
            leaderboard.standings(),
            &[(Role::SECOND, 3), (Role::FIRST, 2)]
        );
    }

    #[test]
    fn test_standings_break_ties_by_role() {
        let mut leaderboard = Leaderboard::default();
        leaderboard.add_scores(&[(Role::SECOND, 1), (Role::FIRST, 1)]);
        assert_eq!(
            leaderboard.standings(),
            &[(Role::FIRST, 1), (Role::SECOND, 1)]
        );
    }

    #[test]
    fn test_add_round_maps_devices_to_roles() {
        let mut roster = Roster::default();
        roster.enroll(Role::FIRST, "A".into()).unwrap();
        roster.enroll(Role::SECOND, "B".into()).unwrap();

        let mut rng = fastrand::Rng::with_seed(9);
        let mut board = Scoreboard::deal(roster.devices(), &mut rng);
        board.record_press(&"B".into(), ScoringPolicy::AllowNegative);
        board.record_press(&"A".into(), ScoringPolicy::AllowNegative);

        let mut leaderboard = Leaderboard::default();
        leaderboard.add_round(&roster, &board);
        assert_eq!(leaderboard.total(Role::SECOND), Some(2));
        assert_eq!(leaderboard.total(Role::FIRST), Some(1));
    }

    #[test]
    fn test_serde_rebuilds_totals() {
        let mut leaderboard = Leaderboard::default();
        leaderboard.add_scores(&[(Role::FIRST, 2), (Role::SECOND, 1)]);
        leaderboard.add_scores(&[(Role::FIRST, 1), (Role::SECOND, 2)]);

        let json = serde_json::to_string(&leaderboard).unwrap();
        let restored: Leaderboard = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, leaderboard);
        assert_eq!(restored.total(Role::FIRST), Some(3));
    }
}
