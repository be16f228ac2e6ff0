//! Per-player scorecards and match/draw rules (C6). Built directly from
//! spec.md §3/§4.5 — the original has no standalone keeper module (see
//! DESIGN.md), so this is the one component with no line-level source to
//! transliterate.

use crate::actors::Side;

/// Identifies a player for scoring purposes: display name, free-text
/// policy name (carried through from registration, SPEC_FULL.md §F.1),
/// and side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerId {
    pub name: String,
    pub strategy_name: String,
    pub side: Side,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreCard {
    pub match_points: u32,
    pub total_points: u32,
    pub matches_won: u32,
}

pub struct ScoreKeeper {
    pub left: (PlayerId, ScoreCard),
    pub right: (PlayerId, ScoreCard),
    points_in_match: u32,
    hits_for_draw: u32,
    /// Count of sign reversals of the primary ball's `vx` since the last
    /// scoring event; tracked by the match loop, exposed here for the
    /// draw check (spec §4.6 step 3).
    change_of_direction_count: u32,
}

impl ScoreKeeper {
    pub fn new(left: PlayerId, right: PlayerId, points_in_match: u32, hits_for_draw: u32) -> Self {
        ScoreKeeper {
            left: (left, ScoreCard::default()),
            right: (right, ScoreCard::default()),
            points_in_match,
            hits_for_draw,
            change_of_direction_count: 0,
        }
    }

    fn card_mut(&mut self, side: Side) -> &mut ScoreCard {
        match side {
            Side::Left => &mut self.left.1,
            Side::Right => &mut self.right.1,
        }
    }

    fn other_mut(&mut self, side: Side) -> &mut ScoreCard {
        match side {
            Side::Left => &mut self.right.1,
            Side::Right => &mut self.left.1,
        }
    }

    /// `winner` takes a match point; if that completes the match, both
    /// sides' `match_points` reset to zero and `winner.matches_won`
    /// increments (spec §4.5).
    pub fn tally_point(&mut self, winner: Side) {
        let card = self.card_mut(winner);
        card.match_points += 1;
        card.total_points += 1;
        if card.match_points == self.points_in_match {
            card.matches_won += 1;
            card.match_points = 0;
            self.other_mut(winner).match_points = 0;
        }
        self.change_of_direction_count = 0;
    }

    /// Neither side scores; the rally is considered drawn (spec §4.5).
    pub fn tally_aborted_point(&mut self) {
        self.change_of_direction_count = 0;
    }

    /// Called once per tick with the sign of the primary ball's `vx`.
    /// Returns `true` iff this observation completes `HITS_FOR_DRAW`
    /// consecutive direction reversals with no backline crossing in
    /// between (spec §4.6 step 3).
    pub fn note_direction(&mut self, reversed: bool) -> bool {
        if reversed {
            self.change_of_direction_count += 1;
        }
        self.change_of_direction_count >= self.hits_for_draw
    }

    pub fn reset_direction_counter(&mut self) {
        self.change_of_direction_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keeper() -> ScoreKeeper {
        ScoreKeeper::new(
            PlayerId { name: "l".into(), strategy_name: "Stationary".into(), side: Side::Left },
            PlayerId { name: "r".into(), strategy_name: "Stationary".into(), side: Side::Right },
            5,
            20,
        )
    }

    #[test]
    fn tally_point_accumulates_until_match_points() {
        let mut keeper = keeper();
        for _ in 0..4 {
            keeper.tally_point(Side::Left);
        }
        assert_eq!(keeper.left.1.match_points, 4);
        assert_eq!(keeper.left.1.matches_won, 0);
        keeper.tally_point(Side::Left);
        assert_eq!(keeper.left.1.match_points, 0);
        assert_eq!(keeper.right.1.match_points, 0);
        assert_eq!(keeper.left.1.matches_won, 1);
        assert_eq!(keeper.left.1.total_points, 5);
    }

    #[test]
    fn aborted_point_scores_nobody() {
        let mut keeper = keeper();
        keeper.tally_aborted_point();
        assert_eq!(keeper.left.1.total_points, 0);
        assert_eq!(keeper.right.1.total_points, 0);
    }

    #[test]
    fn direction_count_triggers_draw_at_threshold() {
        let mut keeper = keeper();
        let mut triggered = false;
        for _ in 0..20 {
            triggered = keeper.note_direction(true);
        }
        assert!(triggered);
    }

    #[test]
    fn scoring_resets_direction_counter() {
        let mut keeper = keeper();
        for _ in 0..10 {
            keeper.note_direction(true);
        }
        keeper.tally_point(Side::Right);
        assert!(!keeper.note_direction(false));
    }
}
