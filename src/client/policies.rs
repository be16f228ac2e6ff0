//! The five pluggable paddle policies (C9), grounded in `original`'s
//! `paddles/paddle.py` (`StationaryPaddle`, `AlwaysUpPaddle`,
//! `AlwaysDownPaddle`, `FollowTheBallPaddle`, `EnhancedFollowTheBallPaddle`).

use rand::{Rng, RngCore};

use crate::proto::{self, ActorType, GameState, PaddleDirective, PaddleType};

/// A strategy for turning the latest `GameState` into a `PaddleDirective`.
/// `rand::Rng` is threaded in rather than captured so policies stay
/// trivially testable with a seeded generator.
pub trait PaddlePolicy: Send {
    fn decide(&mut self, state: &GameState, side: PaddleType, rng: &mut dyn RngCore) -> PaddleDirective;
}

fn find_actor(state: &GameState, actor_type: ActorType) -> Option<&proto::Actor> {
    state.actors.iter().find(|a| a.actor_type() == actor_type)
}

fn centroid_y(actor: &proto::Actor) -> f64 {
    if actor.coords.is_empty() {
        return 0.0;
    }
    actor.coords.iter().map(|c| c.y as f64).sum::<f64>() / actor.coords.len() as f64
}

fn my_paddle_type(side: PaddleType) -> ActorType {
    match side {
        PaddleType::Left => ActorType::LeftPaddle,
        PaddleType::Right => ActorType::RightPaddle,
        PaddleType::NotSet => ActorType::Unknown,
    }
}

pub struct Stationary;

impl PaddlePolicy for Stationary {
    fn decide(&mut self, _state: &GameState, _side: PaddleType, _rng: &mut dyn RngCore) -> PaddleDirective {
        PaddleDirective::Stationary
    }
}

pub struct AlwaysUp;

impl PaddlePolicy for AlwaysUp {
    fn decide(&mut self, _state: &GameState, _side: PaddleType, _rng: &mut dyn RngCore) -> PaddleDirective {
        PaddleDirective::Up
    }
}

pub struct AlwaysDown;

impl PaddlePolicy for AlwaysDown {
    fn decide(&mut self, _state: &GameState, _side: PaddleType, _rng: &mut dyn RngCore) -> PaddleDirective {
        PaddleDirective::Down
    }
}

/// Moves toward the ball's `y`; ties break randomly to avoid livelock
/// when the two opposing policies align perfectly (original's
/// `random.choice([UP, DOWN])`).
pub struct FollowTheBall;

impl PaddlePolicy for FollowTheBall {
    fn decide(&mut self, state: &GameState, side: PaddleType, rng: &mut dyn RngCore) -> PaddleDirective {
        let Some(ball) = find_actor(state, ActorType::PrimaryBall) else {
            tracing::error!("primary ball not found in actor list");
            return PaddleDirective::Stationary;
        };
        let Some(paddle) = find_actor(state, my_paddle_type(side)) else {
            tracing::error!("own paddle not found in actor list");
            return PaddleDirective::Stationary;
        };
        follow_ball_directive(centroid_y(ball), centroid_y(paddle), rng)
    }
}

fn follow_ball_directive(ball_y: f64, paddle_y: f64, rng: &mut dyn RngCore) -> PaddleDirective {
    if ball_y < paddle_y {
        PaddleDirective::Up
    } else if ball_y > paddle_y {
        PaddleDirective::Down
    } else if rng.gen_bool(0.5) {
        PaddleDirective::Up
    } else {
        PaddleDirective::Down
    }
}

/// Recenters toward the arena's vertical middle while the ball moves
/// away, and tracks the ball while it approaches. The original recenters
/// using the rendered frame's pixel height; since this core has no
/// renderer, recentering targets the geometric arena vertical center
/// instead (SPEC_FULL.md §F.2).
pub struct EnhancedFollowTheBall {
    arena_center_y: f64,
}

impl EnhancedFollowTheBall {
    pub fn new(arena_height: f64) -> Self {
        EnhancedFollowTheBall { arena_center_y: arena_height / 2.0 }
    }
}

impl PaddlePolicy for EnhancedFollowTheBall {
    fn decide(&mut self, state: &GameState, side: PaddleType, rng: &mut dyn RngCore) -> PaddleDirective {
        let Some(ball) = find_actor(state, ActorType::PrimaryBall) else {
            tracing::error!("primary ball not found in actor list");
            return PaddleDirective::Stationary;
        };
        let Some(paddle) = find_actor(state, my_paddle_type(side)) else {
            tracing::error!("own paddle not found in actor list");
            return PaddleDirective::Stationary;
        };

        let ball_vx = ball.velocity.as_ref().map(|v| v.x).unwrap_or(0);
        let moving_away = match side {
            PaddleType::Left => ball_vx > 0,
            PaddleType::Right => ball_vx < 0,
            PaddleType::NotSet => false,
        };

        let paddle_y = centroid_y(paddle);
        if moving_away {
            if paddle_y > self.arena_center_y {
                PaddleDirective::Up
            } else if paddle_y < self.arena_center_y {
                PaddleDirective::Down
            } else {
                PaddleDirective::Stationary
            }
        } else {
            follow_ball_directive(centroid_y(ball), paddle_y, rng)
        }
    }
}

/// Builds the named policy, matching the five strategy names exercised by
/// `--strategy` on the player binaries (SPEC_FULL.md §F.3).
pub fn by_name(name: &str, arena_height: f64) -> Box<dyn PaddlePolicy> {
    match name {
        "AlwaysUp" => Box::new(AlwaysUp),
        "AlwaysDown" => Box::new(AlwaysDown),
        "FollowTheBall" => Box::new(FollowTheBall),
        "EnhancedFollowTheBall" => Box::new(EnhancedFollowTheBall::new(arena_height)),
        _ => Box::new(Stationary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn actor(actor_type: ActorType, y: i32, vx: i32) -> proto::Actor {
        proto::Actor {
            actor_type: actor_type as i32,
            coords: vec![proto::Coord { x: 0, y }],
            velocity: Some(proto::Coord { x: vx, y: 0 }),
        }
    }

    fn state_with(ball_y: i32, paddle_y: i32, ball_vx: i32) -> GameState {
        GameState {
            state_iteration: 1,
            state_time: None,
            actors: vec![
                actor(ActorType::PrimaryBall, ball_y, ball_vx),
                actor(ActorType::LeftPaddle, paddle_y, 0),
            ],
            left_scorecard: None,
            right_scorecard: None,
            winning_player: None,
        }
    }

    #[test]
    fn follow_the_ball_moves_toward_ball() {
        let mut policy = FollowTheBall;
        let mut rng = StdRng::seed_from_u64(1);
        let state = state_with(100, 300, 0);
        assert_eq!(policy.decide(&state, PaddleType::Left, &mut rng), PaddleDirective::Up);
    }

    #[test]
    fn enhanced_follow_recenters_when_ball_moving_away() {
        let mut policy = EnhancedFollowTheBall::new(600.0);
        let mut rng = StdRng::seed_from_u64(1);
        // Left paddle, ball moving right (away from left side), paddle below center.
        let state = state_with(100, 400, 5);
        assert_eq!(policy.decide(&state, PaddleType::Left, &mut rng), PaddleDirective::Up);
    }

    #[test]
    fn enhanced_follow_tracks_when_ball_incoming() {
        let mut policy = EnhancedFollowTheBall::new(600.0);
        let mut rng = StdRng::seed_from_u64(1);
        // Ball moving left, toward the left paddle: track its y.
        let state = state_with(100, 400, -5);
        assert_eq!(policy.decide(&state, PaddleType::Left, &mut rng), PaddleDirective::Up);
    }

    #[test]
    fn stationary_never_moves() {
        let mut policy = Stationary;
        let mut rng = StdRng::seed_from_u64(1);
        let state = state_with(0, 0, 0);
        assert_eq!(policy.decide(&state, PaddleType::Left, &mut rng), PaddleDirective::Stationary);
    }
}
