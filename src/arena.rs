//! Fixed scenery and mutable actor list (C5), built one-to-one from
//! `original`'s `gameengine/arena.py`.

use rand::Rng;

use crate::actors::{self, Actor, BallFlavor, Side, SpeedBound};
use crate::config::Config;
use crate::geometry::{Polygon, Vector};

/// Index of each fixed actor within [`Arena::actors`]. Paddles are listed
/// before the walls, matching the original's `self.actors` construction
/// order (`arena.py`) — the tie-break DESIGN.md documents for
/// simultaneous ball-paddle/ball-wall candidate pairs in the same tick.
pub struct Arena {
    pub actors: Vec<Actor>,
    pub arena_width: f64,
    pub arena_height: f64,
    pub left_back_line_x: f64,
    pub right_back_line_x: f64,
    starting_ball_speed: f64,
    max_ball_starting_angle_radians: f64,
}

/// Stable indices into [`Arena::actors`], assigned at construction.
pub const NET_IDX: usize = 0;
pub const LEFT_BACK_LINE_IDX: usize = 1;
pub const RIGHT_BACK_LINE_IDX: usize = 2;
pub const PRIMARY_BALL_IDX: usize = 3;
pub const LEFT_PADDLE_IDX: usize = 4;
pub const RIGHT_PADDLE_IDX: usize = 5;
pub const TOP_WALL_IDX: usize = 6;
pub const BOTTOM_WALL_IDX: usize = 7;

impl Arena {
    pub fn new(config: &Config) -> Arena {
        let arena_width = config.game_arena.arena_width as f64;
        let arena_height = config.game_arena.arena_height as f64;
        let wall_thickness = config.game_arena.wall_thickness as f64;
        let paddle_offset = config.game_arena.paddle_offset as f64;
        let paddle_width = config.game_arena.paddle_width as f64;
        let paddle_height = config.game_arena.paddle_height as f64;
        let ball_radius = config.game_arena.white_ball_radius as f64;

        let top_wall = actors::make_wall("top_wall", Polygon::rect(0.0, 0.0, arena_width, wall_thickness));
        let bottom_wall = actors::make_wall(
            "bottom_wall",
            Polygon::rect(0.0, arena_height - wall_thickness, arena_width, arena_height),
        );
        let net = actors::make_net(
            "net",
            Polygon::rect(arena_width / 2.0, 0.0, arena_width / 2.0 + 1.0, arena_height),
        );
        let left_back_line_x = paddle_offset + paddle_width / 2.0;
        let right_back_line_x = arena_width - paddle_offset - paddle_width / 2.0;
        let left_back_line = actors::make_back_line(
            "left back line",
            Polygon::rect(left_back_line_x, 0.0, left_back_line_x + 1.0, arena_height),
        );
        let right_back_line = actors::make_back_line(
            "right back line",
            Polygon::rect(right_back_line_x, 0.0, right_back_line_x + 1.0, arena_height),
        );

        let paddle_speed_bound = SpeedBound::new(config.min_paddle_speed(), config.max_paddle_speed());
        let left_paddle = actors::make_paddle(
            "left_paddle",
            Polygon::rect(
                paddle_offset,
                arena_height / 2.0 - paddle_height / 2.0,
                paddle_offset + paddle_width,
                arena_height / 2.0 + paddle_height / 2.0,
            ),
            Side::Left,
            paddle_speed_bound,
        );
        let right_paddle = actors::make_paddle(
            "right_paddle",
            Polygon::rect(
                arena_width - paddle_offset - paddle_width,
                arena_height / 2.0 - paddle_height / 2.0,
                arena_width - paddle_offset,
                arena_height / 2.0 + paddle_height / 2.0,
            ),
            Side::Right,
            paddle_speed_bound,
        );

        let ball_speed_bound = SpeedBound::new(config.min_ball_speed(), config.max_ball_speed());
        let primary_ball = actors::make_ball(
            "primary_ball",
            Polygon::circle(arena_width / 2.0, arena_height / 2.0, ball_radius, 24),
            BallFlavor::Primary,
            ball_speed_bound,
        );

        let actors = vec![
            net,
            left_back_line,
            right_back_line,
            primary_ball,
            left_paddle,
            right_paddle,
            top_wall,
            bottom_wall,
        ];

        let mut arena = Arena {
            actors,
            arena_width,
            arena_height,
            left_back_line_x,
            right_back_line_x,
            starting_ball_speed: config.game_arena.starting_ball_speed,
            max_ball_starting_angle_radians: config.max_ball_starting_angle_radians(),
        };
        arena.reset_starting_positions(&mut rand::thread_rng());
        arena
    }

    /// Translates paddles back to vertical center (x untouched) with zero
    /// velocity, and balls back to arena center with a freshly randomized
    /// velocity (spec §4.7).
    pub fn reset_starting_positions(&mut self, rng: &mut impl Rng) {
        let arena_center = Vector::new(self.arena_width / 2.0, self.arena_height / 2.0);

        for actor in self.actors.iter_mut() {
            if let Actor::Paddle { body, .. } = actor {
                let offset_to_center_y = body.centroid().y - arena_center.y;
                body.translate_by(0.0, -offset_to_center_y);
                body.set_velocity_raw(Vector::ZERO);
            }
        }

        for actor in self.actors.iter_mut() {
            if let Actor::Ball { body, .. } = actor {
                let offset_to_center = body.centroid().sub(arena_center);
                body.translate_by(-offset_to_center.x, -offset_to_center.y);

                let random_angle = rng.gen_range(0.0..=self.max_ball_starting_angle_radians.abs());
                let sign_x = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let sign_y = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let vx = self.starting_ball_speed * random_angle.cos() * sign_x;
                let vy = self.starting_ball_speed * random_angle.sin() * sign_y;
                body.set_velocity_raw(Vector::new(vx, vy));
            }
        }
    }

    pub fn primary_ball(&self) -> &crate::actors::Body {
        self.actors[PRIMARY_BALL_IDX].body()
    }

    pub fn paddle(&self, side: Side) -> &crate::actors::Body {
        match side {
            Side::Left => self.actors[LEFT_PADDLE_IDX].body(),
            Side::Right => self.actors[RIGHT_PADDLE_IDX].body(),
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut crate::actors::Body {
        match side {
            Side::Left => self.actors[LEFT_PADDLE_IDX].body_mut(),
            Side::Right => self.actors[RIGHT_PADDLE_IDX].body_mut(),
        }
    }
}
