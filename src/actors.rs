//! Typed arena entities, built around a shared [`Body`] (shape + velocity
//! + speed bounds) and a tagged [`Actor`] enum the collision engine
//! pattern-matches on. See the design notes for why this is a tagged
//! variant instead of the trait-object hierarchy the original Python
//! source used (`gameengine/gameactors.py`).

use crate::geometry::{self, Polygon, Vector};
use serde::{Deserialize, Serialize};

/// Either side of the net, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Ball flavor. Only `Primary` is reflected by paddles today; the others
/// are reserved for future power-ups per spec §4.3.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallFlavor {
    Primary,
    GrowPaddle,
    ShrinkPaddle,
}

/// Inclusive `(min, max)` speed bound in pixels/tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBound {
    pub min: f64,
    pub max: f64,
}

impl SpeedBound {
    pub fn new(min: f64, max: f64) -> Self {
        SpeedBound { min, max }
    }
}

/// Common state shared by every actor: a shape template translated by an
/// accumulated offset, a velocity, speed bounds, and the two collision
/// flags. Stationary actors are represented by `movable = false`, which
/// makes `set_velocity`/`move_forward`/`move_backward` no-ops per spec §3.
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    shape_template: Polygon,
    offset: Vector,
    velocity: Vector,
    pub speed_bound: SpeedBound,
    pub collision_enabled: bool,
    pub rebound_enabled: bool,
    movable: bool,
}

impl Body {
    pub fn stationary(
        name: impl Into<String>,
        shape: Polygon,
        collision_enabled: bool,
        rebound_enabled: bool,
    ) -> Self {
        Body {
            name: name.into(),
            shape_template: shape,
            offset: Vector::ZERO,
            velocity: Vector::ZERO,
            speed_bound: SpeedBound::new(0.0, 0.0),
            collision_enabled,
            rebound_enabled,
            movable: false,
        }
    }

    pub fn movable(
        name: impl Into<String>,
        shape: Polygon,
        speed_bound: SpeedBound,
        collision_enabled: bool,
        rebound_enabled: bool,
    ) -> Self {
        Body {
            name: name.into(),
            shape_template: shape,
            offset: Vector::ZERO,
            velocity: Vector::ZERO,
            speed_bound,
            collision_enabled,
            rebound_enabled,
            movable: true,
        }
    }

    pub fn shape(&self) -> Polygon {
        geometry::translate(&self.shape_template, self.offset.x, self.offset.y)
    }

    pub fn centroid(&self) -> Vector {
        geometry::centroid(&self.shape_template).add(self.offset)
    }

    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Applies the throttling invariant from spec §3: zero stays zero; a
    /// sub-minimum nonzero speed is scaled up to the minimum; an
    /// over-maximum speed is scaled down to the maximum. Stationary
    /// actors silently reject the write.
    pub fn set_velocity(&mut self, v: Vector) {
        if !self.movable {
            return;
        }
        let speed = v.norm();
        if speed <= 0.0 {
            self.velocity = Vector::ZERO;
            return;
        }
        let throttled = if speed < self.speed_bound.min {
            self.speed_bound.min
        } else if speed > self.speed_bound.max {
            self.speed_bound.max
        } else {
            speed
        };
        self.velocity = v.scale(throttled / speed);
    }

    /// Directly sets velocity without throttling. Used internally by
    /// resolvers that have already computed a throttled result, and by
    /// arena reset (which computes its own bounded starting speed).
    pub fn set_velocity_raw(&mut self, v: Vector) {
        if self.movable {
            self.velocity = v;
        }
    }

    pub fn move_forward(&mut self, r: f64) {
        if !self.movable {
            return;
        }
        self.offset = self.offset.add(self.velocity.scale(r));
    }

    pub fn move_backward(&mut self, r: f64) {
        if !self.movable {
            return;
        }
        self.offset = self.offset.sub(self.velocity.scale(r));
    }

    /// Translates by an absolute offset, independent of velocity. Used by
    /// arena reset to recenter actors.
    pub fn translate_by(&mut self, dx: f64, dy: f64) {
        if !self.movable {
            return;
        }
        self.offset = self.offset.add(Vector::new(dx, dy));
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    /// Raw accumulated translation since construction. Collision
    /// resolvers snapshot this before a tick's sub-stepping begins so
    /// that a backout which hits the hard iteration cap can fall back to
    /// "last known safe position" per spec §7/§9.
    pub fn offset(&self) -> Vector {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vector) {
        if self.movable {
            self.offset = offset;
        }
    }
}

/// A tagged actor variant. The collision engine pattern-matches on
/// `(Actor, Actor)` pairs to select a resolver (spec §9's 4-entry
/// dispatch table), rather than using runtime type tests as the original
/// source does.
#[derive(Debug, Clone)]
pub enum Actor {
    Wall(Body),
    Net(Body),
    BackLine(Body),
    Paddle { body: Body, side: Side },
    Ball { body: Body, flavor: BallFlavor },
}

impl Actor {
    pub fn body(&self) -> &Body {
        match self {
            Actor::Wall(b) | Actor::Net(b) | Actor::BackLine(b) => b,
            Actor::Paddle { body, .. } => body,
            Actor::Ball { body, .. } => body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Body {
        match self {
            Actor::Wall(b) | Actor::Net(b) | Actor::BackLine(b) => b,
            Actor::Paddle { body, .. } => body,
            Actor::Ball { body, .. } => body,
        }
    }

    pub fn name(&self) -> &str {
        &self.body().name
    }

    pub fn is_ball(&self) -> bool {
        matches!(self, Actor::Ball { .. })
    }

    pub fn is_paddle(&self) -> bool {
        matches!(self, Actor::Paddle { .. })
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, Actor::Wall(_))
    }
}

pub fn make_wall(name: impl Into<String>, shape: Polygon) -> Actor {
    Actor::Wall(Body::stationary(name, shape, true, false))
}

pub fn make_net(name: impl Into<String>, shape: Polygon) -> Actor {
    Actor::Net(Body::stationary(name, shape, false, false))
}

pub fn make_back_line(name: impl Into<String>, shape: Polygon) -> Actor {
    Actor::BackLine(Body::stationary(name, shape, false, false))
}

pub fn make_paddle(name: impl Into<String>, shape: Polygon, side: Side, bound: SpeedBound) -> Actor {
    Actor::Paddle {
        body: Body::movable(name, shape, bound, true, false),
        side,
    }
}

pub fn make_ball(name: impl Into<String>, shape: Polygon, flavor: BallFlavor, bound: SpeedBound) -> Actor {
    Actor::Ball {
        body: Body::movable(name, shape, bound, true, true),
        flavor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;

    #[test]
    fn stationary_actor_rejects_velocity_and_translation() {
        let mut wall = make_wall("top_wall", Polygon::rect(0.0, 0.0, 100.0, 10.0));
        wall.body_mut().set_velocity(Vector::new(5.0, 0.0));
        assert_eq!(wall.body().velocity(), Vector::ZERO);
        let before = wall.body().centroid();
        wall.body_mut().move_forward(1.0);
        assert_eq!(wall.body().centroid(), before);
    }

    #[test]
    fn velocity_below_min_is_scaled_up() {
        let mut ball = make_ball(
            "b",
            Polygon::circle(0.0, 0.0, 5.0, 12),
            BallFlavor::Primary,
            SpeedBound::new(2.0, 10.0),
        );
        ball.body_mut().set_velocity(Vector::new(1.0, 0.0));
        assert!((ball.body().speed() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn velocity_above_max_is_scaled_down() {
        let mut ball = make_ball(
            "b",
            Polygon::circle(0.0, 0.0, 5.0, 12),
            BallFlavor::Primary,
            SpeedBound::new(2.0, 10.0),
        );
        ball.body_mut().set_velocity(Vector::new(20.0, 0.0));
        assert!((ball.body().speed() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_velocity_stays_zero() {
        let mut ball = make_ball(
            "b",
            Polygon::circle(0.0, 0.0, 5.0, 12),
            BallFlavor::Primary,
            SpeedBound::new(2.0, 10.0),
        );
        ball.body_mut().set_velocity(Vector::ZERO);
        assert_eq!(ball.body().velocity(), Vector::ZERO);
    }

    #[test]
    fn move_forward_translates_by_velocity() {
        let mut paddle = make_paddle(
            "left",
            Polygon::rect(0.0, 0.0, 10.0, 100.0),
            Side::Left,
            SpeedBound::new(1.0, 8.0),
        );
        paddle.body_mut().set_velocity_raw(Vector::new(0.0, 4.0));
        let before = paddle.body().centroid();
        paddle.body_mut().move_forward(1.0);
        let after = paddle.body().centroid();
        assert!((after.y - before.y - 4.0).abs() < 1e-9);
    }
}
