//! The four pure collision resolvers dispatched by [`super::engine`], plus
//! the shared overlap-backout helper they all build on (spec §4.3).
//!
//! Each resolver is idempotent when the two shapes do not intersect, and
//! performs overlap removal + velocity update when they do. None of them
//! panic: an overlap that cannot be resolved within the iteration cap
//! falls back to the actor's pre-tick position (spec §7, §9).

use crate::actors::{BallFlavor, Body};
use crate::geometry::{self, Vector};

/// Hard cap on backout iterations, per spec §9 ("Floating point in
/// collision backout... The spec requires a hard cap, e.g. 1000
/// iterations, and a fallback that snaps the moving actor to its
/// pre-tick position").
const MAX_BACKOUT_ITERATIONS: usize = 1000;

/// Backs `body` out of `other` one sub-pixel step at a time, along
/// `body`'s velocity direction (`forward = true`) or its negative
/// (`forward = false`), until the shapes no longer intersect or the
/// iteration cap is hit. On cap-out, snaps `body` back to `pre_tick`.
fn back_out(body: &mut Body, other: &geometry::Polygon, pre_tick: Vector, forward: bool) {
    let speed = body.speed();
    if speed <= 0.0 {
        return;
    }
    let step = 1.0 / speed;
    let mut iterations = 0;
    while geometry::intersects(&body.shape(), other) && iterations < MAX_BACKOUT_ITERATIONS {
        if forward {
            body.move_forward(step);
        } else {
            body.move_backward(step);
        }
        iterations += 1;
    }
    if geometry::intersects(&body.shape(), other) {
        tracing::warn!(actor = %body.name, "overlap unresolved after backout cap, snapping to pre-tick position");
        body.set_offset(pre_tick);
    }
}

/// Ball <-> ball elastic collision (spec §4.3.2). Mass is taken
/// proportional to polygon area.
pub fn ball_ball(
    ball1: &mut Body,
    reboundable1: bool,
    ball2: &mut Body,
    reboundable2: bool,
    pre_tick1: Vector,
    pre_tick2: Vector,
) {
    if !geometry::intersects(&ball1.shape(), &ball2.shape()) {
        return;
    }

    let mut iterations = 0;
    while geometry::intersects(&ball1.shape(), &ball2.shape()) && iterations < MAX_BACKOUT_ITERATIONS {
        let s1 = ball1.speed();
        let s2 = ball2.speed();
        if s1 <= 0.0 && s2 <= 0.0 {
            break;
        }
        if s1 > 0.0 {
            ball1.move_backward(1.0 / s1);
        }
        if s2 > 0.0 {
            ball2.move_backward(1.0 / s2);
        }
        iterations += 1;
    }
    if geometry::intersects(&ball1.shape(), &ball2.shape()) {
        tracing::warn!("ball-ball overlap unresolved after backout cap, snapping both to pre-tick position");
        ball1.set_offset(pre_tick1);
        ball2.set_offset(pre_tick2);
    }

    // "Both balls must be reboundable; otherwise no velocity change
    // (still back them out)."
    if !(reboundable1 && reboundable2) {
        return;
    }

    let m1 = geometry::area(&ball1.shape());
    let m2 = geometry::area(&ball2.shape());
    let total_mass = m1 + m2;
    if total_mass <= 0.0 {
        return;
    }

    let v1 = ball1.velocity();
    let v2 = ball2.velocity();
    let dv12 = v1.sub(v2);
    let dx12 = ball1.centroid().sub(ball2.centroid());
    let dx12_norm_sq = dx12.dot(dx12);
    if dx12_norm_sq <= 1e-12 {
        // Degenerate (coincident centroids): nothing sensible to bounce
        // off of, leave velocities as-is.
        return;
    }
    let dv21 = dv12.neg();
    let dx21 = dx12.neg();

    let rebound_v1 = v1.sub(dx12.scale(2.0 * m2 / total_mass * dv12.dot(dx12) / dx12_norm_sq));
    let rebound_v2 = v2.sub(dx21.scale(2.0 * m1 / total_mass * dv21.dot(dx21) / dx12_norm_sq));

    ball1.set_velocity(rebound_v1);
    ball2.set_velocity(rebound_v2);
}

/// Ball <-> paddle angle-of-impact reflection (spec §4.3.3). Only
/// `PRIMARY` balls are affected; other flavors pass through untouched.
pub fn ball_paddle(
    ball: &mut Body,
    flavor: BallFlavor,
    paddle: &Body,
    pre_tick_ball: Vector,
    max_angle_radians: f64,
) {
    if flavor != BallFlavor::Primary {
        return;
    }
    if !geometry::intersects(&ball.shape(), &paddle.shape()) {
        return;
    }

    back_out(ball, &paddle.shape(), pre_tick_ball, false);

    let paddle_shape = paddle.shape();
    let (_, hit) = geometry::nearest_points(&ball.shape(), &paddle_shape);
    let paddle_bbox = geometry::bbox(&paddle_shape);
    let half = (paddle_bbox.ymax - paddle_bbox.ymin) / 2.0;
    if half <= 0.0 {
        return;
    }
    let mid_y = geometry::centroid(&paddle_shape).y;

    let d = (hit.y - mid_y).abs();
    let d_norm = (d / half).clamp(0.0, 1.0);
    let theta = max_angle_radians * d_norm;

    let speed = ball.speed();
    let incoming_vx = ball.velocity().x;

    let vx_mag = speed * theta.cos();
    let vy_mag = speed * theta.sin();

    // Ball moving left rebounds right, and vice versa.
    let vx = if incoming_vx < 0.0 { vx_mag } else { -vx_mag };
    // Upper half of the paddle (hy < mid_y) rebounds upward (canvas -y);
    // `hy == mid_y` defaults to downward per spec §4.3.3 step 7.
    let vy = if hit.y < mid_y { -vy_mag } else { vy_mag };

    ball.set_velocity(Vector::new(vx, vy));
}

/// Ball <-> wall/barrier polygon-edge reflection (spec §4.3.4). Only
/// applies to barriers that are `collision_enabled` and not
/// `rebound_enabled` -- i.e. walls, not nets or back lines (those are
/// already filtered out upstream by having `collision_enabled = false`).
pub fn ball_wall(ball: &mut Body, wall: &Body, pre_tick_ball: Vector) {
    if !geometry::intersects(&ball.shape(), &wall.shape()) {
        return;
    }

    back_out(ball, &wall.shape(), pre_tick_ball, false);

    let wall_shape = wall.shape();
    let ball_centroid = ball.centroid();
    let closest = geometry::exterior_edges(&wall_shape)
        .into_iter()
        .min_by(|a, b| {
            a.distance_to_point(ball_centroid)
                .partial_cmp(&b.distance_to_point(ball_centroid))
                .unwrap()
        });
    let Some(closest) = closest else { return };

    // Transform into a right-handed euclidean basis (flip y) to compute
    // the segment's horizontal angle and normal, then transform the
    // rebound back into canvas coordinates.
    let v = ball.velocity();
    let v_std = Vector::new(v.x, -v.y);
    let a_std = Vector::new(closest.a.x, -closest.a.y);
    let b_std = Vector::new(closest.b.x, -closest.b.y);
    let (p0, p1) = if a_std.x <= b_std.x { (a_std, b_std) } else { (b_std, a_std) };

    let seg_len = closest.length();
    if seg_len <= 0.0 {
        return;
    }
    let delta_x = p1.x - p0.x;
    let mut phi = (delta_x / seg_len).clamp(-1.0, 1.0).acos();
    if p1.y < p0.y {
        phi = -phi;
    }
    let normal = Vector::new(-phi.sin(), phi.cos());

    let rebound_std = v_std.sub(normal.scale(2.0 * v_std.dot(normal)));
    let rebound_canvas = Vector::new(rebound_std.x, -rebound_std.y);

    ball.set_velocity(rebound_canvas);
}

/// Paddle <-> wall: back the paddle out, then zero its velocity so a
/// fresh directive is required to move again (spec §4.3.5).
pub fn paddle_wall(paddle: &mut Body, wall: &Body, pre_tick_paddle: Vector) {
    if !geometry::intersects(&paddle.shape(), &wall.shape()) {
        return;
    }

    let wall_centroid = wall.centroid();
    let paddle_centroid = paddle.centroid();
    let away_from_wall = paddle_centroid.sub(wall_centroid);
    let points_away = paddle.velocity().dot(away_from_wall) > 0.0;

    // Default: back out along -velocity. If the paddle's velocity does
    // not point away from the wall (it's being commanded into it), back
    // out forward instead (spec §4.3.1).
    back_out(paddle, &wall.shape(), pre_tick_paddle, !points_away);

    paddle.set_velocity_raw(Vector::ZERO);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::SpeedBound;
    use crate::geometry::Polygon;

    fn ball_body(cx: f64, cy: f64, vx: f64, vy: f64) -> Body {
        let mut b = Body::movable(
            "ball",
            Polygon::circle(cx, cy, 10.0, 16),
            SpeedBound::new(1.0, 10.0),
            true,
            true,
        );
        b.set_velocity(Vector::new(vx, vy));
        b
    }

    fn paddle_body(cx: f64, cy: f64) -> Body {
        Body::movable(
            "paddle",
            Polygon::rect(cx - 5.0, cy - 50.0, cx + 5.0, cy + 50.0),
            SpeedBound::new(1.0, 8.0),
            true,
            false,
        )
    }

    fn wall_body() -> Body {
        Body::stationary("top_wall", Polygon::rect(0.0, 0.0, 800.0, 10.0), true, false)
    }

    #[test]
    fn ball_paddle_midline_hit_reverses_x_exactly() {
        // Ball moving left, touching the paddle face dead center.
        let mut ball = ball_body(15.0, 300.0, -10.0, 0.0);
        let paddle = paddle_body(10.0, 300.0);
        ball_paddle(&mut ball, BallFlavor::Primary, &paddle, ball.offset(), 60f64.to_radians());
        let v = ball.velocity();
        assert!((v.x - 10.0).abs() < 1e-6, "vx = {}", v.x);
        assert!(v.y.abs() < 1e-6, "vy = {}", v.y);
        assert!((ball.speed() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn ball_paddle_top_edge_hit_rebounds_upward() {
        // Ball hitting the very top edge of a paddle centered at y=300,
        // half-height 50 -> d_norm = 1 -> angle = max_angle.
        let mut ball = ball_body(15.0, 250.0, -10.0, 0.0);
        let paddle = paddle_body(10.0, 300.0);
        let max_angle = 60f64.to_radians();
        ball_paddle(&mut ball, BallFlavor::Primary, &paddle, ball.offset(), max_angle);
        let v = ball.velocity();
        assert!((v.x - 10.0 * max_angle.cos()).abs() < 1e-6);
        assert!((v.y - (-10.0 * max_angle.sin())).abs() < 1e-6);
    }

    #[test]
    fn ball_paddle_non_primary_passes_through() {
        let mut ball = ball_body(15.0, 300.0, -10.0, 0.0);
        let paddle = paddle_body(10.0, 300.0);
        ball_paddle(&mut ball, BallFlavor::GrowPaddle, &paddle, ball.offset(), 60f64.to_radians());
        let v = ball.velocity();
        assert_eq!(v, Vector::new(-10.0, 0.0));
    }

    #[test]
    fn ball_wall_top_wall_flips_vertical_component() {
        let mut ball = ball_body(100.0, 15.0, 3.0, -10.0);
        let wall = wall_body();
        ball_wall(&mut ball, &wall, ball.offset());
        let v = ball.velocity();
        assert!((ball.speed() - (3.0f64 * 3.0 + 10.0 * 10.0).sqrt()).abs() < 1e-6);
        assert!(v.y > 0.0, "expected ball to rebound downward, got {:?}", v);
    }

    #[test]
    fn paddle_wall_zeroes_velocity_after_stop() {
        let mut paddle = paddle_body(30.0, 50.0);
        paddle.set_velocity_raw(Vector::new(0.0, -5.0));
        let wall = wall_body();
        let pre = paddle.offset();
        paddle_wall(&mut paddle, &wall, pre);
        assert_eq!(paddle.velocity(), Vector::ZERO);
        assert!(!geometry::intersects(&paddle.shape(), &wall.shape()));
    }

    #[test]
    fn ball_ball_equal_mass_head_on_swaps_velocities() {
        let mut a = ball_body(95.0, 100.0, 5.0, 0.0);
        let mut b = ball_body(105.0, 100.0, -5.0, 0.0);
        let pre_a = a.offset();
        let pre_b = b.offset();
        ball_ball(&mut a, true, &mut b, true, pre_a, pre_b);
        assert!((a.velocity().x - (-5.0)).abs() < 1e-6);
        assert!((b.velocity().x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn resolvers_are_idempotent_when_shapes_disjoint() {
        let mut ball = ball_body(500.0, 500.0, 1.0, 1.0);
        let paddle = paddle_body(10.0, 300.0);
        let before = ball.velocity();
        ball_paddle(&mut ball, BallFlavor::Primary, &paddle, ball.offset(), 60f64.to_radians());
        assert_eq!(ball.velocity(), before);
    }
}
