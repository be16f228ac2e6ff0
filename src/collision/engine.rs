//! Broad-phase candidate filter and sub-tick stepping (spec §4.4), built
//! almost one-to-one from `original`'s `gameengine/collision_engine.py`
//! (`calculate_potential_collision`, `DefaultGameCollisionEngine`).
//!
//! Two variants share the same dispatch table: [`step_accurate`] sizes the
//! sub-tick count to the faster of each candidate pair, [`step_fast`] does
//! a single resolver pass per candidate then a full-velocity advance.
//! Behavior is identical between the two when every actor's speed is
//! `<= 1` (spec §4.4).

use crate::actors::{Actor, BallFlavor};
use crate::geometry::{self, Vector};

use super::resolvers;

/// Which collision-resolution strategy a tick uses. Selected by
/// `[game_engine] collision_mode` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionMode {
    Accurate,
    Fast,
}

/// A candidate pair of actor indices whose inflated bounding boxes
/// overlap and that are both collision-enabled.
fn candidate_pairs(actors: &[Actor]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..actors.len() {
        for j in (i + 1)..actors.len() {
            let a = actors[i].body();
            let b = actors[j].body();
            if !a.collision_enabled || !b.collision_enabled {
                continue;
            }
            if a.speed() <= 0.0 && b.speed() <= 0.0 {
                continue;
            }
            let bbox_a = geometry::bbox(&a.shape()).inflate(a.speed());
            let bbox_b = geometry::bbox(&b.shape()).inflate(b.speed());
            if bbox_a.intersects(bbox_b) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Dispatches a single resolver call for the pair at `(i, j)`, honoring
/// the spec's order-insensitive 4-entry table. Paddle-before-wall is
/// guaranteed by the caller's candidate-list construction order (§9 open
/// question 3, DESIGN.md), not by logic here.
fn dispatch_pair(actors: &mut [Actor], i: usize, j: usize, pre_tick: &[Vector], max_paddle_angle_radians: f64) {
    // Split the slice so both actors can be borrowed mutably at once.
    let (a, pre_a, b, pre_b) = if i < j {
        let (left, right) = actors.split_at_mut(j);
        (&mut left[i], pre_tick[i], &mut right[0], pre_tick[j])
    } else {
        let (left, right) = actors.split_at_mut(i);
        (&mut right[0], pre_tick[i], &mut left[j], pre_tick[j])
    };

    match (a, b) {
        (Actor::Ball { body: b1, flavor: f1 }, Actor::Ball { body: b2, flavor: f2 }) => {
            let reboundable1 = *f1 == BallFlavor::Primary && b1.rebound_enabled;
            let reboundable2 = *f2 == BallFlavor::Primary && b2.rebound_enabled;
            resolvers::ball_ball(b1, reboundable1, b2, reboundable2, pre_a, pre_b);
        }
        (Actor::Ball { body: ball, flavor }, Actor::Paddle { body: paddle, .. }) => {
            resolvers::ball_paddle(ball, *flavor, paddle, pre_a, max_paddle_angle_radians);
        }
        (Actor::Paddle { body: paddle, .. }, Actor::Ball { body: ball, flavor }) => {
            resolvers::ball_paddle(ball, *flavor, paddle, pre_b, max_paddle_angle_radians);
        }
        (Actor::Ball { body: ball, .. }, Actor::Wall(wall)) => {
            resolvers::ball_wall(ball, wall, pre_a);
        }
        (Actor::Wall(wall), Actor::Ball { body: ball, .. }) => {
            resolvers::ball_wall(ball, wall, pre_b);
        }
        (Actor::Paddle { body: paddle, .. }, Actor::Wall(wall)) => {
            resolvers::paddle_wall(paddle, wall, pre_a);
        }
        (Actor::Wall(wall), Actor::Paddle { body: paddle, .. }) => {
            resolvers::paddle_wall(paddle, wall, pre_b);
        }
        _ => {}
    }
}

fn snapshot_offsets(actors: &[Actor]) -> Vec<Vector> {
    actors.iter().map(|a| a.body().offset()).collect()
}

fn advance_all(actors: &mut [Actor], fraction: f64) {
    for actor in actors.iter_mut() {
        actor.body_mut().move_forward(fraction);
    }
}

/// Accurate variant: candidates get `S = max(ceil(max(|vp|, |vq|)), 1)`
/// sub-steps, each followed by a `1/S` advance of every actor. Actors not
/// part of any candidate pair still only advance once per tick overall —
/// they are folded into the final full-velocity pass below.
pub fn step_accurate(actors: &mut [Actor], max_paddle_angle_radians: f64) {
    let pairs = candidate_pairs(actors);
    if pairs.is_empty() {
        advance_all(actors, 1.0);
        return;
    }

    // Actors involved in at least one candidate pair are sub-stepped;
    // everyone else advances once at the end, matching the spec's
    // "non-candidate actors advance once by full velocity" (§4.4 step 4).
    let mut involved = vec![false; actors.len()];
    for &(i, j) in &pairs {
        involved[i] = true;
        involved[j] = true;
    }

    let sub_steps: usize = pairs
        .iter()
        .map(|&(i, j)| {
            let vp = actors[i].body().speed();
            let vq = actors[j].body().speed();
            (vp.max(vq).ceil() as usize).max(1)
        })
        .max()
        .unwrap_or(1);

    let pre_tick = snapshot_offsets(actors);
    let fraction = 1.0 / sub_steps as f64;
    for _ in 0..sub_steps {
        for &(i, j) in &pairs {
            dispatch_pair(actors, i, j, &pre_tick, max_paddle_angle_radians);
        }
        for (idx, actor) in actors.iter_mut().enumerate() {
            if involved[idx] {
                actor.body_mut().move_forward(fraction);
            }
        }
    }

    for (idx, actor) in actors.iter_mut().enumerate() {
        if !involved[idx] {
            actor.body_mut().move_forward(1.0);
        }
    }
}

/// Fast variant: one resolver call per candidate pair, then a single
/// full-velocity advance for every actor.
pub fn step_fast(actors: &mut [Actor], max_paddle_angle_radians: f64) {
    let pairs = candidate_pairs(actors);
    let pre_tick = snapshot_offsets(actors);
    for &(i, j) in &pairs {
        dispatch_pair(actors, i, j, &pre_tick, max_paddle_angle_radians);
    }
    advance_all(actors, 1.0);
}

/// Dispatches to [`step_accurate`] or [`step_fast`] per `mode`.
pub fn step(actors: &mut [Actor], mode: CollisionMode, max_paddle_angle_radians: f64) {
    match mode {
        CollisionMode::Accurate => step_accurate(actors, max_paddle_angle_radians),
        CollisionMode::Fast => step_fast(actors, max_paddle_angle_radians),
    }
}
