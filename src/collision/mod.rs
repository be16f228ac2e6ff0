//! Collision resolution: pure per-pair resolvers (C3) plus the broad-phase
//! engine that dispatches candidate pairs to them each tick (C4).

mod engine;
mod resolvers;

pub use engine::{step, CollisionMode};
