//! Tick pacing, input intake, physics step, scoring, and state emission
//! (C7), run on one dedicated thread that owns the arena exclusively
//! (spec §5). Grounded in `original`'s `gameserver/pong_servicer.py` /
//! `player/controller.py` for the registration-then-stream shape and the
//! teacher's `server_update_system`/`SendTimer` for tick-pacing structure.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::thread_rng;
use tokio::sync::{mpsc, oneshot, watch};

use crate::actors::{Actor, Side};
use crate::arena::Arena;
use crate::collision;
use crate::config::Config;
use crate::error::RegistrationError;
use crate::proto;
use crate::scoring::{PlayerId, ScoreKeeper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Waiting,
    Registering,
    Commencing,
    Playing,
    Terminated,
}

/// Sent by the RPC layer's `RegisterPlayer` handler; the loop thread owns
/// the decision of whether a side is free (spec §4.6 REGISTERING).
pub struct RegisterRequest {
    pub player: PlayerId,
    pub reply: oneshot::Sender<Result<(), RegistrationError>>,
}

const ACTION_QUEUE_DEPTH: usize = 16;
const REGISTER_QUEUE_DEPTH: usize = 4;

/// Handle returned to `main`/the RPC service: the channels needed to talk
/// to the dedicated match-loop thread.
pub struct MatchHandle {
    pub register_tx: mpsc::Sender<RegisterRequest>,
    pub left_action_tx: mpsc::Sender<proto::PaddleAction>,
    pub right_action_tx: mpsc::Sender<proto::PaddleAction>,
    pub state_rx: watch::Receiver<proto::GameState>,
    shutdown_tx: std::sync::mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl MatchHandle {
    /// Signals `TERMINATED` and waits for the loop thread to finish the
    /// tick it is currently on (spec §5 "Cancellation").
    pub fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

pub fn spawn(config: Arc<Config>) -> MatchHandle {
    let (register_tx, register_rx) = mpsc::channel(REGISTER_QUEUE_DEPTH);
    let (left_action_tx, left_action_rx) = mpsc::channel(ACTION_QUEUE_DEPTH);
    let (right_action_tx, right_action_rx) = mpsc::channel(ACTION_QUEUE_DEPTH);
    let (state_tx, state_rx) = watch::channel(proto::GameState::default());
    let (shutdown_tx, shutdown_rx) = std::sync::mpsc::channel();

    let join = thread::Builder::new()
        .name("match-loop".to_string())
        .spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .expect("failed to build match loop runtime");
            run(config, &runtime, register_rx, left_action_rx, right_action_rx, state_tx, shutdown_rx);
        })
        .expect("failed to spawn match loop thread");

    MatchHandle {
        register_tx,
        left_action_tx,
        right_action_tx,
        state_rx,
        shutdown_tx,
        join: Some(join),
    }
}

struct RegisteredPlayers {
    left: Option<PlayerId>,
    right: Option<PlayerId>,
}

impl RegisteredPlayers {
    fn both_registered(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    fn register(&mut self, player: PlayerId) -> Result<(), RegistrationError> {
        let slot = match player.side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        if slot.is_some() {
            return Err(RegistrationError::SideTaken);
        }
        if self.left.as_ref().is_some_and(|p| p == &player) || self.right.as_ref().is_some_and(|p| p == &player) {
            return Err(RegistrationError::DuplicateIdentity);
        }
        *slot = Some(player);
        Ok(())
    }
}

fn run(
    config: Arc<Config>,
    runtime: &tokio::runtime::Runtime,
    mut register_rx: mpsc::Receiver<RegisterRequest>,
    mut left_action_rx: mpsc::Receiver<proto::PaddleAction>,
    mut right_action_rx: mpsc::Receiver<proto::PaddleAction>,
    state_tx: watch::Sender<proto::GameState>,
    shutdown_rx: std::sync::mpsc::Receiver<()>,
) {
    let mut phase = MatchPhase::Waiting;
    let mut players = RegisteredPlayers { left: None, right: None };

    'registration: loop {
        if shutdown_rx.try_recv().is_ok() {
            return;
        }
        match register_rx.try_recv() {
            Ok(request) => {
                let result = players.register(request.player);
                let _ = request.reply.send(result);
                phase = if players.both_registered() {
                    MatchPhase::Commencing
                } else {
                    MatchPhase::Registering
                };
                if phase == MatchPhase::Commencing {
                    break 'registration;
                }
            }
            Err(mpsc::error::TryRecvError::Empty) => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(mpsc::error::TryRecvError::Disconnected) => return,
        }
    }

    let left_player = players.left.expect("left player registered before COMMENCING");
    let right_player = players.right.expect("right player registered before COMMENCING");

    let mut arena = Arena::new(&config);
    let mut score_keeper = ScoreKeeper::new(
        left_player.clone(),
        right_player.clone(),
        config.match_play.points_in_match,
        config.match_play.hits_for_draw,
    );

    phase = MatchPhase::Playing;
    let mut rng = thread_rng();
    let mut state_iteration: u64 = 0;
    let mut last_left_directive = proto::PaddleDirective::Stationary;
    let mut last_right_directive = proto::PaddleDirective::Stationary;
    let mut last_ball_vx_sign = arena.primary_ball().velocity().x.signum();

    let tick_duration = tick_duration(&config);
    let action_timeout = Duration::from_secs_f64(config.server_client_communication.action_queue_timeout);
    let blocking = config.server_client_communication.block_client_paddle_response;
    let paddle_speed = config.game_engine.default_paddle_speed;

    let mut winning_player: Option<proto::PlayerIdentifier> = None;

    while phase == MatchPhase::Playing {
        let tick_start = Instant::now();

        if shutdown_rx.try_recv().is_ok() {
            phase = MatchPhase::Terminated;
            break;
        }

        // A third registration attempt once play has started is rejected
        // outright rather than left to hang (spec §6 "errors if ... the
        // match has started").
        while let Ok(request) = register_rx.try_recv() {
            let _ = request.reply.send(Err(RegistrationError::MatchInProgress));
        }

        // 1. Drain inputs.
        let left_action = next_action(runtime, &mut left_action_rx, blocking, action_timeout);
        if let Some(action) = left_action {
            last_left_directive = directive_or_stationary(&action);
        }
        let right_action = next_action(runtime, &mut right_action_rx, blocking, action_timeout);
        if let Some(action) = right_action {
            last_right_directive = directive_or_stationary(&action);
        }
        apply_directive(&mut arena, Side::Left, last_left_directive, paddle_speed);
        apply_directive(&mut arena, Side::Right, last_right_directive, paddle_speed);

        // 2. Step physics.
        collision::step(&mut arena.actors, config.collision_mode(), config.max_angle_radians());

        // 3. Score update.
        let bx = arena.primary_ball().centroid().x;
        let mut winner_this_tick = false;
        if bx < arena.left_back_line_x {
            score_keeper.tally_point(Side::Right);
            winner_this_tick = true;
        } else if bx > arena.right_back_line_x {
            score_keeper.tally_point(Side::Left);
            winner_this_tick = true;
        }

        let vx = arena.primary_ball().velocity().x;
        let vx_sign = if vx == 0.0 { last_ball_vx_sign } else { vx.signum() };
        let reversed = vx_sign != 0.0 && last_ball_vx_sign != 0.0 && vx_sign != last_ball_vx_sign;
        last_ball_vx_sign = vx_sign;

        if !winner_this_tick && score_keeper.note_direction(reversed) {
            score_keeper.tally_aborted_point();
            winner_this_tick = true;
        }

        if winner_this_tick {
            if score_keeper.left.1.matches_won > 0 {
                winning_player = Some(to_proto_identifier(&left_player));
            } else if score_keeper.right.1.matches_won > 0 {
                winning_player = Some(to_proto_identifier(&right_player));
            }
            arena.reset_starting_positions(&mut rng);
            score_keeper.reset_direction_counter();
            last_ball_vx_sign = arena.primary_ball().velocity().x.signum();
        }

        // 4. Emit state.
        state_iteration += 1;
        let state = build_game_state(state_iteration, &arena, &score_keeper, winning_player.clone());
        let _ = state_tx.send(state);

        if winning_player.is_some() {
            phase = MatchPhase::Terminated;
            break;
        }

        // 5. Pace.
        let elapsed = tick_start.elapsed();
        if elapsed < tick_duration {
            thread::sleep(tick_duration - elapsed);
        }
    }
}

fn tick_duration(config: &Config) -> Duration {
    let fps = config.game_renderer.fps_cap.max(1);
    Duration::from_secs_f64(1.0 / fps as f64)
}

fn next_action(
    runtime: &tokio::runtime::Runtime,
    rx: &mut mpsc::Receiver<proto::PaddleAction>,
    blocking: bool,
    timeout: Duration,
) -> Option<proto::PaddleAction> {
    if blocking {
        runtime.block_on(async { tokio::time::timeout(timeout, rx.recv()).await.ok().flatten() })
    } else {
        rx.try_recv().ok()
    }
}

/// Reads the raw `paddle_directive` field rather than prost's generated
/// accessor: the accessor falls back to `UP` (variant 0) for any
/// unrecognized value, but spec §7 requires an unknown/malformed
/// directive to leave the paddle stationary instead.
fn directive_or_stationary(action: &proto::PaddleAction) -> proto::PaddleDirective {
    proto::PaddleDirective::try_from(action.paddle_directive).unwrap_or(proto::PaddleDirective::Stationary)
}

fn apply_directive(arena: &mut Arena, side: Side, directive: proto::PaddleDirective, paddle_speed: f64) {
    let velocity = match directive {
        proto::PaddleDirective::Up => crate::geometry::Vector::new(0.0, -paddle_speed),
        proto::PaddleDirective::Down => crate::geometry::Vector::new(0.0, paddle_speed),
        proto::PaddleDirective::Stationary => crate::geometry::Vector::ZERO,
    };
    arena.paddle_mut(side).set_velocity(velocity);
}

fn to_proto_identifier(player: &PlayerId) -> proto::PlayerIdentifier {
    proto::PlayerIdentifier {
        player_name: player.name.clone(),
        paddle_strategy_name: player.strategy_name.clone(),
        paddle_type: match player.side {
            Side::Left => proto::PaddleType::Left as i32,
            Side::Right => proto::PaddleType::Right as i32,
        },
    }
}

fn actor_type_of(actor: &Actor) -> proto::ActorType {
    match actor {
        Actor::Wall(_) => proto::ActorType::Wall,
        Actor::Net(_) => proto::ActorType::Net,
        Actor::BackLine(_) => proto::ActorType::BackLine,
        Actor::Paddle { side: Side::Left, .. } => proto::ActorType::LeftPaddle,
        Actor::Paddle { side: Side::Right, .. } => proto::ActorType::RightPaddle,
        Actor::Ball { flavor, .. } if *flavor == crate::actors::BallFlavor::Primary => proto::ActorType::PrimaryBall,
        Actor::Ball { .. } => proto::ActorType::Unknown,
    }
}

/// Mirrors the original's `GameStateBuilder` (`translators/proto_translations.py`):
/// one `Actor` message per game actor, carrying its exterior-ring coordinates
/// and current velocity.
fn build_game_state(
    state_iteration: u64,
    arena: &Arena,
    score_keeper: &ScoreKeeper,
    winning_player: Option<proto::PlayerIdentifier>,
) -> proto::GameState {
    let actors = arena
        .actors
        .iter()
        .map(|actor| {
            let body = actor.body();
            let shape = body.shape();
            let coords = shape
                .vertices
                .iter()
                .map(|v| proto::Coord { x: v.x.round() as i32, y: v.y.round() as i32 })
                .collect();
            let velocity = body.velocity();
            proto::Actor {
                actor_type: actor_type_of(actor) as i32,
                coords,
                velocity: Some(proto::Coord { x: velocity.x.round() as i32, y: velocity.y.round() as i32 }),
            }
        })
        .collect();

    proto::GameState {
        state_iteration,
        state_time: None,
        actors,
        left_scorecard: Some(to_proto_scorecard(&score_keeper.left)),
        right_scorecard: Some(to_proto_scorecard(&score_keeper.right)),
        winning_player,
    }
}

fn to_proto_scorecard((player, card): &(PlayerId, crate::scoring::ScoreCard)) -> proto::ScoreCard {
    proto::ScoreCard {
        player: Some(to_proto_identifier(player)),
        current_game_points: card.match_points,
        total_match_points: card.matches_won,
        total_points: card.total_points,
    }
}
