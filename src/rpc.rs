//! `GameMaster` tonic service implementation (C8), wrapping the match
//! loop's channels. Grounded in `original`'s `gameserver/pong_servicer.py`
//! (`DummyPongServicer`/real servicer call shapes) and `pong_server.py`
//! (thread-pool sizing, insecure port).

use std::pin::Pin;

use tokio::sync::oneshot;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};

use crate::actors::Side;
use crate::match_loop::{MatchHandle, RegisterRequest};
use crate::proto::game_master_server::GameMaster;
use crate::proto::{self, PaddleAction, PlayerIdentifier};
use crate::scoring::PlayerId;

pub struct GameMasterService {
    register_tx: tokio::sync::mpsc::Sender<RegisterRequest>,
    left_action_tx: tokio::sync::mpsc::Sender<PaddleAction>,
    right_action_tx: tokio::sync::mpsc::Sender<PaddleAction>,
    state_rx: tokio::sync::watch::Receiver<proto::GameState>,
}

impl GameMasterService {
    pub fn new(handle: &MatchHandle) -> Self {
        GameMasterService {
            register_tx: handle.register_tx.clone(),
            left_action_tx: handle.left_action_tx.clone(),
            right_action_tx: handle.right_action_tx.clone(),
            state_rx: handle.state_rx.clone(),
        }
    }
}

fn side_of(identifier: &PlayerIdentifier) -> Result<Side, Status> {
    match identifier.paddle_type() {
        proto::PaddleType::Left => Ok(Side::Left),
        proto::PaddleType::Right => Ok(Side::Right),
        proto::PaddleType::NotSet => Err(Status::invalid_argument("paddle_type must be LEFT or RIGHT")),
    }
}

#[tonic::async_trait]
impl GameMaster for GameMasterService {
    async fn register_player(&self, request: Request<PlayerIdentifier>) -> Result<Response<()>, Status> {
        let identifier = request.into_inner();
        let side = side_of(&identifier)?;
        let player = PlayerId {
            name: identifier.player_name.clone(),
            strategy_name: identifier.paddle_strategy_name.clone(),
            side,
        };

        tracing::info!(player = %player.name, strategy = %player.strategy_name, side = ?side, "registering player");

        let (reply_tx, reply_rx) = oneshot::channel();
        self.register_tx
            .send(RegisterRequest { player, reply: reply_tx })
            .await
            .map_err(|_| Status::unavailable("match loop is not accepting registrations"))?;

        reply_rx
            .await
            .map_err(|_| Status::unavailable("match loop dropped the registration reply"))?
            .map_err(Status::from)?;

        Ok(Response::new(()))
    }

    type StreamGameStateStream = Pin<Box<dyn Stream<Item = Result<proto::GameState, Status>> + Send + 'static>>;

    async fn stream_game_state(
        &self,
        request: Request<PlayerIdentifier>,
    ) -> Result<Response<Self::StreamGameStateStream>, Status> {
        let identifier = request.into_inner();
        tracing::debug!(player = %identifier.player_name, "opening game state stream");

        let mut state_rx = self.state_rx.clone();
        let (tx, rx) = tokio::sync::mpsc::channel(4);

        tokio::spawn(async move {
            // Always deliver whatever state is current at subscribe time
            // before waiting for the next change (watch's stale-drop
            // semantics still guarantee "most recent always deliverable").
            let mut current = state_rx.borrow_and_update().clone();
            loop {
                let terminal = current.winning_player.is_some();
                if tx.send(Ok(current.clone())).await.is_err() || terminal {
                    break;
                }
                if state_rx.changed().await.is_err() {
                    break;
                }
                current = state_rx.borrow_and_update().clone();
            }
        });

        let stream = ReceiverStream::new(rx);
        Ok(Response::new(Box::pin(stream) as Self::StreamGameStateStream))
    }

    async fn submit_paddle_actions(
        &self,
        request: Request<Streaming<PaddleAction>>,
    ) -> Result<Response<()>, Status> {
        let mut stream = request.into_inner();
        while let Some(action) = stream.next().await {
            let action = action?;
            let Some(identifier) = action.player_identifier.as_ref() else {
                continue;
            };
            let side = match side_of(identifier) {
                Ok(side) => side,
                Err(_) => continue,
            };
            let sender = match side {
                Side::Left => &self.left_action_tx,
                Side::Right => &self.right_action_tx,
            };
            if sender.send(action).await.is_err() {
                break;
            }
        }
        Ok(Response::new(()))
    }
}
