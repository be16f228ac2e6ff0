//! Client controller: register, open the two RPC streams, run a paddle
//! policy against each incoming state, and submit actions (C9). Grounded
//! in `original`'s `player/controller.py`
//! (`PlayerController.start_playing`/`_process_game_state`).

pub mod policies;

use rand::thread_rng;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tonic::transport::Channel;
use tonic::Request;

use crate::proto::game_master_client::GameMasterClient;
use crate::proto::{PaddleAction, PlayerIdentifier};

use self::policies::PaddlePolicy;

/// Everything needed to start one client's registration-then-streaming
/// loop (spec §4.8).
pub struct PlayerClient {
    client: GameMasterClient<Channel>,
    identifier: PlayerIdentifier,
    policy: Box<dyn PaddlePolicy>,
}

impl PlayerClient {
    pub async fn connect(
        endpoint: String,
        identifier: PlayerIdentifier,
        policy: Box<dyn PaddlePolicy>,
    ) -> Result<Self, tonic::transport::Error> {
        let client = GameMasterClient::connect(endpoint).await?;
        Ok(PlayerClient { client, identifier, policy })
    }

    /// Registers, then drives the state-stream -> policy -> action-stream
    /// loop until the server emits a terminal state or the stream closes
    /// (spec §4.8 steps 2-5).
    pub async fn run(mut self) -> Result<(), tonic::Status> {
        self.client.register_player(Request::new(self.identifier.clone())).await?;
        tracing::info!(player = %self.identifier.player_name, "registered");

        let (action_tx, action_rx) = mpsc::channel::<PaddleAction>(8);
        let outbound = ReceiverStream::new(action_rx);
        let mut submit_handle =
            tokio::spawn({
                let mut client = self.client.clone();
                async move { client.submit_paddle_actions(Request::new(outbound)).await }
            });

        let mut state_stream = self
            .client
            .stream_game_state(Request::new(self.identifier.clone()))
            .await?
            .into_inner();

        let mut rng = thread_rng();
        while let Some(state) = state_stream.next().await {
            let state = state?;
            let terminal = state.winning_player.is_some();
            let directive = self.policy.decide(&state, self.identifier.paddle_type(), &mut rng);
            let action = PaddleAction {
                player_identifier: Some(self.identifier.clone()),
                paddle_directive: directive as i32,
            };
            if action_tx.send(action).await.is_err() || terminal {
                break;
            }
        }

        drop(action_tx);
        let _ = tokio::time::timeout(std::time::Duration::from_secs(2), &mut submit_handle).await;
        Ok(())
    }
}
