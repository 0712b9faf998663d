use crate::{
    websocket::{
        messages::{ClientMessage, ServerMessage},
        session::{GameSession, SessionEvent},
    },
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use uuid::Uuid;

/// WebSocket upgrade handler. Every connection is an independent game session.
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();

    tracing::info!("WebSocket connection established: session {}", session_id);

    let session = GameSession::new(
        session_id,
        Arc::new(state.config.game.clone()),
        state.word_bank.clone(),
        event_tx.clone(),
    );
    let registration = SessionRegistration::new(state.clone(), &session);

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Client input goes into the same queue as timer firings
    let tx_for_recv = tx.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if event_tx.send(client_msg.into()).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx_for_recv.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client disconnected: session {}", session_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // The only owner of the game state
    let mut game_task =
        tokio::spawn(async move { run_session(session, event_rx, tx, registration).await });

    // Wait for any task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            stop_game(&mut game_task).await;
        }
        _ = (&mut recv_task) => {
            send_task.abort();
            stop_game(&mut game_task).await;
        }
        _ = (&mut game_task) => {
            send_task.abort();
            recv_task.abort();
        }
    }

    tracing::info!("WebSocket connection closed: session {}", session_id);
}

/// Abort the game task and wait until it has dropped its registration
async fn stop_game(game_task: &mut JoinHandle<()>) {
    game_task.abort();
    if let Err(e) = game_task.await {
        if !e.is_cancelled() {
            tracing::error!("Game task failed: {}", e);
        }
    }
}

/// A session's entry in `AppState::sessions`. Only the game task writes the
/// entry, and it is removed when the registration is dropped.
pub struct SessionRegistration {
    state: Arc<AppState>,
    id: Uuid,
}

impl SessionRegistration {
    pub fn new(state: Arc<AppState>, session: &GameSession) -> Self {
        state.sessions.insert(session.id(), session.summary());
        Self {
            state,
            id: session.id(),
        }
    }

    fn update(&self, session: &GameSession) {
        self.state.sessions.insert(self.id, session.summary());
    }
}

impl Drop for SessionRegistration {
    fn drop(&mut self) {
        self.state.sessions.remove(&self.id);
    }
}

/// Drain the session's event queue one event at a time
async fn run_session(
    mut session: GameSession,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    tx: mpsc::Sender<ServerMessage>,
    registration: SessionRegistration,
) {
    while let Some(event) = events.recv().await {
        let out = session.process(event);
        registration.update(&session);

        for msg in out {
            if tx.send(msg).await.is_err() {
                return;
            }
        }
    }
}
