use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use uuid::Uuid;

use super::messages::{ClientMessage, ServerMessage};
use crate::{
    config::GameConfig,
    dictionary::WordBank,
    game::{GameEvent, GameShell, Scheduler, TimerId},
    models::{RoundPhase, Viewport},
};

/// Everything that reaches a session's event loop
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Start { viewport: Option<Viewport> },
    Game(GameEvent),
}

impl From<ClientMessage> for SessionEvent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::StartGame { viewport } => SessionEvent::Start { viewport },
            ClientMessage::CardClicked { card_id } => {
                SessionEvent::Game(GameEvent::CardClicked(card_id))
            }
            ClientMessage::SpeakerClicked => SessionEvent::Game(GameEvent::SpeakerClicked),
            ClientMessage::HintClicked { slot } => {
                SessionEvent::Game(GameEvent::HintClicked(slot))
            }
        }
    }
}

/// Scheduler backed by tokio tasks. Each firing is pushed into the session's
/// event queue, so timer callbacks never run concurrently with input.
pub struct SessionTimers {
    next_id: u64,
    events: mpsc::UnboundedSender<SessionEvent>,
    handles: HashMap<TimerId, JoinHandle<()>>,
}

impl SessionTimers {
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            next_id: 0,
            events,
            handles: HashMap::new(),
        }
    }

    fn next_timer(&mut self) -> TimerId {
        self.handles.retain(|_, handle| !handle.is_finished());
        self.next_id += 1;
        TimerId(self.next_id)
    }

    #[cfg(test)]
    pub fn active(&self) -> usize {
        self.handles.values().filter(|h| !h.is_finished()).count()
    }
}

impl Scheduler for SessionTimers {
    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        let id = self.next_timer();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SessionEvent::Game(GameEvent::TimerFired(id)));
        });
        self.handles.insert(id, handle);
        id
    }

    fn schedule_repeating(&mut self, period: Duration) -> TimerId {
        let id = self.next_timer();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if events
                    .send(SessionEvent::Game(GameEvent::TimerFired(id)))
                    .is_err()
                {
                    break;
                }
            }
        });
        self.handles.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.handles.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for SessionTimers {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

/// Snapshot of a session for the HTTP API
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub score: u32,
    pub phase: Option<RoundPhase>,
}

/// One connected player: the game shell plus its timers.
pub struct GameSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    config: Arc<GameConfig>,
    bank: Arc<WordBank>,
    shell: Option<GameShell>,
    timers: SessionTimers,
}

impl GameSession {
    pub fn new(
        id: Uuid,
        config: Arc<GameConfig>,
        bank: Arc<WordBank>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            id,
            started_at: Utc::now(),
            config,
            bank,
            shell: None,
            timers: SessionTimers::new(events),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    #[cfg(test)]
    pub fn shell(&self) -> Option<&GameShell> {
        self.shell.as_ref()
    }

    #[cfg(test)]
    pub fn timers(&self) -> &SessionTimers {
        &self.timers
    }

    /// Apply one event and return the messages it produced for the client
    pub fn process(&mut self, event: SessionEvent) -> Vec<ServerMessage> {
        let mut out = Vec::new();

        match event {
            SessionEvent::Start { viewport } => self.start(viewport, &mut out),
            SessionEvent::Game(event) => {
                let Some(shell) = self.shell.as_mut() else {
                    tracing::debug!("Session {}: {:?} before a game started", self.id, event);
                    return out;
                };
                if let Err(e) = shell.handle(event, &mut self.timers, &mut out) {
                    tracing::warn!("Session {}: {}", self.id, e);
                    out.push(ServerMessage::Error {
                        message: e.to_string(),
                    });
                }
            }
        }

        out
    }

    fn start(&mut self, viewport: Option<Viewport>, out: &mut Vec<ServerMessage>) {
        if let Some(mut previous) = self.shell.take() {
            previous.stop(&mut self.timers);
        }

        let viewport = viewport.unwrap_or(self.config.viewport);
        self.started_at = Utc::now();
        out.push(ServerMessage::SessionStarted {
            session_id: self.id.to_string(),
            viewport,
            hint_slots: if self.config.hints_enabled {
                self.config.hint_slots.len()
            } else {
                0
            },
        });

        let mut shell = GameShell::new(&self.config, self.bank.clone(), viewport);
        match shell.start(&mut self.timers, out) {
            Ok(()) => {
                tracing::info!("Session {} started a game", self.id);
                self.shell = Some(shell);
            }
            Err(e) => {
                tracing::warn!("Session {} could not start a game: {}", self.id, e);
                shell.stop(&mut self.timers);
                out.push(ServerMessage::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            started_at: self.started_at,
            score: self.shell.as_ref().map_or(0, |s| s.score()),
            phase: self.shell.as_ref().map(|s| s.phase()),
        }
    }
}
