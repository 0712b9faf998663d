use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{dictionary::WordEntry, websocket::SessionSummary, AppState};

#[derive(Debug, Serialize)]
pub struct WordsResponse {
    pub words: Vec<WordEntry>,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

/// The loaded catalog in draw order
pub async fn list_words(State(state): State<Arc<AppState>>) -> Json<WordsResponse> {
    Json(WordsResponse {
        words: state.word_bank.entries().to_vec(),
    })
}

/// Currently connected sessions, oldest first
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<SessionsResponse> {
    let mut sessions: Vec<SessionSummary> =
        state.sessions.iter().map(|entry| entry.value().clone()).collect();
    sessions.sort_by_key(|s| s.started_at);
    Json(SessionsResponse { sessions })
}
