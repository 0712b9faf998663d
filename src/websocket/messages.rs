use serde::{Deserialize, Serialize};

use crate::models::{CardId, Viewport};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    StartGame {
        #[serde(default)]
        viewport: Option<Viewport>,
    },
    CardClicked {
        card_id: CardId,
    },
    SpeakerClicked,
    HintClicked {
        slot: usize,
    },
}

/// Text labels the client keeps on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLabel {
    Score,
    Victory,
    HintSlot(usize),
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    SessionStarted {
        session_id: String,
        viewport: Viewport,
        hint_slots: usize,
    },
    DrawCard {
        card_id: CardId,
        label: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    DestroyCard {
        card_id: CardId,
    },
    SetCardInteractive {
        card_id: CardId,
        enabled: bool,
    },
    PlayCue {
        cue: String,
    },
    StopAllAudio,
    SetText {
        label: TextLabel,
        text: String,
    },
    SetHintVisible {
        slot: usize,
        visible: bool,
    },
    Error {
        message: String,
    },
}
