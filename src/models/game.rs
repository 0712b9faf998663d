use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a card, unique for the lifetime of a session.
///
/// Clicks carry this id instead of a reference to the card itself, so a click
/// that arrives after its card was destroyed resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// Top-left corner of a card in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// A clickable tile showing one word. Present in the grid == visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub label: String,
    pub position: Position,
    pub interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Playing,
    /// Grid cleared, waiting for the delayed start of the next round
    Transitioning,
    /// Terminal
    Won,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundPhase::Playing => "playing",
            RoundPhase::Transitioning => "transitioning",
            RoundPhase::Won => "won",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintState {
    Ready,
    /// Passive countdown (game start, or refreshed after a round win)
    OnCooldown,
    /// Used this round; counting down toward Ready
    Consumed,
}
