// Game core: grid, rounds, hints and the shell that wires them together.
// Nothing in here touches sockets or the async runtime; output goes through
// `Presenter` and delays through `Scheduler`.

pub mod grid;
pub mod hints;
pub mod round;
pub mod scorer;
pub mod shell;
pub mod timer;

pub use grid::{CardGrid, GridLayout};
pub use hints::HintSystem;
pub use round::{ClickOutcome, RoundController};
pub use scorer::Scorer;
pub use shell::{GameEvent, GameShell};
pub use timer::{Scheduler, TimerId};

use crate::models::{CardId, RoundPhase};
use crate::websocket::messages::ServerMessage;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("no words available")]
    NoWordsAvailable,

    #[error("cannot pick a target from an empty grid")]
    EmptyGrid,

    #[error("target word {0:?} is not on the board")]
    TargetNotOnBoard(String),

    #[error("{0} is not on the board")]
    CardNotFound(CardId),

    #[error("hint slot {0} does not exist")]
    HintSlotNotFound(usize),

    #[error("hint slot {0} is not ready")]
    HintNotReady(usize),

    #[error("cannot {action} while {phase}")]
    InvalidState {
        action: &'static str,
        phase: RoundPhase,
    },
}

impl GameError {
    /// Anomalies that degrade to a silent no-op: stale references and
    /// actions attempted outside their valid state.
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            GameError::CardNotFound(_)
                | GameError::HintSlotNotFound(_)
                | GameError::HintNotReady(_)
                | GameError::InvalidState { .. }
        )
    }
}

/// Sink for the draw/audio/text requests the core makes of the client.
pub trait Presenter {
    fn present(&mut self, msg: ServerMessage);
}

impl Presenter for Vec<ServerMessage> {
    fn present(&mut self, msg: ServerMessage) {
        self.push(msg);
    }
}
