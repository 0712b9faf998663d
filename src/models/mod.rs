pub mod game;

pub use game::{Card, CardId, HintState, Position, RoundPhase, Viewport};
