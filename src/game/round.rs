use rand::Rng;
use std::time::Duration;

use super::{CardGrid, GameError, Presenter, Scheduler, Scorer, TimerId};
use crate::{
    config::GameConfig,
    dictionary::WordBank,
    models::{CardId, RoundPhase},
    websocket::messages::{ServerMessage, TextLabel},
};

/// What a processed card click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Right card; the next round starts after the transition delay
    Correct { score: u32 },
    /// Right card and the win threshold was reached
    Won { score: u32 },
    /// Wrong card; it was taken off the board
    Wrong { score: u32 },
}

/// Owns the target word and the score, and drives the round lifecycle:
/// grid generation -> target selection -> clicks -> next round or victory.
pub struct RoundController {
    scorer: Scorer,
    transition_delay: Duration,
    success_cue: String,
    failure_cue: String,
    victory_message: String,
    target: Option<String>,
    score: u32,
    phase: RoundPhase,
    pending_transition: Option<TimerId>,
}

impl RoundController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            scorer: Scorer::new(config),
            transition_delay: config.transition_delay(),
            success_cue: config.success_cue.clone(),
            failure_cue: config.failure_cue.clone(),
            victory_message: config.victory_message.clone(),
            target: None,
            score: 0,
            phase: RoundPhase::Playing,
            pending_transition: None,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[cfg(test)]
    pub fn pending_transition(&self) -> Option<TimerId> {
        self.pending_transition
    }

    /// Correctness is decided by label, so every card showing the target
    /// word counts, not only the one the target was drawn from.
    pub fn is_target(&self, label: &str) -> bool {
        self.target.as_deref() == Some(label)
    }

    pub fn show_score(&self, presenter: &mut impl Presenter) {
        presenter.present(ServerMessage::SetText {
            label: TextLabel::Score,
            text: Scorer::label(self.score),
        });
    }

    /// Deal a fresh grid and pick the target from one of its cards.
    pub fn start_round(
        &mut self,
        grid: &mut CardGrid,
        bank: &WordBank,
        rng: &mut impl Rng,
        presenter: &mut impl Presenter,
    ) -> Result<(), GameError> {
        self.ensure_not_won("start a round")?;

        grid.generate(bank, rng, presenter)?;
        let target = grid.random_label(rng)?.to_string();
        self.begin_round(target, grid, bank, presenter)
    }

    /// Make `target` the word of the round and speak it. The grid must
    /// already show at least one card with that label.
    pub fn begin_round(
        &mut self,
        target: String,
        grid: &CardGrid,
        bank: &WordBank,
        presenter: &mut impl Presenter,
    ) -> Result<(), GameError> {
        self.ensure_not_won("start a round")?;
        if grid.count_label(&target) == 0 {
            return Err(GameError::TargetNotOnBoard(target));
        }

        tracing::info!(
            "Round started with target {:?} ({} of {} cards match)",
            target,
            grid.count_label(&target),
            grid.len()
        );

        self.target = Some(target);
        self.phase = RoundPhase::Playing;
        self.pending_transition = None;
        self.speak_target(bank, presenter);
        Ok(())
    }

    /// Replay the target cue (speaker control)
    pub fn replay_target(
        &self,
        bank: &WordBank,
        presenter: &mut impl Presenter,
    ) -> Result<(), GameError> {
        if self.phase != RoundPhase::Playing {
            return Err(GameError::InvalidState {
                action: "replay the word",
                phase: self.phase,
            });
        }
        self.speak_target(bank, presenter);
        Ok(())
    }

    fn speak_target(&self, bank: &WordBank, presenter: &mut impl Presenter) {
        let Some(target) = self.target.as_deref() else {
            return;
        };
        presenter.present(ServerMessage::StopAllAudio);
        match bank.cue(target) {
            Some(cue) => presenter.present(ServerMessage::PlayCue {
                cue: cue.to_string(),
            }),
            None => tracing::warn!("No audio cue for target word {:?}", target),
        }
    }

    pub fn on_card_clicked(
        &mut self,
        card_id: CardId,
        grid: &mut CardGrid,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> Result<ClickOutcome, GameError> {
        if self.phase != RoundPhase::Playing {
            return Err(GameError::InvalidState {
                action: "click a card",
                phase: self.phase,
            });
        }

        let card = grid.get(card_id).ok_or(GameError::CardNotFound(card_id))?;
        if !card.interactive {
            return Err(GameError::InvalidState {
                action: "click a disabled card",
                phase: self.phase,
            });
        }

        if !self.is_target(&card.label) {
            presenter.present(ServerMessage::PlayCue {
                cue: self.failure_cue.clone(),
            });
            self.score = self.scorer.deduct(self.score);
            self.show_score(presenter);
            grid.remove_card(card_id, presenter)?;

            tracing::debug!("Wrong card {}; score {}", card_id, self.score);
            return Ok(ClickOutcome::Wrong { score: self.score });
        }

        presenter.present(ServerMessage::PlayCue {
            cue: self.success_cue.clone(),
        });
        self.score = self.scorer.award(self.score);
        self.show_score(presenter);

        if self.scorer.is_win(self.score) {
            self.phase = RoundPhase::Won;
            grid.clear(presenter);
            presenter.present(ServerMessage::SetText {
                label: TextLabel::Victory,
                text: self.victory_message.clone(),
            });
            presenter.present(ServerMessage::StopAllAudio);
            grid.set_interactive(false, presenter);

            tracing::info!("Game won with score {}", self.score);
            return Ok(ClickOutcome::Won { score: self.score });
        }

        self.phase = RoundPhase::Transitioning;
        grid.set_interactive(false, presenter);
        grid.clear(presenter);
        self.pending_transition = Some(scheduler.schedule_once(self.transition_delay));

        tracing::debug!("Correct card {}; score {}", card_id, self.score);
        Ok(ClickOutcome::Correct { score: self.score })
    }

    /// Handle the transition timer. Returns `false` when `timer` is not the
    /// pending transition (stale or foreign timer).
    pub fn on_transition_elapsed(
        &mut self,
        timer: TimerId,
        grid: &mut CardGrid,
        bank: &WordBank,
        rng: &mut impl Rng,
        presenter: &mut impl Presenter,
    ) -> Result<bool, GameError> {
        if self.pending_transition != Some(timer) {
            return Ok(false);
        }
        self.pending_transition = None;

        if self.phase != RoundPhase::Transitioning {
            return Ok(false);
        }

        self.start_round(grid, bank, rng, presenter)?;
        grid.set_interactive(true, presenter);
        Ok(true)
    }

    pub fn cancel_pending(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(timer) = self.pending_transition.take() {
            scheduler.cancel(timer);
        }
    }

    fn ensure_not_won(&self, action: &'static str) -> Result<(), GameError> {
        if self.phase == RoundPhase::Won {
            return Err(GameError::InvalidState {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }
}
