use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;

use super::{
    CardGrid, ClickOutcome, GameError, GridLayout, HintSystem, Presenter, RoundController,
    Scheduler, TimerId,
};
use crate::{
    config::GameConfig,
    dictionary::WordBank,
    models::{CardId, RoundPhase, Viewport},
};

/// Discrete inputs of a session, processed strictly in arrival order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    CardClicked(CardId),
    SpeakerClicked,
    HintClicked(usize),
    TimerFired(TimerId),
}

/// Composition root of one game session.
///
/// Routes events to the round controller and, when enabled, the hint
/// system. Stale references and out-of-phase actions are swallowed here.
pub struct GameShell<R: Rng = StdRng> {
    bank: Arc<WordBank>,
    grid: CardGrid,
    round: RoundController,
    hints: Option<HintSystem>,
    rng: R,
}

impl GameShell<StdRng> {
    pub fn new(config: &GameConfig, bank: Arc<WordBank>, viewport: Viewport) -> Self {
        Self::with_rng(config, bank, viewport, StdRng::from_os_rng())
    }
}

impl<R: Rng> GameShell<R> {
    pub fn with_rng(config: &GameConfig, bank: Arc<WordBank>, viewport: Viewport, rng: R) -> Self {
        let hints = config
            .hints_enabled
            .then(|| HintSystem::new(&config.hint_slots));

        Self {
            bank,
            grid: CardGrid::new(GridLayout::new(config, viewport)),
            round: RoundController::new(config),
            hints,
            rng,
        }
    }

    pub fn score(&self) -> u32 {
        self.round.score()
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }

    #[cfg(test)]
    pub fn target(&self) -> Option<&str> {
        self.round.target()
    }

    #[cfg(test)]
    pub fn grid(&self) -> &CardGrid {
        &self.grid
    }

    #[cfg(test)]
    pub fn hints(&self) -> Option<&HintSystem> {
        self.hints.as_ref()
    }

    /// Show the score, deal the first round and start the hint countdowns
    pub fn start(
        &mut self,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> Result<(), GameError> {
        self.round.show_score(presenter);
        self.round
            .start_round(&mut self.grid, &self.bank, &mut self.rng, presenter)?;
        if let Some(hints) = self.hints.as_mut() {
            hints.start(scheduler, presenter);
        }
        Ok(())
    }

    /// Process one event. Ignorable anomalies (NotFound, InvalidState)
    /// become no-ops; anything else is returned.
    pub fn handle(
        &mut self,
        event: GameEvent,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> Result<(), GameError> {
        let result = match event {
            GameEvent::CardClicked(card_id) => self.on_card_clicked(card_id, scheduler, presenter),
            GameEvent::SpeakerClicked => self.round.replay_target(&self.bank, presenter),
            GameEvent::HintClicked(slot) => self.on_hint_clicked(slot, scheduler, presenter),
            GameEvent::TimerFired(timer) => self.on_timer(timer, scheduler, presenter),
        };

        match result {
            Err(e) if e.is_ignorable() => {
                tracing::debug!("Ignoring {:?}: {}", event, e);
                Ok(())
            }
            other => other,
        }
    }

    /// Cancel every outstanding timer of this game
    pub fn stop(&mut self, scheduler: &mut impl Scheduler) {
        self.round.cancel_pending(scheduler);
        if let Some(hints) = self.hints.as_mut() {
            hints.shutdown(scheduler);
        }
    }

    fn on_card_clicked(
        &mut self,
        card_id: CardId,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> Result<(), GameError> {
        let outcome = self
            .round
            .on_card_clicked(card_id, &mut self.grid, scheduler, presenter)?;

        match (outcome, self.hints.as_mut()) {
            (ClickOutcome::Correct { .. }, Some(hints)) => {
                hints.reset_consumed(scheduler, presenter);
            }
            (ClickOutcome::Won { .. }, Some(hints)) => hints.shutdown(scheduler),
            _ => {}
        }
        Ok(())
    }

    fn on_hint_clicked(
        &mut self,
        slot: usize,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> Result<(), GameError> {
        let hints = self
            .hints
            .as_mut()
            .ok_or(GameError::HintSlotNotFound(slot))?;

        let phase = self.round.phase();
        let target = match (phase, self.round.target()) {
            (RoundPhase::Playing, Some(target)) => target,
            _ => {
                return Err(GameError::InvalidState {
                    action: "use a hint",
                    phase,
                })
            }
        };

        hints.activate(slot, &mut self.grid, target, scheduler, presenter)?;
        Ok(())
    }

    fn on_timer(
        &mut self,
        timer: TimerId,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> Result<(), GameError> {
        if self.round.on_transition_elapsed(
            timer,
            &mut self.grid,
            &self.bank,
            &mut self.rng,
            presenter,
        )? {
            return Ok(());
        }

        let ticked = self
            .hints
            .as_mut()
            .is_some_and(|hints| hints.on_tick(timer, scheduler, presenter));
        if !ticked {
            tracing::debug!("Timer {:?} has no owner; ignoring", timer);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::timer::testing::ManualScheduler;
    use crate::models::HintState;
    use crate::websocket::messages::{ServerMessage, TextLabel};

    struct Harness {
        shell: GameShell<StdRng>,
        scheduler: ManualScheduler,
        out: Vec<ServerMessage>,
    }

    impl Harness {
        fn with_config(config: GameConfig, bank: WordBank) -> Self {
            let viewport = config.viewport;
            let shell =
                GameShell::with_rng(&config, Arc::new(bank), viewport, StdRng::seed_from_u64(5));
            Self {
                shell,
                scheduler: ManualScheduler::new(),
                out: Vec::new(),
            }
        }

        fn started() -> Self {
            let bank = WordBank::from_pairs([("cat", "a.mp3"), ("dog", "b.mp3"), ("cow", "c.mp3")]);
            let mut h = Self::with_config(GameConfig::default(), bank);
            h.shell.start(&mut h.scheduler, &mut h.out).unwrap();
            h
        }

        fn send(&mut self, event: GameEvent) {
            self.shell
                .handle(event, &mut self.scheduler, &mut self.out)
                .unwrap();
        }

        fn correct_card(&self) -> CardId {
            let target = self.shell.target().unwrap();
            self.shell
                .grid()
                .cards()
                .iter()
                .find(|c| c.label == target)
                .map(|c| c.id)
                .unwrap()
        }

        fn wrong_card(&self) -> Option<CardId> {
            let target = self.shell.target().unwrap();
            self.shell
                .grid()
                .cards()
                .iter()
                .find(|c| c.label != target)
                .map(|c| c.id)
        }

        /// Fire the pending round transition
        fn finish_transition(&mut self) {
            let timer = self.scheduler.one_shots()[0].id;
            self.scheduler.take_one_shot(timer);
            self.send(GameEvent::TimerFired(timer));
        }

        fn tick_slot_until_ready(&mut self, slot: usize) {
            while let Some(timer) = self.shell.hints().unwrap().slot(slot).unwrap().ticker() {
                self.send(GameEvent::TimerFired(timer));
            }
        }
    }

    #[test]
    fn test_start_deals_grid_and_starts_hints() {
        let h = Harness::started();
        assert_eq!(h.shell.grid().len(), 8);
        assert!(h.shell.grid().count_label(h.shell.target().unwrap()) >= 1);
        assert_eq!(h.scheduler.repeating().len(), 3);
        assert_eq!(
            h.out[0],
            ServerMessage::SetText {
                label: TextLabel::Score,
                text: "Score: 0".into()
            }
        );
    }

    #[test]
    fn test_start_with_empty_bank_reports_no_words() {
        let mut h = Harness::with_config(GameConfig::default(), WordBank::empty());
        assert_eq!(
            h.shell.start(&mut h.scheduler, &mut h.out),
            Err(GameError::NoWordsAvailable)
        );
        assert!(h.scheduler.active.is_empty());
    }

    #[test]
    fn test_round_cycle_keeps_target_on_board() {
        let mut h = Harness::started();
        for round in 1..=10 {
            let card = h.correct_card();
            h.send(GameEvent::CardClicked(card));
            assert_eq!(h.shell.phase(), RoundPhase::Transitioning);
            assert_eq!(h.shell.score(), round * 10);

            h.finish_transition();
            assert_eq!(h.shell.phase(), RoundPhase::Playing);
            assert_eq!(h.shell.grid().len(), 8);
            assert!(h.shell.grid().count_label(h.shell.target().unwrap()) >= 1);
        }
    }

    #[test]
    fn test_play_to_victory_then_nothing_changes() {
        let mut h = Harness::started();
        while h.shell.phase() != RoundPhase::Won {
            let card = h.correct_card();
            h.send(GameEvent::CardClicked(card));
            if h.shell.phase() == RoundPhase::Transitioning {
                h.finish_transition();
            }
        }
        assert_eq!(h.shell.score(), 500);
        assert!(h.shell.grid().is_empty());
        assert!(h.scheduler.active.is_empty());

        h.out.clear();
        h.send(GameEvent::CardClicked(CardId(1)));
        h.send(GameEvent::HintClicked(0));
        h.send(GameEvent::SpeakerClicked);
        h.send(GameEvent::TimerFired(TimerId(1)));
        assert_eq!(h.shell.score(), 500);
        assert!(h.shell.grid().is_empty());
        assert!(h.out.is_empty());
    }

    #[test]
    fn test_wrong_click_is_not_a_new_round() {
        let mut h = Harness::started();
        // Seeded: find a round whose grid has a distractor
        while h.wrong_card().is_none() {
            let card = h.correct_card();
            h.send(GameEvent::CardClicked(card));
            h.finish_transition();
        }
        let score = h.shell.score();
        let target = h.shell.target().unwrap().to_string();
        let wrong = h.wrong_card().unwrap();

        h.send(GameEvent::CardClicked(wrong));
        assert_eq!(h.shell.grid().len(), 7);
        assert_eq!(h.shell.target(), Some(target.as_str()));
        assert_eq!(h.shell.score(), score.saturating_sub(5));
        assert!(h.scheduler.one_shots().is_empty());
    }

    #[test]
    fn test_hint_used_then_refreshed_by_round_win() {
        let mut h = Harness::started();
        h.tick_slot_until_ready(1);
        assert!(h.shell.hints().unwrap().slot(1).unwrap().is_ready());

        h.send(GameEvent::HintClicked(1));
        let slot = h.shell.hints().unwrap().slot(1).unwrap();
        assert_eq!(slot.state, HintState::Consumed);
        let target = h.shell.target().unwrap();
        let wrong_left = h
            .shell
            .grid()
            .cards()
            .iter()
            .filter(|c| c.label != target)
            .count();
        assert!(wrong_left <= 1);

        // Burn part of the cooldown, then win the round
        let ticker = slot.ticker().unwrap();
        for _ in 0..10 {
            h.send(GameEvent::TimerFired(ticker));
        }
        assert_eq!(h.shell.hints().unwrap().slot(1).unwrap().cooldown_remaining, 20);

        let card = h.correct_card();
        h.send(GameEvent::CardClicked(card));
        let slot = h.shell.hints().unwrap().slot(1).unwrap();
        assert_eq!(slot.state, HintState::OnCooldown);
        assert_eq!(slot.cooldown_remaining, 30);
    }

    #[test]
    fn test_hint_ignored_while_transitioning() {
        let mut h = Harness::started();
        h.tick_slot_until_ready(0);
        let card = h.correct_card();
        h.send(GameEvent::CardClicked(card));

        h.send(GameEvent::HintClicked(0));
        assert!(h.shell.hints().unwrap().slot(0).unwrap().is_ready());
    }

    #[test]
    fn test_hints_disabled() {
        let config = GameConfig {
            hints_enabled: false,
            ..GameConfig::default()
        };
        let mut h = Harness::with_config(config, WordBank::from_pairs([("cat", "a"), ("dog", "b")]));
        h.shell.start(&mut h.scheduler, &mut h.out).unwrap();

        assert!(h.shell.hints().is_none());
        assert!(h.scheduler.active.is_empty());
        let before = h.shell.grid().len();
        h.send(GameEvent::HintClicked(0));
        assert_eq!(h.shell.grid().len(), before);
    }

    #[test]
    fn test_late_click_on_destroyed_card_is_ignored() {
        let mut h = Harness::started();
        let card = h.correct_card();
        h.send(GameEvent::CardClicked(card));
        h.finish_transition();

        let score = h.shell.score();
        h.out.clear();
        h.send(GameEvent::CardClicked(card));
        assert_eq!(h.shell.score(), score);
        assert!(h.out.is_empty());
    }

    #[test]
    fn test_speaker_replays_target() {
        let mut h = Harness::started();
        h.out.clear();
        h.send(GameEvent::SpeakerClicked);
        assert_eq!(h.out[0], ServerMessage::StopAllAudio);
        assert!(matches!(h.out[1], ServerMessage::PlayCue { .. }));
    }

    #[test]
    fn test_stop_cancels_everything() {
        let mut h = Harness::started();
        let card = h.correct_card();
        h.send(GameEvent::CardClicked(card));
        assert!(!h.scheduler.active.is_empty());

        h.shell.stop(&mut h.scheduler);
        assert!(h.scheduler.active.is_empty());
    }
}
