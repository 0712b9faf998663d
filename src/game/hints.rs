use std::time::Duration;

use super::{CardGrid, GameError, Presenter, Scheduler, TimerId};
use crate::{
    config::HintSlotConfig,
    models::{CardId, HintState},
    websocket::messages::{ServerMessage, TextLabel},
};

const TICK: Duration = Duration::from_secs(1);

/// One hint control: removes distractor cards, then cools down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintSlot {
    pub index: usize,
    pub original_cooldown: u32,
    pub cooldown_remaining: u32,
    pub state: HintState,
    pub cards_to_spare: usize,
    ticker: Option<TimerId>,
}

impl HintSlot {
    fn new(index: usize, config: &HintSlotConfig) -> Self {
        Self {
            index,
            original_cooldown: config.cooldown_secs,
            cooldown_remaining: config.cooldown_secs,
            state: HintState::OnCooldown,
            cards_to_spare: config.cards_to_spare,
            ticker: None,
        }
    }

    #[cfg(test)]
    pub fn ticker(&self) -> Option<TimerId> {
        self.ticker
    }

    pub fn is_ready(&self) -> bool {
        self.state == HintState::Ready
    }
}

/// The hint slots of one session, each with its own one-second ticker.
pub struct HintSystem {
    slots: Vec<HintSlot>,
}

impl HintSystem {
    pub fn new(configs: &[HintSlotConfig]) -> Self {
        Self {
            slots: configs
                .iter()
                .enumerate()
                .map(|(i, config)| HintSlot::new(i, config))
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn slots(&self) -> &[HintSlot] {
        &self.slots
    }

    #[cfg(test)]
    pub fn slot(&self, index: usize) -> Option<&HintSlot> {
        self.slots.get(index)
    }

    /// Game start: every slot runs its passive countdown before first use.
    pub fn start(&mut self, scheduler: &mut impl Scheduler, presenter: &mut impl Presenter) {
        for slot in &mut self.slots {
            slot.state = HintState::OnCooldown;
            presenter.present(ServerMessage::SetHintVisible {
                slot: slot.index,
                visible: false,
            });
            Self::restart_countdown(slot, scheduler, presenter);
        }
    }

    /// Remove all but `cards_to_spare` of the cards not labeled `target`.
    /// Cards bearing the target label are never touched. Returns how many
    /// cards were removed.
    pub fn activate(
        &mut self,
        index: usize,
        grid: &mut CardGrid,
        target: &str,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> Result<usize, GameError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(GameError::HintSlotNotFound(index))?;
        if !slot.is_ready() {
            return Err(GameError::HintNotReady(index));
        }

        let wrong: Vec<CardId> = grid
            .cards()
            .iter()
            .filter(|card| card.label != target)
            .map(|card| card.id)
            .collect();
        let to_remove = wrong.len().saturating_sub(slot.cards_to_spare);
        for id in wrong.into_iter().take(to_remove) {
            grid.remove_card(id, presenter)?;
        }

        tracing::debug!(
            "Hint {} removed {} cards ({} spared)",
            index,
            to_remove,
            slot.cards_to_spare
        );

        slot.state = HintState::Consumed;
        presenter.present(ServerMessage::SetHintVisible {
            slot: index,
            visible: false,
        });
        Self::restart_countdown(slot, scheduler, presenter);

        Ok(to_remove)
    }

    /// Advance the countdown owning `timer`. Returns `false` for timers no
    /// slot owns (cancelled tickers whose last tick was already queued).
    pub fn on_tick(
        &mut self,
        timer: TimerId,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.ticker == Some(timer)) else {
            return false;
        };

        slot.cooldown_remaining = slot.cooldown_remaining.saturating_sub(1);
        if slot.cooldown_remaining == 0 {
            Self::make_ready(slot, scheduler, presenter);
        } else {
            presenter.present(ServerMessage::SetText {
                label: TextLabel::HintSlot(slot.index),
                text: slot.cooldown_remaining.to_string(),
            });
        }
        true
    }

    /// Refresh a used-up slot: its countdown restarts from the full original
    /// cooldown no matter how much of it had already elapsed. Returns
    /// whether the slot was consumed.
    pub fn reset_if_consumed(
        &mut self,
        index: usize,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> Result<bool, GameError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(GameError::HintSlotNotFound(index))?;
        if slot.state != HintState::Consumed {
            return Ok(false);
        }

        slot.state = HintState::OnCooldown;
        Self::restart_countdown(slot, scheduler, presenter);
        Ok(true)
    }

    /// `reset_if_consumed` for every slot; called after each round win
    pub fn reset_consumed(
        &mut self,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) -> usize {
        (0..self.slots.len())
            .filter(|&i| matches!(self.reset_if_consumed(i, scheduler, presenter), Ok(true)))
            .count()
    }

    /// Stop every ticker (game over)
    pub fn shutdown(&mut self, scheduler: &mut impl Scheduler) {
        for slot in &mut self.slots {
            if let Some(timer) = slot.ticker.take() {
                scheduler.cancel(timer);
            }
        }
    }

    fn restart_countdown(
        slot: &mut HintSlot,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) {
        if let Some(timer) = slot.ticker.take() {
            scheduler.cancel(timer);
        }
        slot.cooldown_remaining = slot.original_cooldown;
        if slot.cooldown_remaining == 0 {
            Self::make_ready(slot, scheduler, presenter);
            return;
        }

        slot.ticker = Some(scheduler.schedule_repeating(TICK));
        presenter.present(ServerMessage::SetText {
            label: TextLabel::HintSlot(slot.index),
            text: slot.cooldown_remaining.to_string(),
        });
    }

    fn make_ready(
        slot: &mut HintSlot,
        scheduler: &mut impl Scheduler,
        presenter: &mut impl Presenter,
    ) {
        if let Some(timer) = slot.ticker.take() {
            scheduler.cancel(timer);
        }
        slot.state = HintState::Ready;
        slot.cooldown_remaining = slot.original_cooldown;
        presenter.present(ServerMessage::SetText {
            label: TextLabel::HintSlot(slot.index),
            text: String::new(),
        });
        presenter.present(ServerMessage::SetHintVisible {
            slot: slot.index,
            visible: true,
        });
    }
}
