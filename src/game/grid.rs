use rand::Rng;

use super::{GameError, Presenter};
use crate::{
    config::GameConfig,
    dictionary::WordBank,
    models::{Card, CardId, Position, Viewport},
    websocket::messages::ServerMessage,
};

/// Fixed card size spread over the viewport with even margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub card_width: f32,
    pub card_height: f32,
    pub viewport: Viewport,
}

impl GridLayout {
    pub fn new(config: &GameConfig, viewport: Viewport) -> Self {
        Self {
            rows: config.rows,
            cols: config.cols,
            card_width: config.card_width,
            card_height: config.card_height,
            viewport,
        }
    }

    pub fn card_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Gap between cards (and between the outer cards and the viewport edge)
    pub fn margins(&self) -> (f32, f32) {
        let cols = self.cols as f32;
        let rows = self.rows as f32;
        let horizontal = (self.viewport.width - cols * self.card_width) / (cols + 1.0);
        let vertical = (self.viewport.height - rows * self.card_height) / (rows + 1.0);
        (horizontal, vertical)
    }

    /// Top-left corner of the card at `(row, col)`
    pub fn position(&self, row: usize, col: usize) -> Position {
        let (horizontal, vertical) = self.margins();
        Position {
            x: horizontal + col as f32 * (self.card_width + horizontal),
            y: vertical + row as f32 * (self.card_height + vertical),
        }
    }
}

/// Owns the cards currently on the board.
pub struct CardGrid {
    layout: GridLayout,
    cards: Vec<Card>,
    next_id: u64,
}

impl CardGrid {
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            cards: Vec::with_capacity(layout.card_count()),
            next_id: 0,
        }
    }

    #[cfg(test)]
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Replace the board with `rows x cols` cards, each labeled with a word
    /// drawn independently (repeats allowed) from the bank.
    pub fn generate(
        &mut self,
        bank: &WordBank,
        rng: &mut impl Rng,
        presenter: &mut impl Presenter,
    ) -> Result<&[Card], GameError> {
        if bank.is_empty() {
            return Err(GameError::NoWordsAvailable);
        }

        let mut labels = Vec::with_capacity(self.layout.card_count());
        for _ in 0..self.layout.card_count() {
            labels.push(bank.random_word(rng)?.to_string());
        }

        Ok(self.populate(labels, presenter))
    }

    /// Replace the board with the given labels laid out row by row.
    /// Labels beyond the grid capacity are dropped.
    pub fn populate<I>(&mut self, labels: I, presenter: &mut impl Presenter) -> &[Card]
    where
        I: IntoIterator<Item = String>,
    {
        self.clear(presenter);

        let cols = self.layout.cols.max(1);
        for (slot, label) in labels
            .into_iter()
            .take(self.layout.card_count())
            .enumerate()
        {
            let position = self.layout.position(slot / cols, slot % cols);
            self.next_id += 1;
            let card = Card {
                id: CardId(self.next_id),
                label,
                position,
                interactive: true,
            };

            presenter.present(ServerMessage::DrawCard {
                card_id: card.id,
                label: card.label.clone(),
                x: position.x,
                y: position.y,
                width: self.layout.card_width,
                height: self.layout.card_height,
            });
            self.cards.push(card);
        }

        &self.cards
    }

    /// Take one card off the board. Unknown ids report `CardNotFound` and
    /// leave the board untouched.
    pub fn remove_card(
        &mut self,
        id: CardId,
        presenter: &mut impl Presenter,
    ) -> Result<Card, GameError> {
        let index = self
            .cards
            .iter()
            .position(|card| card.id == id)
            .ok_or(GameError::CardNotFound(id))?;

        let card = self.cards.remove(index);
        presenter.present(ServerMessage::DestroyCard { card_id: card.id });
        Ok(card)
    }

    pub fn clear(&mut self, presenter: &mut impl Presenter) {
        for card in self.cards.drain(..) {
            presenter.present(ServerMessage::DestroyCard { card_id: card.id });
        }
    }

    /// Enable or disable clicks on every card; only changed cards are reported
    pub fn set_interactive(&mut self, enabled: bool, presenter: &mut impl Presenter) {
        for card in self.cards.iter_mut().filter(|c| c.interactive != enabled) {
            card.interactive = enabled;
            presenter.present(ServerMessage::SetCardInteractive {
                card_id: card.id,
                enabled,
            });
        }
    }

    /// Label of a uniformly random card on the board
    pub fn random_label(&self, rng: &mut impl Rng) -> Result<&str, GameError> {
        if self.cards.is_empty() {
            return Err(GameError::EmptyGrid);
        }
        let i = rng.random_range(0..self.cards.len());
        Ok(&self.cards[i].label)
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn count_label(&self, label: &str) -> usize {
        self.cards.iter().filter(|card| card.label == label).count()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn test_grid() -> CardGrid {
        let config = GameConfig::default();
        CardGrid::new(GridLayout::new(&config, config.viewport))
    }

    fn labels(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_layout_positions() {
        let grid = test_grid();
        let layout = grid.layout();
        // (1000 - 4 * 200) / 5 = 40, (900 - 2 * 300) / 3 = 100
        assert_eq!(layout.margins(), (40.0, 100.0));
        assert_eq!(layout.position(0, 0), Position { x: 40.0, y: 100.0 });
        assert_eq!(layout.position(0, 3), Position { x: 760.0, y: 100.0 });
        assert_eq!(layout.position(1, 1), Position { x: 280.0, y: 500.0 });
    }

    #[test]
    fn test_grid_generation() {
        let mut grid = test_grid();
        let bank = WordBank::from_pairs([("cat", "a"), ("dog", "b"), ("cow", "c")]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut out: Vec<ServerMessage> = Vec::new();

        let cards = grid.generate(&bank, &mut rng, &mut out).unwrap();
        assert_eq!(cards.len(), 8);
        assert!(cards.iter().all(|c| bank.contains(&c.label) && c.interactive));

        let draws = out
            .iter()
            .filter(|m| matches!(m, ServerMessage::DrawCard { .. }))
            .count();
        assert_eq!(draws, 8);
    }

    #[test]
    fn test_regeneration_clears_previous_cards() {
        let mut grid = test_grid();
        let bank = WordBank::from_pairs([("cat", "a")]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut out: Vec<ServerMessage> = Vec::new();

        let first: Vec<CardId> = grid
            .generate(&bank, &mut rng, &mut out)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        out.clear();
        grid.generate(&bank, &mut rng, &mut out).unwrap();

        for id in &first {
            assert!(out.contains(&ServerMessage::DestroyCard { card_id: *id }));
            assert!(grid.get(*id).is_none());
        }
        assert_eq!(grid.len(), 8);
    }

    #[test]
    fn test_generate_with_empty_bank_fails_fast() {
        let mut grid = test_grid();
        let mut rng = StdRng::seed_from_u64(1);
        let mut out: Vec<ServerMessage> = Vec::new();
        assert_eq!(
            grid.generate(&WordBank::empty(), &mut rng, &mut out)
                .unwrap_err(),
            GameError::NoWordsAvailable
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_remove_card() {
        let mut grid = test_grid();
        let mut out: Vec<ServerMessage> = Vec::new();
        let id = grid.populate(labels(&["cat", "dog", "cow"]), &mut out)[1].id;
        out.clear();

        let removed = grid.remove_card(id, &mut out).unwrap();
        assert_eq!(removed.label, "dog");
        assert_eq!(grid.len(), 2);
        assert_eq!(out, vec![ServerMessage::DestroyCard { card_id: id }]);
    }

    #[test]
    fn test_remove_unknown_card_is_noop() {
        let mut grid = test_grid();
        let mut out: Vec<ServerMessage> = Vec::new();
        grid.populate(labels(&["cat", "dog"]), &mut out);
        out.clear();

        assert_eq!(
            grid.remove_card(CardId(999), &mut out),
            Err(GameError::CardNotFound(CardId(999)))
        );
        assert_eq!(grid.len(), 2);
        assert!(out.is_empty());
    }

    #[test]
    fn test_set_interactive_reports_only_changes() {
        let mut grid = test_grid();
        let mut out: Vec<ServerMessage> = Vec::new();
        grid.populate(labels(&["cat", "dog"]), &mut out);
        out.clear();

        grid.set_interactive(true, &mut out);
        assert!(out.is_empty());

        grid.set_interactive(false, &mut out);
        assert_eq!(out.len(), 2);
        assert!(grid.cards().iter().all(|c| !c.interactive));
    }

    #[test]
    fn test_populate_caps_at_grid_capacity() {
        let mut grid = test_grid();
        let mut out: Vec<ServerMessage> = Vec::new();
        let words = vec!["cat".to_string(); 12];
        assert_eq!(grid.populate(words, &mut out).len(), 8);
    }

    #[test]
    fn test_random_label_on_empty_grid() {
        let grid = test_grid();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(grid.random_label(&mut rng), Err(GameError::EmptyGrid));
    }
}
