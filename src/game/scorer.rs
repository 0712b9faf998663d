use crate::config::GameConfig;

/// Score rules for a session.
///
/// - A correct card adds `correct_points` (no cap below the win check)
/// - A wrong card deducts `wrong_penalty`, never going below zero
/// - Reaching `win_score` wins the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scorer {
    pub correct_points: u32,
    pub wrong_penalty: u32,
    pub win_score: u32,
}

impl Scorer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            correct_points: config.correct_points,
            wrong_penalty: config.wrong_penalty,
            win_score: config.win_score,
        }
    }

    pub fn award(&self, score: u32) -> u32 {
        score.saturating_add(self.correct_points)
    }

    pub fn deduct(&self, score: u32) -> u32 {
        score.saturating_sub(self.wrong_penalty)
    }

    pub fn is_win(&self, score: u32) -> bool {
        score >= self.win_score
    }

    /// Text of the score display
    pub fn label(score: u32) -> String {
        format!("Score: {}", score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> Scorer {
        Scorer::new(&GameConfig::default())
    }

    #[test]
    fn test_award() {
        assert_eq!(scorer().award(0), 10);
        assert_eq!(scorer().award(485), 495);
    }

    #[test]
    fn test_deduct_clamps_at_zero() {
        assert_eq!(scorer().deduct(20), 15);
        assert_eq!(scorer().deduct(5), 0);
        // 3 - 5 must not go negative
        assert_eq!(scorer().deduct(3), 0);
        assert_eq!(scorer().deduct(0), 0);
    }

    #[test]
    fn test_win_threshold() {
        let scorer = scorer();
        assert!(!scorer.is_win(490));
        assert!(scorer.is_win(scorer.award(490)));
        assert!(scorer.is_win(505));
    }

    #[test]
    fn test_label() {
        assert_eq!(Scorer::label(40), "Score: 40");
    }
}
