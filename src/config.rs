use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::models::Viewport;

/// Cooldown (seconds) and spared wrong cards for each hint slot, in slot order.
pub const HINT_SLOTS: [HintSlotConfig; 3] = [
    HintSlotConfig {
        cooldown_secs: 60,
        cards_to_spare: 0,
    },
    HintSlotConfig {
        cooldown_secs: 30,
        cards_to_spare: 1,
    },
    HintSlotConfig {
        cooldown_secs: 15,
        cards_to_spare: 3,
    },
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub assets: AssetConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    pub words_path: String,
    pub frontend_dir: String,
    pub assets_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HintSlotConfig {
    pub cooldown_secs: u32,
    pub cards_to_spare: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub card_width: f32,
    pub card_height: f32,
    pub viewport: Viewport,
    pub win_score: u32,
    pub correct_points: u32,
    pub wrong_penalty: u32,
    pub transition_delay_ms: u64,
    pub hints_enabled: bool,
    pub hint_slots: Vec<HintSlotConfig>,
    pub success_cue: String,
    pub failure_cue: String,
    pub victory_message: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 2,
            cols: 4,
            card_width: 200.0,
            card_height: 300.0,
            viewport: Viewport {
                width: 1000.0,
                height: 900.0,
            },
            win_score: 500,
            correct_points: 10,
            wrong_penalty: 5,
            transition_delay_ms: 1000,
            hints_enabled: true,
            hint_slots: HINT_SLOTS.to_vec(),
            success_cue: "assets/audio/good.mp3".to_string(),
            failure_cue: "assets/audio/wrong.mp3".to_string(),
            victory_message: "Победа!".to_string(),
        }
    }
}

impl GameConfig {
    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    pub fn card_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 3000)?,
        };

        let assets = AssetConfig {
            words_path: env::var("WORDS_PATH")
                .unwrap_or_else(|_| "./assets/words.json".to_string()),
            frontend_dir: env::var("FRONTEND_DIR").unwrap_or_else(|_| "./frontend".to_string()),
            assets_dir: env::var("ASSETS_DIR").unwrap_or_else(|_| "./assets".to_string()),
        };

        let defaults = GameConfig::default();
        let game = GameConfig {
            rows: env_or("GRID_ROWS", defaults.rows)?,
            cols: env_or("GRID_COLS", defaults.cols)?,
            card_width: env_or("CARD_WIDTH", defaults.card_width)?,
            card_height: env_or("CARD_HEIGHT", defaults.card_height)?,
            viewport: Viewport {
                width: env_or("VIEWPORT_WIDTH", defaults.viewport.width)?,
                height: env_or("VIEWPORT_HEIGHT", defaults.viewport.height)?,
            },
            win_score: env_or("WIN_SCORE", defaults.win_score)?,
            correct_points: env_or("CORRECT_POINTS", defaults.correct_points)?,
            wrong_penalty: env_or("WRONG_PENALTY", defaults.wrong_penalty)?,
            transition_delay_ms: env_or("TRANSITION_DELAY_MS", defaults.transition_delay_ms)?,
            hints_enabled: env_or("HINTS_ENABLED", defaults.hints_enabled)?,
            hint_slots: defaults.hint_slots,
            success_cue: env::var("SUCCESS_CUE").unwrap_or(defaults.success_cue),
            failure_cue: env::var("FAILURE_CUE").unwrap_or(defaults.failure_cue),
            victory_message: env::var("VICTORY_MESSAGE").unwrap_or(defaults.victory_message),
        };

        ensure!(
            game.rows > 0 && game.cols > 0,
            "GRID_ROWS and GRID_COLS must be at least 1 (got {}x{})",
            game.rows,
            game.cols
        );

        Ok(Config {
            server,
            assets,
            game,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Defaults without touching the environment
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            assets: AssetConfig {
                words_path: "./assets/words.json".to_string(),
                frontend_dir: "./frontend".to_string(),
                assets_dir: "./assets".to_string(),
            },
            game: GameConfig::default(),
        }
    }
}
