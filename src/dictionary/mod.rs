use anyhow::{Context, Result};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tokio::fs;

use crate::game::GameError;

/// One catalog entry: a word and the audio cue that speaks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordEntry {
    pub word: String,
    pub cue: String,
}

/// Read-only mapping of word -> audio cue, loaded once before play.
///
/// Words are kept in sorted order so that a seeded RNG draws the same
/// sequence regardless of how the catalog file was ordered.
#[derive(Debug, Clone, Default)]
pub struct WordBank {
    entries: Vec<WordEntry>,
    index: HashMap<String, usize>,
}

impl WordBank {
    /// Load the catalog from a JSON object of `"word": "audio/path.mp3"` pairs
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read word catalog {}", path.display()))?;
        let bank = Self::from_json(&content)
            .with_context(|| format!("failed to parse word catalog {}", path.display()))?;

        tracing::info!("Loaded {} words into word bank", bank.len());

        Ok(bank)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(content)?;
        Ok(Self::from_pairs(raw))
    }

    pub fn from_pairs<I, W, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (W, C)>,
        W: Into<String>,
        C: Into<String>,
    {
        let mut sorted = BTreeMap::new();
        for (word, cue) in pairs {
            let word = word.into().trim().to_string();
            let cue = cue.into().trim().to_string();
            if word.is_empty() || cue.is_empty() {
                tracing::warn!("Skipping catalog entry with empty word or cue: {:?}", word);
                continue;
            }
            if let Some(previous) = sorted.insert(word.clone(), cue) {
                tracing::warn!(
                    "Duplicate catalog entry {:?}; replacing cue {:?}",
                    word,
                    previous
                );
            }
        }

        let entries: Vec<WordEntry> = sorted
            .into_iter()
            .map(|(word, cue)| WordEntry { word, cue })
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.word.clone(), i))
            .collect();

        Self { entries, index }
    }

    /// Create an empty word bank (used when the catalog fails to load)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Audio cue for a word, if the word is in the catalog
    pub fn cue(&self, word: &str) -> Option<&str> {
        self.index
            .get(word)
            .map(|&i| self.entries[i].cue.as_str())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Uniformly random word; fails fast on an empty bank
    pub fn random_word(&self, rng: &mut impl Rng) -> Result<&str, GameError> {
        if self.entries.is_empty() {
            return Err(GameError::NoWordsAvailable);
        }
        let i = rng.random_range(0..self.entries.len());
        Ok(&self.entries[i].word)
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
