//! Word prompts and their sources.
//!
//! The controller asks a [`WordSource`] for the round's prompt; any
//! failure falls back to the built-in [`StaticWordList`] rather than
//! blocking the round.

use async_trait::async_trait;
use rand::Rng;

use crate::error::{DuudlError, DuudlResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WordPrompt {
    pub prompt: String,
    pub difficulty: Difficulty,
}

impl WordPrompt {
    pub fn new(prompt: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            prompt: prompt.into(),
            difficulty,
        }
    }
}

/// Where round prompts come from. May be remote and may fail.
#[async_trait]
pub trait WordSource: Send + Sync {
    async fn get_word(&self, difficulty: Difficulty) -> DuudlResult<WordPrompt>;
}

/// Built-in drawable-word table, the fallback of last resort.
#[derive(Clone, Debug)]
pub struct StaticWordList {
    entries: Vec<WordPrompt>,
}

const BUILTIN_WORDS: &[(&str, Difficulty)] = &[
    // Animals
    ("cat", Difficulty::Easy),
    ("dog", Difficulty::Easy),
    ("fish", Difficulty::Easy),
    ("bird", Difficulty::Easy),
    ("rabbit", Difficulty::Easy),
    ("chicken", Difficulty::Easy),
    ("bear", Difficulty::Medium),
    ("lion", Difficulty::Medium),
    ("tiger", Difficulty::Medium),
    ("horse", Difficulty::Medium),
    ("pig", Difficulty::Medium),
    ("sheep", Difficulty::Medium),
    ("cow", Difficulty::Medium),
    ("monkey", Difficulty::Hard),
    ("elephant", Difficulty::Hard),
    ("giraffe", Difficulty::Hard),
    ("zebra", Difficulty::Hard),
    ("wolf", Difficulty::Hard),
    // Food
    ("pizza", Difficulty::Easy),
    ("donut", Difficulty::Easy),
    ("burger", Difficulty::Easy),
    ("cake", Difficulty::Easy),
    ("apple", Difficulty::Easy),
    ("banana", Difficulty::Easy),
    ("carrot", Difficulty::Easy),
    ("cookie", Difficulty::Easy),
    ("watermelon", Difficulty::Medium),
    ("ice cream", Difficulty::Medium),
    ("noodle", Difficulty::Hard),
    // Instruments
    ("guitar", Difficulty::Easy),
    ("piano", Difficulty::Easy),
    ("drums", Difficulty::Easy),
    ("flute", Difficulty::Easy),
    ("violin", Difficulty::Medium),
    ("trumpet", Difficulty::Medium),
    ("saxophone", Difficulty::Hard),
    ("xylophone", Difficulty::Hard),
    // Objects
    ("lamp", Difficulty::Easy),
    ("chair", Difficulty::Easy),
    ("phone", Difficulty::Easy),
    ("book", Difficulty::Easy),
    ("key", Difficulty::Easy),
    ("door", Difficulty::Easy),
    ("window", Difficulty::Easy),
    ("camera", Difficulty::Easy),
    ("watch", Difficulty::Easy),
    ("robot", Difficulty::Hard),
    // Transport
    ("car", Difficulty::Easy),
    ("bus", Difficulty::Easy),
    ("bike", Difficulty::Easy),
    ("boat", Difficulty::Easy),
    ("train", Difficulty::Easy),
    ("plane", Difficulty::Easy),
    ("rocket", Difficulty::Easy),
    ("truck", Difficulty::Easy),
    ("motorcycle", Difficulty::Medium),
    ("helicopter", Difficulty::Hard),
];

impl Default for StaticWordList {
    fn default() -> Self {
        Self {
            entries: BUILTIN_WORDS
                .iter()
                .map(|(w, d)| WordPrompt::new(*w, *d))
                .collect(),
        }
    }
}

impl StaticWordList {
    pub fn new(entries: Vec<WordPrompt>) -> DuudlResult<Self> {
        if entries.is_empty() {
            return Err(DuudlError::validation("word list must be non-empty"));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Random word of the requested difficulty; if that bucket is empty,
    /// falls back to the whole table.
    pub fn pick(&self, difficulty: Difficulty) -> WordPrompt {
        let bucket: Vec<&WordPrompt> = self
            .entries
            .iter()
            .filter(|w| w.difficulty == difficulty)
            .collect();
        let mut rng = rand::thread_rng();
        if bucket.is_empty() {
            self.entries[rng.gen_range(0..self.entries.len())].clone()
        } else {
            bucket[rng.gen_range(0..bucket.len())].clone()
        }
    }
}

#[async_trait]
impl WordSource for StaticWordList {
    async fn get_word(&self, difficulty: Difficulty) -> DuudlResult<WordPrompt> {
        Ok(self.pick(difficulty))
    }
}
