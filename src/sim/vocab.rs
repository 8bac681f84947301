//! Vocabulary definitions and letter queues
//!
//! A `WordDef` says what a word needs; it never changes during a run.
//! Collection state lives separately in `progress::WordProgress`.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use super::level::{LevelConfig, LevelId, LevelRegistry};

/// Immutable definition of a vocabulary word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDef {
    pub word: &'static str,
    pub translation: &'static str,
    /// Letters in spelling order, with repeats
    pub letters: Vec<char>,
    pub level: LevelId,
}

impl WordDef {
    /// How many times `letter` occurs in the word
    pub fn required(&self, letter: char) -> u32 {
        self.letters.iter().filter(|&&c| c == letter).count() as u32
    }

    /// Distinct letters in first-occurrence order
    pub fn distinct_letters(&self) -> impl Iterator<Item = char> + '_ {
        self.letters
            .iter()
            .enumerate()
            .filter(|&(i, c)| !self.letters[..i].contains(c))
            .map(|(_, &c)| c)
    }
}

/// Every word of every level, keyed by the word itself
#[derive(Debug, Clone)]
pub struct Vocabulary {
    defs: Vec<WordDef>,
    index: HashMap<&'static str, usize>,
}

impl Vocabulary {
    pub fn from_registry(registry: &LevelRegistry) -> Self {
        let mut defs = Vec::new();
        let mut index = HashMap::new();
        for level in registry.iter() {
            for spec in level.words {
                index.insert(spec.word, defs.len());
                defs.push(WordDef {
                    word: spec.word,
                    translation: spec.translation,
                    letters: spec.word.chars().collect(),
                    level: level.id,
                });
            }
        }
        Self { defs, index }
    }

    pub fn get(&self, word: &str) -> Option<&WordDef> {
        self.index.get(word).map(|&i| &self.defs[i])
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// All words in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &WordDef> {
        self.defs.iter()
    }

    /// Words belonging to one level, in declaration order
    pub fn words_of(&self, level: LevelId) -> impl Iterator<Item = &WordDef> {
        self.defs.iter().filter(move |def| def.level == level)
    }
}

/// One upcoming letter collectible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueuedLetter {
    pub word: &'static str,
    pub letter: char,
}

/// Strict FIFO of the letters a level still has to emit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterQueue {
    entries: VecDeque<QueuedLetter>,
}

impl LetterQueue {
    /// The level's full queue: each word spelled out, words in declared order
    pub fn canonical(level: &LevelConfig) -> Self {
        let entries = level
            .words
            .iter()
            .flat_map(|spec| {
                spec.word.chars().map(move |letter| QueuedLetter {
                    word: spec.word,
                    letter,
                })
            })
            .collect();
        Self { entries }
    }

    pub fn pop_front(&mut self) -> Option<QueuedLetter> {
        self.entries.pop_front()
    }

    pub fn front(&self) -> Option<&QueuedLetter> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedLetter> {
        self.entries.iter()
    }
}
