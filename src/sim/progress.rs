//! Progress tracking
//!
//! Per-word letter counts, the completed-words list, and the avatar's
//! inventory of coins, shields and timed boosts.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::level::LevelId;
use super::state::Letter;
use super::vocab::{Vocabulary, WordDef};
use crate::Settings;

/// Collection state of one word
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordProgress {
    /// Collected count per distinct letter
    pub counts: HashMap<char, u32>,
    /// Set once every letter reached its multiplicity; only a restart clears it
    pub completed: bool,
}

impl WordProgress {
    /// Fresh progress: every distinct letter at zero
    pub fn fresh(def: &WordDef) -> Self {
        Self {
            counts: def.distinct_letters().map(|c| (c, 0)).collect(),
            completed: false,
        }
    }

    pub fn count(&self, letter: char) -> u32 {
        self.counts.get(&letter).copied().unwrap_or(0)
    }

    /// Whether every letter of `def` has been collected often enough
    pub fn satisfies(&self, def: &WordDef) -> bool {
        def.distinct_letters()
            .all(|c| self.count(c) >= def.required(c))
    }
}

/// A finished word as shown on the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletedWord {
    pub word: &'static str,
    pub translation: &'static str,
}

/// Vocabulary progress of the current run
#[derive(Debug, Clone)]
pub struct Progress {
    pub words: HashMap<&'static str, WordProgress>,
    /// Completed words in completion order
    pub completed: Vec<CompletedWord>,
    /// Letters picked up in the current level, in pickup order
    pub collected_letters: Vec<char>,
    pub score: u64,
}

impl Progress {
    pub fn new(vocab: &Vocabulary) -> Self {
        Self {
            words: vocab
                .iter()
                .map(|def| (def.word, WordProgress::fresh(def)))
                .collect(),
            completed: Vec::new(),
            collected_letters: Vec::new(),
            score: 0,
        }
    }

    pub fn word(&self, word: &str) -> Option<&WordProgress> {
        self.words.get(word)
    }

    pub fn is_completed(&self, word: &str) -> bool {
        self.words.get(word).is_some_and(|p| p.completed)
    }

    /// Count a collected letter toward its word
    ///
    /// Counts never exceed the letter's multiplicity in the word, and a
    /// completed word ignores further letters. Returns whether the count
    /// changed.
    pub fn record_letter(&mut self, vocab: &Vocabulary, letter: &Letter) -> bool {
        let Some(def) = vocab.get(letter.word) else {
            return false;
        };
        let Some(progress) = self.words.get_mut(def.word) else {
            return false;
        };
        if progress.completed {
            return false;
        }

        let needed = def.required(letter.letter);
        let count = progress.counts.entry(letter.letter).or_insert(0);
        if *count < needed {
            *count += 1;
            true
        } else {
            false
        }
    }

    /// Mark every satisfied word of the active level as completed
    ///
    /// Returns the words that completed during this call.
    pub fn check_completions(&mut self, vocab: &Vocabulary, active: LevelId) -> Vec<CompletedWord> {
        let mut newly = Vec::new();
        for def in vocab.words_of(active) {
            let Some(progress) = self.words.get_mut(def.word) else {
                continue;
            };
            if progress.completed || !progress.satisfies(def) {
                continue;
            }

            progress.completed = true;
            let entry = CompletedWord {
                word: def.word,
                translation: def.translation,
            };
            if !self.completed.iter().any(|c| c.word == def.word) {
                self.completed.push(entry);
            }
            newly.push(entry);
        }
        newly
    }

    /// Drop a level's words from the completed list
    pub fn purge_completed(&mut self, vocab: &Vocabulary, level: LevelId) {
        self.completed.retain(|c| {
            vocab
                .get(c.word)
                .is_none_or(|def| def.level != level)
        });
    }

    /// Put a level's words back to zero progress
    pub fn reset_level(&mut self, vocab: &Vocabulary, level: LevelId) {
        for def in vocab.words_of(level) {
            self.words.insert(def.word, WordProgress::fresh(def));
        }
    }
}

/// Things the shop sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoostKind {
    /// Faster horizontal movement for a while
    Speed,
    /// Higher jumps for a while
    Jump,
    /// One lethal event ignored
    Shield,
}

impl fmt::Display for BoostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoostKind::Speed => "speed boost",
            BoostKind::Jump => "jump boost",
            BoostKind::Shield => "shield",
        })
    }
}

/// Rejected purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("not enough coins for a {kind}: costs {price}, have {balance}")]
    InsufficientFunds {
        kind: BoostKind,
        price: u32,
        balance: u32,
    },
}

/// Completed purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    pub kind: BoostKind,
    pub price: u32,
    /// Absolute expiry tick of a timed boost
    pub expires_at: Option<u64>,
    /// Shield charges held after the purchase
    pub shields: u32,
}

impl fmt::Display for Purchase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BoostKind::Shield => write!(f, "Bought a shield! Shields: {}", self.shields),
            kind => write!(f, "Bought a {kind}!"),
        }
    }
}

/// Coins, shields and timed boosts carried by the avatar
///
/// Survives level transitions and restarts; only a full reset clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub coins: u32,
    pub shields: u32,
    pub speed_until: Option<u64>,
    pub jump_until: Option<u64>,
}

impl Inventory {
    pub fn speed_active(&self) -> bool {
        self.speed_until.is_some()
    }

    pub fn jump_active(&self) -> bool {
        self.jump_until.is_some()
    }

    /// Ticks left on a timed boost
    pub fn remaining(&self, kind: BoostKind, now: u64) -> Option<u64> {
        let until = match kind {
            BoostKind::Speed => self.speed_until,
            BoostKind::Jump => self.jump_until,
            BoostKind::Shield => None,
        };
        until.map(|t| t.saturating_sub(now))
    }

    /// Clear timed boosts whose expiry tick has passed
    pub fn expire(&mut self, now: u64) {
        if self.speed_until.is_some_and(|t| now > t) {
            self.speed_until = None;
        }
        if self.jump_until.is_some_and(|t| now > t) {
            self.jump_until = None;
        }
    }

    /// Spend one shield charge if any is held
    pub fn consume_shield(&mut self) -> bool {
        if self.shields > 0 {
            self.shields -= 1;
            true
        } else {
            false
        }
    }

    /// Buy a boost: debit the price and apply the effect, or change nothing
    pub fn buy(
        &mut self,
        kind: BoostKind,
        now: u64,
        settings: &Settings,
    ) -> Result<Purchase, PurchaseError> {
        let price = settings.prices.price(kind);
        if self.coins < price {
            return Err(PurchaseError::InsufficientFunds {
                kind,
                price,
                balance: self.coins,
            });
        }

        self.coins -= price;
        let expires_at = match kind {
            BoostKind::Shield => {
                self.shields += 1;
                None
            }
            BoostKind::Speed => {
                let until = now + settings.boost_duration_ticks();
                self.speed_until = Some(until);
                Some(until)
            }
            BoostKind::Jump => {
                let until = now + settings.boost_duration_ticks();
                self.jump_until = Some(until);
                Some(until)
            }
        };

        Ok(Purchase {
            kind,
            price,
            expires_at,
            shields: self.shields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelRegistry;
    use glam::Vec2;

    fn letter(word: &'static str, c: char) -> Letter {
        Letter {
            pos: Vec2::ZERO,
            letter: c,
            word,
            collected: true,
        }
    }

    fn setup() -> (Vocabulary, Progress) {
        let vocab = Vocabulary::from_registry(&LevelRegistry::standard());
        let progress = Progress::new(&vocab);
        (vocab, progress)
    }

    #[test]
    fn test_cat_completes_in_any_order() {
        let (vocab, mut progress) = setup();
        for c in ['t', 'c'] {
            progress.record_letter(&vocab, &letter("cat", c));
            assert!(progress.check_completions(&vocab, LevelId(0)).is_empty());
        }
        progress.record_letter(&vocab, &letter("cat", 'a'));
        let done = progress.check_completions(&vocab, LevelId(0));
        assert_eq!(
            done,
            vec![CompletedWord {
                word: "cat",
                translation: "кот"
            }]
        );
        assert!(progress.is_completed("cat"));
        assert_eq!(progress.completed.len(), 1);

        // Idempotent
        assert!(progress.check_completions(&vocab, LevelId(0)).is_empty());
        assert_eq!(progress.completed.len(), 1);
    }

    #[test]
    fn test_repeated_letters_need_full_multiplicity() {
        let (vocab, mut progress) = setup();
        for c in ['f', 'o', 'd'] {
            progress.record_letter(&vocab, &letter("food", c));
        }
        assert!(progress.check_completions(&vocab, LevelId(2)).is_empty());
        progress.record_letter(&vocab, &letter("food", 'o'));
        assert_eq!(progress.check_completions(&vocab, LevelId(2)).len(), 1);
    }

    #[test]
    fn test_counts_cap_at_multiplicity() {
        let (vocab, mut progress) = setup();
        assert!(progress.record_letter(&vocab, &letter("dog", 'd')));
        assert!(!progress.record_letter(&vocab, &letter("dog", 'd')));
        assert_eq!(progress.word("dog").unwrap().count('d'), 1);
    }

    #[test]
    fn test_completed_word_ignores_letters() {
        let (vocab, mut progress) = setup();
        for c in ['c', 'a', 't'] {
            progress.record_letter(&vocab, &letter("cat", c));
        }
        progress.check_completions(&vocab, LevelId(0));
        assert!(!progress.record_letter(&vocab, &letter("cat", 'c')));
    }

    #[test]
    fn test_only_active_level_words_complete() {
        let (vocab, mut progress) = setup();
        for c in ['c', 'a', 't'] {
            progress.record_letter(&vocab, &letter("cat", c));
        }
        assert!(progress.check_completions(&vocab, LevelId(1)).is_empty());
        assert!(!progress.is_completed("cat"));
    }

    #[test]
    fn test_purge_removes_only_that_level() {
        let (vocab, mut progress) = setup();
        progress.completed = vec![
            CompletedWord { word: "cat", translation: "кот" },
            CompletedWord { word: "dog", translation: "собака" },
            CompletedWord { word: "mother", translation: "мама" },
        ];
        progress.purge_completed(&vocab, LevelId(0));
        assert_eq!(progress.completed.len(), 1);
        assert_eq!(progress.completed[0].word, "mother");
    }

    #[test]
    fn test_reset_level_zeroes_counts() {
        let (vocab, mut progress) = setup();
        for c in ['s', 'o', 'f', 'a'] {
            progress.record_letter(&vocab, &letter("sofa", c));
        }
        progress.record_letter(&vocab, &letter("cat", 'c'));
        progress.check_completions(&vocab, LevelId(4));
        progress.reset_level(&vocab, LevelId(4));

        let sofa = progress.word("sofa").unwrap();
        assert!(!sofa.completed);
        assert!(sofa.counts.values().all(|&n| n == 0));
        // Other levels untouched
        assert_eq!(progress.word("cat").unwrap().count('c'), 1);
    }

    #[test]
    fn test_shield_purchase_rejected_without_funds() {
        let settings = Settings::default();
        let mut inventory = Inventory {
            coins: 3,
            ..Default::default()
        };
        let err = inventory.buy(BoostKind::Shield, 0, &settings).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::InsufficientFunds {
                kind: BoostKind::Shield,
                price: 5,
                balance: 3
            }
        );
        assert_eq!(inventory.coins, 3);
        assert_eq!(inventory.shields, 0);
    }

    #[test]
    fn test_timed_boost_expires() {
        let settings = Settings::default();
        let mut inventory = Inventory {
            coins: 10,
            ..Default::default()
        };
        let purchase = inventory.buy(BoostKind::Speed, 100, &settings).unwrap();
        assert_eq!(purchase.expires_at, Some(1000));
        assert_eq!(inventory.coins, 8);
        assert!(inventory.speed_active());
        assert_eq!(inventory.remaining(BoostKind::Speed, 400), Some(600));

        inventory.expire(1000);
        assert!(inventory.speed_active());
        inventory.expire(1001);
        assert!(!inventory.speed_active());
    }

    #[test]
    fn test_shield_stacks_and_consumes() {
        let settings = Settings::default();
        let mut inventory = Inventory {
            coins: 10,
            ..Default::default()
        };
        inventory.buy(BoostKind::Shield, 0, &settings).unwrap();
        let purchase = inventory.buy(BoostKind::Shield, 0, &settings).unwrap();
        assert_eq!(purchase.shields, 2);
        assert_eq!(purchase.to_string(), "Bought a shield! Shields: 2");
        assert_eq!(inventory.coins, 0);

        assert!(inventory.consume_shield());
        assert!(inventory.consume_shield());
        assert!(!inventory.consume_shield());
    }
}
