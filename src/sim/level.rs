//! Level registry
//!
//! Static per-level data: spatial bounds, floor and start platform, platform
//! shape ranges, vocabulary, hazard/pit eligibility and the transition graph.
//! The table is validated once when the registry is built; after that every
//! `LevelId` handed out by the registry indexes it safely.

use std::collections::HashSet;
use std::fmt;
use std::ops::Index;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Rect;
use crate::consts::*;

/// Index of a level in the registry (0-based; players see `number()`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(pub usize);

impl LevelId {
    pub const FIRST: LevelId = LevelId(0);

    /// 1-based level number for display
    pub fn number(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {}", self.number())
    }
}

/// Inclusive integer range sampled uniformly by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub min: i32,
    pub max: i32,
}

impl Span {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Platform shape parameter regime of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeRanges {
    /// Horizontal gap from the generation cursor to the platform's left edge
    pub gap: Span,
    pub width: Span,
    /// Platform center height
    pub y: Span,
}

/// The avatar leaves a level by falling through the gap at its end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitTrigger {
    pub min_x: f32,
    pub below_y: f32,
}

/// A vocabulary word and its translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpec {
    pub word: &'static str,
    pub translation: &'static str,
}

/// Immutable configuration of one level
#[derive(Debug, Clone)]
pub struct LevelConfig {
    pub id: LevelId,
    pub start_x: f32,
    pub end_x: f32,
    /// Platforms must end at or before `end_x - generation_margin`
    pub generation_margin: f32,
    /// Horizontal extent of the floor
    pub floor_left: f32,
    pub floor_right: f32,
    /// Center height of the start platform
    pub start_platform_y: f32,
    /// Where the avatar appears on entry and restart
    pub entry: Vec2,
    pub shapes: ShapeRanges,
    /// Generation steps run on entry (loading burst)
    pub burst: u32,
    /// Long drops onto the floor are lethal
    pub fall_death: bool,
    /// Spike rows are scattered along the floor
    pub hazards: bool,
    pub exit: Option<ExitTrigger>,
    pub next: Option<LevelId>,
    /// Horizontal clamp for the avatar
    pub min_x: f32,
    pub max_x: Option<f32>,
    /// Right edge the camera may show
    pub camera_limit: f32,
    pub words: &'static [WordSpec],
}

impl LevelConfig {
    /// Rightmost edge a generated platform may reach
    pub fn generation_limit(&self) -> f32 {
        self.end_x - self.generation_margin
    }

    pub fn floor_rect(&self) -> Rect {
        Rect::from_span(self.floor_left, self.floor_right, FLOOR_CENTER_Y, FLOOR_HEIGHT)
    }

    pub fn start_platform_rect(&self) -> Rect {
        Rect::new(
            self.start_x + START_PLATFORM_OFFSET,
            self.start_platform_y,
            START_PLATFORM_WIDTH,
            PLATFORM_HEIGHT,
        )
    }

    /// Whether the avatar at `pos` has dropped out through the level's end
    pub fn exit_reached(&self, pos: Vec2) -> bool {
        self.exit
            .is_some_and(|exit| pos.x >= exit.min_x && pos.y < exit.below_y)
    }

    /// Clamp an x coordinate to the level's walkable range
    pub fn clamp_x(&self, x: f32) -> f32 {
        let x = x.max(self.min_x);
        match self.max_x {
            Some(max) => x.min(max),
            None => x,
        }
    }

    /// Maximum camera offset for a viewport of the given width
    pub fn camera_max(&self, viewport_width: f32) -> f32 {
        (self.camera_limit - viewport_width).max(0.0)
    }

    /// Whether a word belongs to this level's vocabulary
    pub fn owns_word(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.word == word)
    }

    /// Whether there is room past `cursor_x` for even the smallest platform
    pub fn has_room_after(&self, cursor_x: f32) -> bool {
        cursor_x + (self.shapes.gap.min + self.shapes.width.min) as f32 <= self.generation_limit()
    }
}

/// Problems found while validating a level table
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("level table is empty")]
    Empty,

    #[error("{0} is stored at the wrong index")]
    MisplacedId(LevelId),

    #[error("{0}: start {1} is not left of end {2}")]
    InvertedBounds(LevelId, f32, f32),

    #[error("{0}: {1} range is inverted or non-positive")]
    BadRange(LevelId, &'static str),

    #[error("{0}: next level {1} does not exist")]
    UnknownNext(LevelId, LevelId),

    #[error("{0}: entry point lies outside the level")]
    EntryOutside(LevelId),

    #[error("{0}: start platform lies outside the generation limit")]
    StartPlatformOutside(LevelId),

    #[error("{0}: word {1:?} has no letters")]
    EmptyWord(LevelId, &'static str),

    #[error("word {0:?} is declared by more than one level")]
    DuplicateWord(&'static str),
}

/// Validated, immutable table of levels
#[derive(Debug, Clone)]
pub struct LevelRegistry {
    levels: Vec<LevelConfig>,
}

impl LevelRegistry {
    /// Validate and wrap a level table
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, RegistryError> {
        if levels.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen_words = HashSet::new();
        for (index, level) in levels.iter().enumerate() {
            let id = level.id;
            if id.0 != index {
                return Err(RegistryError::MisplacedId(id));
            }
            if level.start_x >= level.end_x {
                return Err(RegistryError::InvertedBounds(id, level.start_x, level.end_x));
            }
            if level.floor_left >= level.floor_right {
                return Err(RegistryError::BadRange(id, "floor"));
            }

            let shapes = &level.shapes;
            for (name, span) in [("gap", shapes.gap), ("width", shapes.width), ("y", shapes.y)] {
                if span.min > span.max || span.min <= 0 {
                    return Err(RegistryError::BadRange(id, name));
                }
            }

            if let Some(next) = level.next {
                if next.0 >= levels.len() {
                    return Err(RegistryError::UnknownNext(id, next));
                }
            }

            if level.entry.x < level.start_x || level.entry.x > level.end_x {
                return Err(RegistryError::EntryOutside(id));
            }
            if level.start_platform_rect().right() > level.generation_limit() {
                return Err(RegistryError::StartPlatformOutside(id));
            }

            for spec in level.words {
                if spec.word.is_empty() {
                    return Err(RegistryError::EmptyWord(id, spec.word));
                }
                if !seen_words.insert(spec.word) {
                    return Err(RegistryError::DuplicateWord(spec.word));
                }
            }
        }

        Ok(Self { levels })
    }

    /// The built-in five-level campaign
    pub fn standard() -> Self {
        Self::new(standard_levels()).expect("built-in level table is valid")
    }

    pub fn get(&self, id: LevelId) -> Option<&LevelConfig> {
        self.levels.get(id.0)
    }

    pub fn first(&self) -> LevelId {
        LevelId::FIRST
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelConfig> {
        self.levels.iter()
    }

    /// Level that declares `word`
    pub fn level_of_word(&self, word: &str) -> Option<LevelId> {
        self.levels
            .iter()
            .find(|level| level.owns_word(word))
            .map(|level| level.id)
    }
}

impl Index<LevelId> for LevelRegistry {
    type Output = LevelConfig;

    fn index(&self, id: LevelId) -> &LevelConfig {
        &self.levels[id.0]
    }
}

const WORLD_END: f32 = 35000.0;

const LEVEL_1_WORDS: &[WordSpec] = &[
    WordSpec { word: "cat", translation: "кот" },
    WordSpec { word: "dog", translation: "собака" },
];

const LEVEL_2_WORDS: &[WordSpec] = &[
    WordSpec { word: "mother", translation: "мама" },
    WordSpec { word: "father", translation: "папа" },
    WordSpec { word: "brother", translation: "брат" },
];

const LEVEL_3_WORDS: &[WordSpec] = &[
    WordSpec { word: "food", translation: "еда" },
    WordSpec { word: "pizza", translation: "пицца" },
    WordSpec { word: "bread", translation: "хлеб" },
];

const LEVEL_4_WORDS: &[WordSpec] = &[
    WordSpec { word: "math", translation: "математика" },
    WordSpec { word: "physics", translation: "физика" },
    WordSpec { word: "chemistry", translation: "химия" },
];

const LEVEL_5_WORDS: &[WordSpec] = &[
    WordSpec { word: "sofa", translation: "диван" },
    WordSpec { word: "table", translation: "стол" },
    WordSpec { word: "chair", translation: "стул" },
];

/// Shape regime shared by the later levels
const LATE_SHAPES: ShapeRanges = ShapeRanges {
    gap: Span::new(120, 280),
    width: Span::new(80, 220),
    y: Span::new(300, 600),
};

/// Levels 3-5 differ only in position, hazards and vocabulary
fn late_level(
    index: usize,
    start_x: f32,
    end_x: f32,
    hazards: bool,
    words: &'static [WordSpec],
    last: bool,
) -> LevelConfig {
    LevelConfig {
        id: LevelId(index),
        start_x,
        end_x,
        generation_margin: 0.0,
        floor_left: start_x,
        floor_right: end_x,
        start_platform_y: 400.0,
        entry: Vec2::new(start_x + 100.0, 400.0),
        shapes: LATE_SHAPES,
        burst: 50,
        fall_death: true,
        hazards,
        exit: (!last).then_some(ExitTrigger {
            min_x: end_x - 100.0,
            below_y: -50.0,
        }),
        next: (!last).then_some(LevelId(index + 1)),
        min_x: start_x,
        max_x: Some(WORLD_END),
        camera_limit: WORLD_END,
        words,
    }
}

/// The campaign table
pub fn standard_levels() -> Vec<LevelConfig> {
    vec![
        LevelConfig {
            id: LevelId(0),
            start_x: 0.0,
            end_x: 5000.0,
            generation_margin: 500.0,
            // Floor stops short of the end so the avatar drops into level 2
            floor_left: 0.0,
            floor_right: 4500.0,
            start_platform_y: 180.0,
            entry: Vec2::new(128.0, 230.0),
            shapes: ShapeRanges {
                gap: Span::new(100, 260),
                width: Span::new(60, 250),
                y: Span::new(120, 480),
            },
            burst: 40,
            fall_death: false,
            hazards: false,
            exit: Some(ExitTrigger {
                min_x: 4500.0,
                below_y: -10.0,
            }),
            next: Some(LevelId(1)),
            min_x: 0.0,
            max_x: None,
            camera_limit: 5000.0,
            words: LEVEL_1_WORDS,
        },
        LevelConfig {
            id: LevelId(1),
            start_x: 5050.0,
            end_x: 13000.0,
            generation_margin: 0.0,
            floor_left: 5050.0,
            floor_right: 13000.0,
            start_platform_y: 300.0,
            entry: Vec2::new(5150.0, 300.0),
            shapes: ShapeRanges {
                gap: Span::new(150, 320),
                width: Span::new(60, 200),
                y: Span::new(180, 550),
            },
            burst: 60,
            fall_death: false,
            hazards: false,
            exit: Some(ExitTrigger {
                min_x: 12900.0,
                below_y: -50.0,
            }),
            next: Some(LevelId(2)),
            min_x: 5050.0,
            max_x: None,
            camera_limit: WORLD_END,
            words: LEVEL_2_WORDS,
        },
        late_level(2, 13050.0, 20000.0, false, LEVEL_3_WORDS, false),
        late_level(3, 20050.0, 28000.0, true, LEVEL_4_WORDS, false),
        late_level(4, 28050.0, WORLD_END, true, LEVEL_5_WORDS, true),
    ]
}
