//! World state and level lifecycle
//!
//! `World` owns everything that changes during a run: the live level session,
//! the avatar, vocabulary progress, the RNG and transient HUD notices. It is
//! mutated only from `tick` and from the level lifecycle methods below.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::generator::{self, Collectible};
use super::level::{LevelConfig, LevelId, LevelRegistry};
use super::physics::{AabbStepper, Body, Ground};
use super::progress::{BoostKind, CompletedWord, Inventory, Progress};
use super::vocab::{LetterQueue, Vocabulary};
use crate::consts::*;
use crate::{Rect, Settings};

/// Solid role: the floor is the only surface long falls are punished on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolidKind {
    Floor,
    Platform,
}

/// Display color of a solid (cosmetic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlatformColor {
    Slate,
    DarkGreen,
    Olive,
    DarkOrange,
    DarkCerulean,
    DarkRed,
    DarkViolet,
}

impl PlatformColor {
    /// Palette drawn from for generated platforms
    pub const DECORATIVE: [PlatformColor; 6] = [
        PlatformColor::DarkGreen,
        PlatformColor::Olive,
        PlatformColor::DarkOrange,
        PlatformColor::DarkCerulean,
        PlatformColor::DarkRed,
        PlatformColor::DarkViolet,
    ];
}

/// Immovable rectangle (floor or platform)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Solid {
    pub rect: Rect,
    pub kind: SolidKind,
    pub color: PlatformColor,
}

impl Solid {
    pub fn floor(rect: Rect) -> Self {
        Self {
            rect,
            kind: SolidKind::Floor,
            color: PlatformColor::Slate,
        }
    }

    pub fn start_platform(rect: Rect) -> Self {
        Self {
            rect,
            kind: SolidKind::Platform,
            color: PlatformColor::DarkGreen,
        }
    }
}

/// Spike on the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hazard {
    pub rect: Rect,
}

/// Letter token belonging to a vocabulary word
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Letter {
    pub pos: Vec2,
    pub letter: char,
    pub word: &'static str,
    pub collected: bool,
}

/// Currency token
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coin {
    pub pos: Vec2,
    pub collected: bool,
}

/// Resumable loading burst: one generation step per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadingTask {
    pub total: u32,
    pub done: u32,
}

impl LoadingTask {
    pub fn new(total: u32) -> Self {
        Self { total, done: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.done >= self.total
    }

    /// Completion percentage (0-100)
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f32 / self.total as f32 * 100.0
        }
    }
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Bulk generation spread over ticks; input is ignored
    Loading(LoadingTask),
    /// Normal play
    Running,
}

/// How a level is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnterMode {
    /// Forward transition: content is generated over the following ticks
    Advance,
    /// Death recovery: content is regenerated before this call returns
    Restart,
}

/// What killed the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeathCause {
    Fall,
    Hazard,
}

/// Everything that exists only for the current level
#[derive(Debug, Clone)]
pub struct LevelSession {
    pub level: LevelId,
    pub phase: Phase,
    pub solids: Vec<Solid>,
    pub hazards: Vec<Hazard>,
    pub letters: Vec<Letter>,
    pub coins: Vec<Coin>,
    /// Letters this level has yet to emit
    pub queue: LetterQueue,
    /// Rightmost platform edge generated so far
    pub max_spawn_x: f32,
}

impl LevelSession {
    /// Fresh session: floor, start platform, canonical queue, nothing else
    pub fn begin(config: &LevelConfig, phase: Phase) -> Self {
        let start = Solid::start_platform(config.start_platform_rect());
        Self {
            level: config.id,
            phase,
            solids: vec![Solid::floor(config.floor_rect()), start],
            hazards: Vec::new(),
            letters: Vec::new(),
            coins: Vec::new(),
            queue: LetterQueue::canonical(config),
            max_spawn_x: config.start_x.max(start.rect.right()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading(_))
    }
}

/// Highest point since the avatar last stood on something
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FallTracker {
    pub peak: Option<f32>,
}

impl FallTracker {
    /// Feed the avatar's height and support after a step
    ///
    /// Returns true for a lethal landing: touching the floor after dropping
    /// strictly more than `threshold` from the peak. Any landing clears the
    /// peak, so platforms absorb falls of any height.
    pub fn observe(&mut self, y: f32, ground: Ground, threshold: f32) -> bool {
        match ground {
            Ground::Airborne => {
                self.peak = Some(self.peak.map_or(y, |peak| peak.max(y)));
                false
            }
            Ground::Platform | Ground::Floor => {
                let lethal =
                    ground == Ground::Floor && self.peak.is_some_and(|peak| peak - y > threshold);
                self.peak = None;
                lethal
            }
        }
    }
}

/// Requested horizontal motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Heading {
    Left,
    Right,
    #[default]
    Idle,
}

/// The player character; persists across levels
#[derive(Debug, Clone, Serialize)]
pub struct Avatar {
    pub body: Body,
    /// Support reported by the last physics step
    pub ground: Ground,
    pub heading: Heading,
    pub fall: FallTracker,
    pub inventory: Inventory,
    /// Position at the end of the previous tick
    pub prev_pos: Vec2,
    /// Ticks of hazard immunity left after a shield save
    pub grace_ticks: u32,
}

impl Avatar {
    pub fn new(pos: Vec2) -> Self {
        Self {
            body: Body {
                pos,
                vel: Vec2::ZERO,
                size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            },
            ground: Ground::Airborne,
            heading: Heading::Idle,
            fall: FallTracker::default(),
            inventory: Inventory::default(),
            prev_pos: pos,
            grace_ticks: 0,
        }
    }

    /// Move to `pos` at rest; the inventory is kept
    pub fn relocate(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.vel = Vec2::ZERO;
        self.ground = Ground::Airborne;
        self.heading = Heading::Idle;
        self.fall = FallTracker::default();
        self.prev_pos = pos;
        self.grace_ticks = 0;
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }
}

/// Short-lived HUD message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub text: String,
    pub ticks_left: u32,
}

/// Death banner shown after a restart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeathBanner {
    pub cause: DeathCause,
    pub ticks_left: u32,
}

/// Things that happened during the last tick (for audio/HUD consumers)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    LevelEntered { level: LevelId, mode: EnterMode },
    LoadingFinished { level: LevelId },
    LetterCollected { word: &'static str, letter: char },
    CoinCollected,
    WordCompleted(CompletedWord),
    ShieldConsumed { cause: DeathCause },
    Died { cause: DeathCause },
    BoostPurchased { kind: BoostKind, price: u32 },
    PurchaseRejected { kind: BoostKind },
}

/// Serializable progress summary for the HUD
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub level: usize,
    /// Loading percentage while a burst is running
    pub loading: Option<f32>,
    pub score: u64,
    pub coins: u32,
    pub shields: u32,
    pub speed_boost_ticks: Option<u64>,
    pub jump_boost_ticks: Option<u64>,
    pub completed_words: Vec<CompletedWord>,
    pub collected_letters: String,
    pub letters_queued: usize,
    pub avatar: Vec2,
    pub camera_x: f32,
    pub time_ticks: u64,
}

/// The complete simulation
#[derive(Debug, Clone)]
pub struct World {
    pub settings: Settings,
    pub registry: LevelRegistry,
    pub vocab: Vocabulary,
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub session: LevelSession,
    pub avatar: Avatar,
    pub progress: Progress,
    pub camera_x: f32,
    pub notice: Option<Notice>,
    pub death: Option<DeathBanner>,
    /// Events of the most recent tick
    pub events: Vec<GameEvent>,
}

impl World {
    /// New run on the built-in campaign
    pub fn new(settings: Settings) -> Self {
        Self::with_registry(settings, LevelRegistry::standard())
    }

    /// New run on a custom (already validated) level table
    pub fn with_registry(settings: Settings, registry: LevelRegistry) -> Self {
        let vocab = Vocabulary::from_registry(&registry);
        let progress = Progress::new(&vocab);
        let first = &registry[registry.first()];
        let session = LevelSession::begin(first, Phase::Loading(LoadingTask::new(first.burst)));
        let avatar = Avatar::new(first.entry);
        log::info!("New run (seed {:#x}), loading {}", settings.seed, first.id);

        Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            registry,
            vocab,
            time_ticks: 0,
            session,
            avatar,
            progress,
            camera_x: 0.0,
            notice: None,
            death: None,
            events: Vec::new(),
        }
    }

    /// Full game restart: back to the first level with a new avatar
    ///
    /// The RNG keeps running, so the new run gets fresh geometry.
    pub fn reset(&mut self) {
        let mut fresh = Self::with_registry(self.settings.clone(), self.registry.clone());
        std::mem::swap(&mut fresh.rng, &mut self.rng);
        *self = fresh;
    }

    /// Configuration of the current level
    pub fn config(&self) -> &LevelConfig {
        &self.registry[self.session.level]
    }

    pub fn level(&self) -> LevelId {
        self.session.level
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Loading percentage, 100 once running
    pub fn loading_progress(&self) -> f32 {
        match self.session.phase {
            Phase::Loading(task) => task.percent(),
            Phase::Running => 100.0,
        }
    }

    /// Default physics for these settings
    pub fn physics(&self) -> AabbStepper {
        AabbStepper::new(self.settings.gravity)
    }

    /// Replace the level session and move the avatar to the level entry
    ///
    /// Runs as one step: entities are cleared and recreated before returning.
    /// `Advance` purges the departing level's completed words and leaves the
    /// new session loading; `Restart` also resets the level's word progress
    /// and regenerates the full burst synchronously.
    pub fn enter_level(&mut self, target: LevelId, mode: EnterMode) {
        let departing = self.session.level;
        self.progress.purge_completed(&self.vocab, departing);
        self.progress.reset_level(&self.vocab, target);
        self.progress.collected_letters.clear();

        let config = &self.registry[target];
        let burst = config.burst;
        let phase = match mode {
            EnterMode::Advance => Phase::Loading(LoadingTask::new(burst)),
            EnterMode::Restart => Phase::Running,
        };
        self.session = LevelSession::begin(config, phase);
        self.avatar.relocate(config.entry);

        if mode == EnterMode::Restart {
            for _ in 0..burst {
                self.spawn_world_elements();
            }
        }

        log::info!(
            "Entered {} ({:?}), {} solids, cursor at {}",
            target,
            mode,
            self.session.solids.len(),
            self.session.max_spawn_x
        );
        self.events.push(GameEvent::LevelEntered {
            level: target,
            mode,
        });
    }

    /// One generation step: a platform, maybe a hazard row, and a collectible
    ///
    /// Returns false when no platform fit; the cursor stays where it was.
    pub fn spawn_world_elements(&mut self) -> bool {
        let config = &self.registry[self.session.level];
        let session = &mut self.session;

        let Some(platform) = generator::generate_next_platform(
            &mut self.rng,
            session.max_spawn_x,
            config,
            &session.solids,
        ) else {
            log::debug!("{}: no platform fits after x={}", config.id, session.max_spawn_x);
            return false;
        };

        session.max_spawn_x = session.max_spawn_x.max(platform.rect.right());
        let hazards = generator::hazards_after_platform(&mut self.rng, &platform, config);
        session.hazards.extend(hazards);

        match generator::place_collectible_for(&mut self.rng, &platform, &mut session.queue) {
            Collectible::Letter(letter) => session.letters.push(letter),
            Collectible::Coin(coin) => session.coins.push(coin),
        }
        session.solids.push(platform);
        true
    }

    /// Generate one more step if the avatar is closing in on the content edge
    pub fn stream_ahead(&mut self) -> bool {
        let horizon =
            self.avatar.pos().x + self.settings.viewport_width + self.settings.spawn_buffer;
        if self.session.max_spawn_x >= horizon || !self.config().has_room_after(self.session.max_spawn_x)
        {
            return false;
        }
        self.spawn_world_elements()
    }

    /// Show a transient HUD message
    pub fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            ticks_left: self.settings.notice_ticks,
        });
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let inventory = &self.avatar.inventory;
        ProgressSnapshot {
            level: self.session.level.number(),
            loading: self.is_loading().then(|| self.loading_progress()),
            score: self.progress.score,
            coins: inventory.coins,
            shields: inventory.shields,
            speed_boost_ticks: inventory.remaining(BoostKind::Speed, self.time_ticks),
            jump_boost_ticks: inventory.remaining(BoostKind::Jump, self.time_ticks),
            completed_words: self.progress.completed.clone(),
            collected_letters: self.progress.collected_letters.iter().collect(),
            letters_queued: self.session.queue.len(),
            avatar: self.avatar.pos(),
            camera_x: self.camera_x,
            time_ticks: self.time_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(Settings::with_seed(1234))
    }

    #[test]
    fn test_new_world_starts_loading_level_one() {
        let world = world();
        assert_eq!(world.level(), LevelId(0));
        assert!(world.is_loading());
        assert_eq!(world.loading_progress(), 0.0);
        assert_eq!(world.session.solids.len(), 2);
        assert_eq!(world.session.max_spawn_x, 280.0);
        assert_eq!(world.session.queue.len(), 6);
        assert_eq!(world.avatar.pos(), Vec2::new(128.0, 230.0));
    }

    #[test]
    fn test_three_steps_emit_first_three_letters() {
        let mut world = world();
        let mut steps = 0;
        while world.session.letters.len() < 3 {
            world.spawn_world_elements();
            steps += 1;
            assert!(steps < 100, "generator never succeeded");
        }
        let emitted: Vec<(&str, char)> = world
            .session
            .letters
            .iter()
            .map(|l| (l.word, l.letter))
            .collect();
        assert_eq!(emitted, vec![("cat", 'c'), ("cat", 'a'), ("cat", 't')]);
        let queued: Vec<&str> = world.session.queue.iter().map(|q| q.word).collect();
        assert_eq!(queued, vec!["dog", "dog", "dog"]);
        assert!(world.session.coins.is_empty());
    }

    #[test]
    fn test_cursor_only_moves_forward() {
        let mut world = world();
        let mut last = world.session.max_spawn_x;
        for _ in 0..40 {
            let placed = world.spawn_world_elements();
            if placed {
                assert!(world.session.max_spawn_x >= last);
            } else {
                assert_eq!(world.session.max_spawn_x, last);
            }
            last = world.session.max_spawn_x;
        }
    }

    #[test]
    fn test_advance_purges_departing_words() {
        let mut world = world();
        world.progress.completed = vec![
            CompletedWord { word: "cat", translation: "кот" },
            CompletedWord { word: "dog", translation: "собака" },
        ];
        world.enter_level(LevelId(1), EnterMode::Advance);
        assert!(world.progress.completed.is_empty());
        assert_eq!(world.level(), LevelId(1));
        assert!(world.is_loading());
        assert_eq!(world.session.solids.len(), 2);
        assert_eq!(world.avatar.pos(), Vec2::new(5150.0, 300.0));
        assert_eq!(world.avatar.body.vel, Vec2::ZERO);
        assert_eq!(world.session.max_spawn_x, 5330.0);
    }

    #[test]
    fn test_restart_regenerates_synchronously() {
        let mut world = world();
        world.enter_level(LevelId(3), EnterMode::Advance);
        world.avatar.inventory.shields = 2;
        world.avatar.inventory.speed_until = Some(5000);

        world.session.queue.pop_front();
        world.enter_level(LevelId(3), EnterMode::Restart);

        assert!(!world.is_loading());
        assert!(world.session.solids.len() > 2);
        assert_eq!(world.avatar.pos(), Vec2::new(20150.0, 400.0));
        // Inventory survives
        assert_eq!(world.avatar.inventory.shields, 2);
        assert_eq!(world.avatar.inventory.speed_until, Some(5000));
        // The burst emitted letters from a full canonical queue
        let first = world.session.letters.first().map(|l| (l.word, l.letter));
        assert_eq!(first, Some(("math", 'm')));
    }

    #[test]
    fn test_fall_tracker_strict_threshold() {
        let mut tracker = FallTracker::default();
        assert!(!tracker.observe(554.0, Ground::Airborne, 490.0));
        assert!(!tracker.observe(64.0, Ground::Floor, 490.0));

        assert!(!tracker.observe(555.0, Ground::Airborne, 490.0));
        assert!(tracker.observe(64.0, Ground::Floor, 490.0));
    }

    #[test]
    fn test_fall_tracker_platforms_forgive() {
        let mut tracker = FallTracker::default();
        tracker.observe(2000.0, Ground::Airborne, 490.0);
        assert!(!tracker.observe(330.0, Ground::Platform, 490.0));
        assert_eq!(tracker.peak, None);
        // Stepping off the platform starts a new, short fall
        tracker.observe(330.0, Ground::Airborne, 490.0);
        assert!(!tracker.observe(64.0, Ground::Floor, 490.0));
    }

    #[test]
    fn test_fall_tracker_keeps_highest_point() {
        let mut tracker = FallTracker::default();
        tracker.observe(100.0, Ground::Airborne, 490.0);
        tracker.observe(700.0, Ground::Airborne, 490.0);
        tracker.observe(300.0, Ground::Airborne, 490.0);
        assert_eq!(tracker.peak, Some(700.0));
    }

    #[test]
    fn test_reset_recreates_avatar() {
        let mut world = world();
        world.avatar.inventory.coins = 12;
        world.enter_level(LevelId(2), EnterMode::Advance);
        world.reset();
        assert_eq!(world.level(), LevelId(0));
        assert_eq!(world.avatar.inventory.coins, 0);
        assert!(world.is_loading());
    }

    #[test]
    fn test_snapshot_reports_loading() {
        let world = world();
        let snapshot = world.snapshot();
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.loading, Some(0.0));
        assert_eq!(snapshot.letters_queued, 6);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"level\":1"));
    }
}
