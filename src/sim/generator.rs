//! Procedural level content
//!
//! Pure placement functions. Each takes the level config and an RNG and
//! returns new entities; the world decides where they are stored.
//!
//! - `generate_next_platform`: bounded-retry platform placement with a
//!   clearance check against existing solids
//! - `maybe_place_hazards`: spike rows along the floor, all or nothing
//! - `place_collectible_for`: the next queued letter, or a coin once the
//!   queue is dry

use glam::Vec2;
use rand::Rng;

use super::level::{LevelConfig, Span};
use super::state::{Coin, Hazard, Letter, PlatformColor, Solid, SolidKind};
use super::vocab::LetterQueue;
use crate::consts::*;
use crate::{Rect, spans_overlap};

/// What a new platform carries
#[derive(Debug, Clone, PartialEq)]
pub enum Collectible {
    Letter(Letter),
    Coin(Coin),
}

#[inline]
fn sample<R: Rng + ?Sized>(rng: &mut R, span: Span) -> i32 {
    rng.random_range(span.min..=span.max)
}

/// Whether a candidate rectangle is too close to any existing solid
///
/// Solids whose centers are within `MIN_VERTICAL_SEPARATION` vertically must
/// keep `MIN_HORIZONTAL_CLEARANCE` on both sides. Vertically distant solids
/// may share x ranges.
pub fn crowds_existing(candidate: &Rect, existing: &[Solid]) -> bool {
    existing.iter().any(|solid| {
        let vertical_close =
            (candidate.center.y - solid.rect.center.y).abs() < MIN_VERTICAL_SEPARATION;
        vertical_close
            && spans_overlap(
                (candidate.left(), candidate.right()),
                (solid.rect.left(), solid.rect.right()),
                MIN_HORIZONTAL_CLEARANCE,
            )
    })
}

/// Try to place the next platform to the right of `cursor_x`
///
/// Draws up to `MAX_PLATFORM_ATTEMPTS` candidates from the level's shape
/// ranges. Returns `None` when every attempt crossed the generation limit or
/// crowded an existing solid; the caller leaves its cursor untouched.
pub fn generate_next_platform<R: Rng + ?Sized>(
    rng: &mut R,
    cursor_x: f32,
    level: &LevelConfig,
    existing: &[Solid],
) -> Option<Solid> {
    let limit = level.generation_limit();

    for _ in 0..MAX_PLATFORM_ATTEMPTS {
        let gap = sample(rng, level.shapes.gap) as f32;
        let width = sample(rng, level.shapes.width) as f32;
        let y = sample(rng, level.shapes.y) as f32;

        let left = cursor_x + gap;
        let right = left + width;
        if right > limit {
            continue;
        }

        let rect = Rect::from_span(left, right, y, PLATFORM_HEIGHT);
        if crowds_existing(&rect, existing) {
            continue;
        }

        let color = PlatformColor::DECORATIVE[rng.random_range(0..PlatformColor::DECORATIVE.len())];
        return Some(Solid {
            rect,
            kind: SolidKind::Platform,
            color,
        });
    }

    None
}

/// Lay a row of `count` hazards starting at `anchor_x`
///
/// The whole row is dropped if its far end would pass `end - HAZARD_ROW_MARGIN`;
/// single hazards past `end - HAZARD_SINGLE_MARGIN` are skipped.
pub fn place_hazard_row(anchor_x: f32, count: u32, level: &LevelConfig) -> Vec<Hazard> {
    let total_width = count as f32 * HAZARD_WIDTH;
    if anchor_x + total_width > level.end_x - HAZARD_ROW_MARGIN {
        return Vec::new();
    }

    let row_center = anchor_x + (total_width / 2.0).floor();
    let half = (count / 2) as i32;
    (0..count as i32)
        .map(|i| row_center + (i - half) as f32 * HAZARD_WIDTH)
        .filter(|&x| x <= level.end_x - HAZARD_SINGLE_MARGIN)
        .map(|x| Hazard {
            rect: Rect::new(x, FLOOR_CENTER_Y + HAZARD_HEIGHT, HAZARD_WIDTH, HAZARD_HEIGHT),
        })
        .collect()
}

/// Scatter a hazard row of random length at `anchor_x` on eligible levels
pub fn maybe_place_hazards<R: Rng + ?Sized>(
    rng: &mut R,
    anchor_x: f32,
    level: &LevelConfig,
) -> Vec<Hazard> {
    if !level.hazards {
        return Vec::new();
    }
    let count = rng.random_range(HAZARD_MIN_COUNT..=HAZARD_MAX_COUNT);
    place_hazard_row(anchor_x, count, level)
}

/// Roll for a hazard row behind a freshly generated platform
pub fn hazards_after_platform<R: Rng + ?Sized>(
    rng: &mut R,
    platform: &Solid,
    level: &LevelConfig,
) -> Vec<Hazard> {
    if !level.hazards || !rng.random_bool(HAZARD_PROBABILITY) {
        return Vec::new();
    }
    maybe_place_hazards(rng, platform.rect.right() + HAZARD_ANCHOR_OFFSET, level)
}

/// Put a collectible above a new platform
///
/// Letters come first, strictly in queue order, and sit left of center so
/// the avatar has to approach them. Coins appear only once the queue is
/// empty and may sit anywhere over the platform.
pub fn place_collectible_for<R: Rng + ?Sized>(
    rng: &mut R,
    platform: &Solid,
    queue: &mut LetterQueue,
) -> Collectible {
    let width = platform.rect.size.x;
    let y = platform.rect.center.y + COLLECTIBLE_LIFT;

    match queue.pop_front() {
        Some(next) => {
            let offset = rng.random_range(-width * 0.4..=-width * 0.1);
            Collectible::Letter(Letter {
                pos: Vec2::new(platform.rect.center.x + offset, y),
                letter: next.letter,
                word: next.word,
                collected: false,
            })
        }
        None => {
            let offset = rng.random_range(-width * 0.4..=width * 0.4);
            Collectible::Coin(Coin {
                pos: Vec2::new(platform.rect.center.x + offset, y),
                collected: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{LevelId, LevelRegistry};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn floor_and_start(level: &LevelConfig) -> Vec<Solid> {
        vec![
            Solid::floor(level.floor_rect()),
            Solid::start_platform(level.start_platform_rect()),
        ]
    }

    /// Run the generator the way the world does during a loading burst
    fn fill_level(seed: u64, level: &LevelConfig, steps: u32) -> Vec<Solid> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut solids = floor_and_start(level);
        let mut cursor = level.start_platform_rect().right();
        for _ in 0..steps {
            if let Some(platform) = generate_next_platform(&mut rng, cursor, level, &solids) {
                cursor = cursor.max(platform.rect.right());
                solids.push(platform);
            }
        }
        solids
    }

    #[test]
    fn test_platform_respects_shape_ranges() {
        let registry = LevelRegistry::standard();
        let level = &registry[LevelId(1)];
        let mut rng = Pcg32::seed_from_u64(3);
        let solids = floor_and_start(level);
        let cursor = level.start_platform_rect().right();

        let platform = generate_next_platform(&mut rng, cursor, level, &solids).unwrap();
        let gap = platform.rect.left() - cursor;
        assert!((150.0..=320.0).contains(&gap));
        assert!((60.0..=200.0).contains(&platform.rect.size.x));
        assert!((180.0..=550.0).contains(&platform.rect.center.y));
        assert_eq!(platform.rect.size.y, PLATFORM_HEIGHT);
        assert_eq!(platform.kind, SolidKind::Platform);
    }

    #[test]
    fn test_generation_fails_at_level_end() {
        let registry = LevelRegistry::standard();
        let level = &registry[LevelId(0)];
        let mut rng = Pcg32::seed_from_u64(11);
        // Not even the smallest gap + width fits before 4500
        let cursor = level.generation_limit() - 100.0;
        for _ in 0..20 {
            assert!(generate_next_platform(&mut rng, cursor, level, &[]).is_none());
        }
    }

    #[test]
    fn test_crowding_only_counts_vertically_close_solids() {
        let existing = vec![Solid::start_platform(Rect::new(100.0, 300.0, 100.0, 20.0))];
        // Same height, 5 units to the right: crowded
        assert!(crowds_existing(&Rect::new(205.0, 300.0, 100.0, 20.0), &existing));
        // Same height, 20 units to the right: clear
        assert!(!crowds_existing(&Rect::new(220.0, 300.0, 100.0, 20.0), &existing));
        // Same x range but 40 units higher: allowed
        assert!(!crowds_existing(&Rect::new(100.0, 340.0, 100.0, 20.0), &existing));
        // 39 units higher: crowded
        assert!(crowds_existing(&Rect::new(100.0, 339.0, 100.0, 20.0), &existing));
    }

    #[test]
    fn test_hazard_row_is_contiguous() {
        let registry = LevelRegistry::standard();
        let level = &registry[LevelId(3)];
        let hazards = place_hazard_row(21000.0, 4, level);
        assert_eq!(hazards.len(), 4);
        let xs: Vec<f32> = hazards.iter().map(|h| h.rect.center.x).collect();
        assert_eq!(xs, vec![21000.0, 21040.0, 21080.0, 21120.0]);
        assert!(hazards.iter().all(|h| h.rect.center.y == 60.0));
    }

    #[test]
    fn test_hazard_row_near_end_is_dropped_whole() {
        let registry = LevelRegistry::standard();
        let level = &registry[LevelId(3)];
        // 28000 - 100 = 27900; a 6-wide row from 27700 would end at 27940
        assert!(place_hazard_row(27700.0, 6, level).is_empty());
        // A 3-wide row from 27700 ends at 27820 and fits
        assert_eq!(place_hazard_row(27700.0, 3, level).len(), 3);
    }

    #[test]
    fn test_no_hazards_on_safe_levels() {
        let registry = LevelRegistry::standard();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..50 {
            assert!(maybe_place_hazards(&mut rng, 1000.0, &registry[LevelId(0)]).is_empty());
        }
    }

    #[test]
    fn test_hazard_count_in_range() {
        let registry = LevelRegistry::standard();
        let level = &registry[LevelId(4)];
        let mut rng = Pcg32::seed_from_u64(8);
        for _ in 0..50 {
            let n = maybe_place_hazards(&mut rng, 29000.0, level).len() as u32;
            assert!((HAZARD_MIN_COUNT..=HAZARD_MAX_COUNT).contains(&n));
        }
    }

    #[test]
    fn test_letters_then_coins() {
        let registry = LevelRegistry::standard();
        let level = &registry[LevelId(0)];
        let mut queue = LetterQueue::canonical(level);
        let mut rng = Pcg32::seed_from_u64(21);
        let platform = Solid::start_platform(Rect::new(1000.0, 300.0, 100.0, 20.0));

        let mut letters = Vec::new();
        for _ in 0..6 {
            match place_collectible_for(&mut rng, &platform, &mut queue) {
                Collectible::Letter(letter) => {
                    // Left-biased over the platform
                    assert!(letter.pos.x >= 960.0 && letter.pos.x <= 990.0);
                    assert_eq!(letter.pos.y, 330.0);
                    letters.push(letter.letter);
                }
                Collectible::Coin(_) => panic!("coin emitted while letters remain"),
            }
        }
        assert_eq!(letters.iter().collect::<String>(), "catdog");
        assert!(queue.is_empty());

        match place_collectible_for(&mut rng, &platform, &mut queue) {
            Collectible::Coin(coin) => {
                assert!(coin.pos.x >= 960.0 && coin.pos.x <= 1040.0);
                assert!(!coin.collected);
            }
            Collectible::Letter(_) => panic!("letter emitted from an empty queue"),
        }
    }

    proptest! {
        #[test]
        fn prop_platforms_stay_inside_generation_limit(seed in any::<u64>(), level_index in 0usize..5) {
            let registry = LevelRegistry::standard();
            let level = &registry[LevelId(level_index)];
            let solids = fill_level(seed, level, level.burst);
            for solid in solids.iter().filter(|s| s.kind == SolidKind::Platform) {
                prop_assert!(solid.rect.right() <= level.generation_limit());
                prop_assert!(solid.rect.left() > level.start_x);
            }
        }

        #[test]
        fn prop_close_solids_keep_clearance(seed in any::<u64>(), level_index in 0usize..5) {
            let registry = LevelRegistry::standard();
            let level = &registry[LevelId(level_index)];
            let solids = fill_level(seed, level, level.burst);
            for (i, a) in solids.iter().enumerate() {
                for b in &solids[i + 1..] {
                    if (a.rect.center.y - b.rect.center.y).abs() < MIN_VERTICAL_SEPARATION {
                        prop_assert!(!spans_overlap(
                            (a.rect.left(), a.rect.right()),
                            (b.rect.left(), b.rect.right()),
                            MIN_HORIZONTAL_CLEARANCE,
                        ));
                    }
                }
            }
        }

        #[test]
        fn prop_hazards_never_cross_level_end(anchor in 20000.0f32..28000.0, count in 3u32..=6) {
            let registry = LevelRegistry::standard();
            let level = &registry[LevelId(3)];
            for hazard in place_hazard_row(anchor, count, level) {
                prop_assert!(hazard.rect.center.x <= level.end_x - HAZARD_SINGLE_MARGIN);
            }
        }
    }
}
