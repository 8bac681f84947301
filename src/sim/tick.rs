//! Fixed timestep simulation tick
//!
//! Advances the world deterministically: same seed + same inputs = same run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{Ground, PhysicsStepper};
use super::progress::BoostKind;
use super::state::{DeathBanner, DeathCause, EnterMode, GameEvent, Hazard, Heading, Phase, World};
use crate::consts::*;
use crate::distance_sq;

/// Hazard immunity after a shield absorbs a spike hit
const SHIELD_GRACE_TICKS: u32 = 30;

/// Horizontal input edge (key pressed or released)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Movement {
    Left,
    Right,
    Stop,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Change of heading; `None` keeps the current one
    pub movement: Option<Movement>,
    /// Jump (only honored while grounded)
    pub jump: bool,
    /// Shop purchase
    pub buy: Option<BoostKind>,
}

/// Advance the world by one fixed timestep
pub fn tick<P: PhysicsStepper + ?Sized>(world: &mut World, physics: &P, input: &TickInput, dt: f32) {
    world.events.clear();
    world.time_ticks += 1;
    decay_timers(world);

    // Loading: one generation step per tick, input ignored
    if let Phase::Loading(mut task) = world.session.phase {
        if !task.is_finished() {
            world.spawn_world_elements();
            task.done += 1;
        }
        if task.is_finished() {
            let level = world.level();
            log::info!("{} loaded, {} solids", level, world.session.solids.len());
            world.session.phase = Phase::Running;
            world.events.push(GameEvent::LoadingFinished { level });
        } else {
            world.session.phase = Phase::Loading(task);
        }
        return;
    }

    apply_input(world, input);

    let pos = world.avatar.pos();
    let config = world.config();
    let exit_to = config.next.filter(|_| config.exit_reached(pos));
    let fall_death = config.fall_death;
    let hazards = config.hazards;

    if let Some(next) = exit_to {
        world.enter_level(next, EnterMode::Advance);
        return;
    }

    if fall_death {
        let threshold = world.settings.fall_death_threshold();
        let avatar = &mut world.avatar;
        if avatar.fall.observe(pos.y, avatar.ground, threshold) && lethal(world, DeathCause::Fall) {
            return;
        }
    }

    if hazards {
        if world.avatar.grace_ticks > 0 {
            world.avatar.grace_ticks -= 1;
        } else if touching_hazard(&world.session.hazards, pos)
            && lethal(world, DeathCause::Hazard)
        {
            return;
        }
    }

    // Camera eases toward centering the avatar
    let viewport = world.settings.viewport_width;
    let camera_max = world.config().camera_max(viewport);
    let target = (pos.x - viewport / 2.0).clamp(0.0, camera_max);
    world.camera_x += (target - world.camera_x) * world.settings.camera_smoothing;

    let x = world.avatar.body.pos.x;
    let clamped = world.config().clamp_x(x);
    if clamped != x {
        world.avatar.body.pos.x = clamped;
        world.avatar.body.vel.x = 0.0;
    }

    world.avatar.ground = physics.step(&mut world.avatar.body, &world.session.solids, dt);

    let moved = (world.avatar.pos() - world.avatar.prev_pos).abs().max_element() > MOVE_EPSILON;
    if moved {
        collect_pickups(world);
    }
    world.avatar.prev_pos = world.avatar.pos();

    world.stream_ahead();
}

fn decay_timers(world: &mut World) {
    if let Some(notice) = world.notice.as_mut() {
        notice.ticks_left = notice.ticks_left.saturating_sub(1);
    }
    if world.notice.as_ref().is_some_and(|n| n.ticks_left == 0) {
        world.notice = None;
    }

    if let Some(banner) = world.death.as_mut() {
        banner.ticks_left = banner.ticks_left.saturating_sub(1);
    }
    if world.death.is_some_and(|b| b.ticks_left == 0) {
        world.death = None;
    }

    world.avatar.inventory.expire(world.time_ticks);
}

fn apply_input(world: &mut World, input: &TickInput) {
    if let Some(kind) = input.buy {
        match world.avatar.inventory.buy(kind, world.time_ticks, &world.settings) {
            Ok(purchase) => {
                log::info!("{purchase} ({} coins left)", world.avatar.inventory.coins);
                world.notify(purchase.to_string());
                world.events.push(GameEvent::BoostPurchased {
                    kind,
                    price: purchase.price,
                });
            }
            Err(err) => {
                log::info!("Purchase rejected: {err}");
                world.notify("Not enough coins!");
                world.events.push(GameEvent::PurchaseRejected { kind });
            }
        }
    }

    let settings = &world.settings;
    let avatar = &mut world.avatar;

    if let Some(movement) = input.movement {
        avatar.heading = match movement {
            Movement::Left => Heading::Left,
            Movement::Right => Heading::Right,
            Movement::Stop => Heading::Idle,
        };
    }

    let mut speed = settings.move_speed;
    if avatar.inventory.speed_active() {
        speed *= settings.speed_multiplier;
    }
    avatar.body.vel.x = match avatar.heading {
        Heading::Left => -speed,
        Heading::Right => speed,
        Heading::Idle => 0.0,
    };

    if input.jump && avatar.ground.is_grounded() {
        let mut jump = settings.jump_speed;
        if avatar.inventory.jump_active() {
            jump *= settings.jump_multiplier;
        }
        avatar.body.vel.y = jump;
        avatar.ground = Ground::Airborne;
    }
}

/// Whether the avatar center is inside the lethal radius of any hazard
fn touching_hazard(hazards: &[Hazard], pos: Vec2) -> bool {
    hazards.iter().any(|hazard| {
        let center = hazard.rect.center;
        (center.x - pos.x).abs() <= HAZARD_PREFILTER_X
            && distance_sq(center, pos) < HAZARD_LETHAL_RADIUS * HAZARD_LETHAL_RADIUS
    })
}

/// Resolve a lethal event; returns true if the level was restarted
fn lethal(world: &mut World, cause: DeathCause) -> bool {
    if world.avatar.inventory.consume_shield() {
        log::info!(
            "Shield absorbed {:?}, {} left",
            cause,
            world.avatar.inventory.shields
        );
        let text = match cause {
            DeathCause::Fall => "Shield saved you from the fall!",
            DeathCause::Hazard => "Shield saved you from the spikes!",
        };
        world.notify(text);
        if cause == DeathCause::Hazard {
            let avatar = &mut world.avatar;
            avatar.body.vel = Vec2::new(0.0, world.settings.jump_speed);
            avatar.heading = Heading::Idle;
            avatar.ground = Ground::Airborne;
            avatar.grace_ticks = SHIELD_GRACE_TICKS;
        }
        world.events.push(GameEvent::ShieldConsumed { cause });
        return false;
    }

    let level = world.level();
    log::info!("Died ({:?}) on {}, restarting", cause, level);
    world.events.push(GameEvent::Died { cause });
    world.enter_level(level, EnterMode::Restart);
    world.death = Some(DeathBanner {
        cause,
        ticks_left: world.settings.notice_ticks,
    });
    true
}

fn collect_pickups(world: &mut World) {
    let body = world.avatar.body;
    let reachable = |item: Vec2| {
        (item.x - body.pos.x).abs() <= PICKUP_PREFILTER
            && (item.y - body.pos.y).abs() <= PICKUP_PREFILTER
            && distance_sq(item, body.pos) < PICKUP_RADIUS * PICKUP_RADIUS
            && body.top() > item.y - COLLECTIBLE_HALF_HEIGHT
    };

    for coin in world.session.coins.iter_mut().filter(|c| !c.collected) {
        if reachable(coin.pos) {
            coin.collected = true;
            world.avatar.inventory.coins += 1;
            world.progress.score += COIN_SCORE;
            world.events.push(GameEvent::CoinCollected);
        }
    }

    let mut picked = false;
    for letter in world.session.letters.iter_mut().filter(|l| !l.collected) {
        if !reachable(letter.pos) {
            continue;
        }
        letter.collected = true;
        world.progress.collected_letters.push(letter.letter);
        world.progress.score += LETTER_SCORE;
        world.progress.record_letter(&world.vocab, letter);
        log::debug!("Picked up '{}' of {}", letter.letter, letter.word);
        world.events.push(GameEvent::LetterCollected {
            word: letter.word,
            letter: letter.letter,
        });
        picked = true;
    }

    if picked {
        let level = world.level();
        for done in world.progress.check_completions(&world.vocab, level) {
            log::info!("Completed \"{}\" ({})", done.word, done.translation);
            world.notify(format!("{} = {}", done.word, done.translation));
            world.events.push(GameEvent::WordCompleted(done));
        }
    }
}
