//! Word Hopper entry point
//!
//! Runs a headless session steered by a simple autopilot and prints the final
//! progress snapshot as JSON. Usage: `word-hopper [SETTINGS.json] [SECONDS]`

use word_hopper::Settings;
use word_hopper::consts::*;
use word_hopper::sim::{BoostKind, Movement, TickInput, World, tick};

/// Host frame time fed to the fixed-step loop (30 fps)
const FRAME_DT: f32 = 1.0 / 30.0;
const DEFAULT_SECONDS: u32 = 120;

/// Session holding the world plus host-side input state
struct Runner {
    world: World,
    accumulator: f32,
    input: TickInput,
}

impl Runner {
    fn new(settings: Settings) -> Self {
        Self {
            world: World::new(settings),
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let physics = self.world.physics();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.steer();
            tick(&mut self.world, &physics, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            for event in &self.world.events {
                log::debug!("{event:?}");
            }

            // Clear one-shot inputs after processing
            self.input.jump = false;
            self.input.buy = None;
        }
    }

    /// Autopilot: run right, hop when blocked or every so often, buy shields
    fn steer(&mut self) {
        let world = &self.world;
        let avatar = &world.avatar;
        self.input.movement = Some(Movement::Right);

        let blocked = avatar.body.vel.x == 0.0;
        self.input.jump = avatar.ground.is_grounded() && (blocked || world.time_ticks % 40 == 0);

        let shield_price = world.settings.prices.price(BoostKind::Shield);
        if avatar.inventory.shields == 0 && avatar.inventory.coins >= shield_price {
            self.input.buy = Some(BoostKind::Shield);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let seconds = match args.next().map(|s| s.parse::<u32>()) {
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            log::warn!("Bad duration ({e}), running {DEFAULT_SECONDS}s");
            DEFAULT_SECONDS
        }
        None => DEFAULT_SECONDS,
    };

    log::info!("Word Hopper (headless) starting, {seconds}s of play");
    let mut runner = Runner::new(settings);
    for _ in 0..seconds * 30 {
        runner.update(FRAME_DT);
    }

    match serde_json::to_string_pretty(&runner.world.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not encode snapshot: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web; the library is driven by the host page
}
