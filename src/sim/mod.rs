//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Entities stored in generation order
//! - No rendering or platform dependencies

pub mod generator;
pub mod level;
pub mod physics;
pub mod progress;
pub mod state;
pub mod tick;
pub mod vocab;

pub use level::{LevelConfig, LevelId, LevelRegistry, RegistryError};
pub use physics::{AabbStepper, Body, Ground, PhysicsStepper};
pub use progress::{BoostKind, CompletedWord, Inventory, Progress, PurchaseError};
pub use state::{DeathCause, EnterMode, GameEvent, Phase, ProgressSnapshot, World};
pub use tick::{Movement, TickInput, tick};
pub use vocab::{LetterQueue, Vocabulary};
