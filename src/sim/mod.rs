//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (store insertion order)
//! - No rendering or network dependencies; the net layer consumes the
//!   event list this module produces

pub mod entities;
pub mod events;
pub mod store;
pub mod tick;
pub mod world;

pub use entities::{
    Ball, BonusBox, BonusType, Bullet, GamePhase, ObjectId, Paddle, Player, PlayerInfo, Tile,
    TileType,
};
pub use events::GameEvent;
pub use store::EntityStore;
pub use tick::{TickInput, tick};
pub use world::World;
