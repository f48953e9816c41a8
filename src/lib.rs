//! netbrick - a two-player networked breakout core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity store, physics, scoring)
//! - `net`: Wire protocol codec, peer synchronization, transport contract
//! - `geometry`: Axis-aligned rectangle primitives shared by both
//! - `board`: Board-layout descriptor and generation
//! - `session`: Tick-loop pump tying simulation and network together
//!
//! Rendering, audio, and menu navigation are external collaborators; they
//! consume read-only snapshots of the entity store and never mutate it.

pub mod board;
pub mod geometry;
pub mod net;
pub mod session;
pub mod sim;

pub use board::BoardLayout;
pub use geometry::Rect;
pub use session::Session;
pub use sim::{EntityStore, GameEvent, Player, TickInput, World};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default board dimensions (logical pixels)
    pub const BOARD_WIDTH: f32 = 1280.0;
    pub const BOARD_HEIGHT: f32 = 720.0;

    /// Tile dimensions
    pub const TILE_WIDTH: f32 = 60.0;
    pub const TILE_HEIGHT: f32 = 20.0;
    /// Hits needed to destroy a Hard tile (Regular takes one)
    pub const HARD_TILE_HITS: u32 = 5;

    /// Paddle dimensions; the paddle sits near the bottom edge of its
    /// owner's own viewport
    pub const PADDLE_WIDTH: f32 = 120.0;
    pub const PADDLE_HEIGHT: f32 = 30.0;
    /// Distance from the bottom edge to the paddle top
    pub const PADDLE_BOTTOM_OFFSET: f32 = 110.0;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 16.0;
    pub const BALL_SPEED: f32 = 500.0;
    /// Horizontal steering strength for paddle-edge hits
    pub const PADDLE_MAX_STEER: f32 = 1.2;

    /// Bullet defaults
    pub const BULLET_WIDTH: f32 = 5.0;
    pub const BULLET_HEIGHT: f32 = 5.0;
    pub const BULLET_SPEED: f32 = 900.0;

    /// Bonus box defaults
    pub const BONUS_BOX_SIZE: f32 = 30.0;
    pub const BONUS_BOX_SPEED: f32 = 250.0;
    /// Spawn probability per tile destroyed in one explosion chain
    pub const BONUS_CHANCE_PER_TILE: f64 = 0.2;
    /// Probability cap so long chains never guarantee a drop
    pub const BONUS_CHANCE_CAP: f64 = 0.9;

    /// Blast rectangle margin around a destroyed Explosive tile
    pub const EXPLOSION_MARGIN: f32 = 65.0;

    /// Flat score for any tile hit
    pub const POINTS_PER_HIT: u32 = 10;

    /// Starting lives per player
    pub const START_LIVES: u32 = 3;

    /// Minimum paddle movement before a PaddlePosition message is sent
    pub const PADDLE_SEND_THRESHOLD: f32 = 2.0;
}
