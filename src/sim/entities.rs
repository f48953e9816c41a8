//! Game entity types
//!
//! Every networked entity carries an `ObjectId` unique within its category
//! for the lifetime of the object. Remote peers refer to entities by ID
//! only, never by reference.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::geometry::Rect;

/// Per-category entity identifier, monotonically allocated and never reused
pub type ObjectId = u32;

/// Which side owns an entity (and is authoritative for its physics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Player {
    Local,
    Remote,
}

impl Player {
    /// The other side
    pub fn opponent(&self) -> Player {
        match self {
            Player::Local => Player::Remote,
            Player::Remote => Player::Local,
        }
    }
}

/// Tile flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileType {
    Regular,
    Hard,
    Unbreakable,
    Explosive,
}

impl TileType {
    /// Score awarded when a tile of this type is destroyed. Unbreakable
    /// only pays out when an explosion takes it.
    pub fn destroy_points(&self) -> u32 {
        match self {
            TileType::Regular => 20,
            TileType::Hard => 50,
            TileType::Unbreakable => 100,
            TileType::Explosive => 200,
        }
    }

    /// Hits needed before a ball destroys the tile; None = immune
    pub fn hit_threshold(&self) -> Option<u32> {
        match self {
            TileType::Regular => Some(1),
            TileType::Hard => Some(HARD_TILE_HITS),
            TileType::Unbreakable => None,
            // Explosive pops on the first touch
            TileType::Explosive => Some(1),
        }
    }
}

/// A ball in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: ObjectId,
    pub rect: Rect,
    /// Normalized direction of travel
    pub dir: Vec2,
    pub speed: f32,
    pub owner: Player,
    /// Super balls one-shot any destructible tile
    pub super_ball: bool,
    /// Set when the ball exits the bottom edge; reaped at end of tick
    pub dead: bool,
}

impl Ball {
    pub fn new(id: ObjectId, owner: Player, pos: Vec2, dir: Vec2) -> Self {
        Self {
            id,
            rect: Rect::new(pos.x, pos.y, BALL_SIZE, BALL_SIZE),
            dir: dir.normalize_or_zero(),
            speed: BALL_SPEED,
            owner,
            super_ball: false,
            dead: false,
        }
    }
}

/// A player's paddle. Not a store entity: there is exactly one per side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub rect: Rect,
    pub owner: Player,
}

impl Paddle {
    pub fn new(owner: Player, board_width: f32, board_height: f32) -> Self {
        Self {
            rect: Rect::new(
                (board_width - PADDLE_WIDTH) / 2.0,
                board_height - PADDLE_BOTTOM_OFFSET,
                PADDLE_WIDTH,
                PADDLE_HEIGHT,
            ),
            owner,
        }
    }

    /// Move the paddle, clamped to `[0, board_width - paddle_width]`
    pub fn set_x(&mut self, x: f32, board_width: f32) {
        self.rect.x = x.clamp(0.0, (board_width - self.rect.w).max(0.0));
    }
}

/// A board tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: ObjectId,
    pub kind: TileType,
    pub rect: Rect,
    /// Hits taken so far; monotonically increasing until destruction
    pub hits: u32,
    /// Scoring attribution for owned tiles, None for neutral board tiles
    pub owner: Option<Player>,
}

impl Tile {
    pub fn new(id: ObjectId, kind: TileType, x: f32, y: f32) -> Self {
        Self {
            id,
            kind,
            rect: Rect::new(x, y, TILE_WIDTH, TILE_HEIGHT),
            hits: 0,
            owner: None,
        }
    }

    /// Register one hit. Returns true if the tile is now destroyed.
    /// Unbreakable tiles absorb hits forever; explosions bypass this path.
    pub fn hit(&mut self, super_ball: bool) -> bool {
        self.hits += 1;
        match self.kind.hit_threshold() {
            Some(_) if super_ball => true,
            Some(threshold) => self.hits >= threshold,
            None => false,
        }
    }
}

/// A paddle-fired bullet, travelling toward the opposing edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: ObjectId,
    pub rect: Rect,
    pub owner: Player,
    pub dead: bool,
}

impl Bullet {
    pub fn new(id: ObjectId, owner: Player, x: f32, y: f32) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, BULLET_WIDTH, BULLET_HEIGHT),
            owner,
            dead: false,
        }
    }
}

/// Bonus effects dropped by destroyed tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusType {
    ExtraLife,
    /// Kills every ball the victim owns
    Death,
    SuperBall,
    /// Grants a bullet salvo
    Shoot,
}

/// A falling bonus box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusBox {
    pub id: ObjectId,
    /// None for remote-owned boxes: the wire does not carry the kind and
    /// only the owning peer ever applies the effect
    pub kind: Option<BonusType>,
    pub rect: Rect,
    /// Falling direction, normalized; locally-owned boxes fall toward the
    /// bottom of the local viewport
    pub dir: Vec2,
    pub owner: Player,
    pub dead: bool,
}

impl BonusBox {
    pub fn new(id: ObjectId, kind: Option<BonusType>, owner: Player, pos: Vec2, dir: Vec2) -> Self {
        Self {
            id,
            kind,
            rect: Rect::new(pos.x, pos.y, BONUS_BOX_SIZE, BONUS_BOX_SIZE),
            dir: dir.normalize_or_zero(),
            owner,
            dead: false,
        }
    }
}

/// Coarse game phase, exchanged over the wire as an integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Lobby,
    InGame,
    Paused,
    GameOver,
}

impl GamePhase {
    pub fn to_code(self) -> u32 {
        match self {
            GamePhase::Lobby => 0,
            GamePhase::InGame => 1,
            GamePhase::Paused => 2,
            GamePhase::GameOver => 3,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(GamePhase::Lobby),
            1 => Some(GamePhase::InGame),
            2 => Some(GamePhase::Paused),
            3 => Some(GamePhase::GameOver),
            _ => None,
        }
    }
}

/// Per-player score and life bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub points: u64,
    pub lives: u32,
    /// Balls currently in play for this side
    pub active_balls: u32,
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            points: 0,
            lives: START_LIVES,
            active_balls: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_hit_thresholds() {
        let mut regular = Tile::new(0, TileType::Regular, 0.0, 0.0);
        assert!(regular.hit(false));

        let mut hard = Tile::new(1, TileType::Hard, 0.0, 0.0);
        for _ in 0..HARD_TILE_HITS - 1 {
            assert!(!hard.hit(false));
        }
        assert!(hard.hit(false));
        assert_eq!(hard.hits, HARD_TILE_HITS);
    }

    #[test]
    fn test_unbreakable_never_destroyed_by_hits() {
        let mut tile = Tile::new(0, TileType::Unbreakable, 0.0, 0.0);
        for _ in 0..1000 {
            assert!(!tile.hit(false));
        }
        // Not even a super ball gets through
        assert!(!tile.hit(true));
    }

    #[test]
    fn test_super_ball_one_shots_hard_tile() {
        let mut hard = Tile::new(0, TileType::Hard, 0.0, 0.0);
        assert!(hard.hit(true));
    }

    #[test]
    fn test_paddle_clamp() {
        let mut paddle = Paddle::new(Player::Local, 600.0, 720.0);
        paddle.rect.w = 120.0;
        paddle.set_x(500.0, 600.0);
        assert_eq!(paddle.rect.x, 480.0);
        paddle.set_x(-50.0, 600.0);
        assert_eq!(paddle.rect.x, 0.0);
    }

    #[test]
    fn test_phase_codes_round_trip() {
        for phase in [
            GamePhase::Lobby,
            GamePhase::InGame,
            GamePhase::Paused,
            GamePhase::GameOver,
        ] {
            assert_eq!(GamePhase::from_code(phase.to_code()), Some(phase));
        }
        assert_eq!(GamePhase::from_code(99), None);
    }
}
