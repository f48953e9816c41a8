//! The authoritative world: entity store plus per-player bookkeeping
//!
//! All counters (score, lives, ball counts) live here and are threaded
//! through the simulation's operations explicitly; nothing is ambient.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::board::BoardLayout;
use crate::consts::*;
use crate::sim::entities::{GamePhase, Paddle, Player, PlayerInfo};
use crate::sim::store::EntityStore;

/// Complete local simulation state for one peer
#[derive(Debug, Clone)]
pub struct World {
    pub store: EntityStore,
    pub local_paddle: Paddle,
    pub remote_paddle: Paddle,
    pub local_player: PlayerInfo,
    pub remote_player: PlayerInfo,
    pub phase: GamePhase,
    /// Local board dimensions; sent to the peer in GameSettings
    pub board_width: f32,
    pub board_height: f32,
    pub scale: f64,
    /// Bullet salvos the local player may still fire (Shoot bonus)
    pub bullet_salvos: u32,
    /// True once a board layout has been consumed; level-done detection
    /// only runs on a generated board
    pub board_generated: bool,
    /// Set when the local board has no destroyable tiles left
    pub level_done: bool,
    /// Set when the peer reports LevelDone
    pub opponent_level_done: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
}

impl World {
    /// Create a fresh world with default board dimensions
    pub fn new(seed: u64) -> Self {
        Self::with_board(seed, BOARD_WIDTH, BOARD_HEIGHT)
    }

    pub fn with_board(seed: u64, board_width: f32, board_height: f32) -> Self {
        // The remote paddle lives at the top of the local frame: its
        // bottom-of-screen rectangle mirrored across the board midline
        let mut remote_paddle = Paddle::new(Player::Remote, board_width, board_height);
        remote_paddle.rect = remote_paddle.rect.mirror_y(board_height);

        Self {
            store: EntityStore::new(),
            local_paddle: Paddle::new(Player::Local, board_width, board_height),
            remote_paddle,
            local_player: PlayerInfo::default(),
            remote_player: PlayerInfo::default(),
            phase: GamePhase::Lobby,
            board_width,
            board_height,
            scale: 1.0,
            bullet_salvos: 0,
            board_generated: false,
            level_done: false,
            opponent_level_done: false,
            time_ticks: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Consume a board layout from the config collaborator. Any previous
    /// tiles are cleared first; tile IDs keep counting up.
    pub fn generate_board(&mut self, layout: &BoardLayout) {
        self.store.clear_tiles();
        for tile in &layout.tiles {
            self.store.add_tile(tile.kind, tile.x, tile.y);
        }
        self.board_generated = true;
        self.level_done = false;
        self.opponent_level_done = false;
        log::info!(
            "board generated: {} tiles ({} destroyable)",
            self.store.tiles().len(),
            self.store.destroyable_tile_count()
        );
    }

    /// Read-only snapshot for the rendering collaborator
    pub fn snapshot(&self) -> &EntityStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::TileType;

    #[test]
    fn test_generate_board_clears_previous_tiles() {
        let mut world = World::new(1);
        world.store.add_tile(TileType::Regular, 0.0, 0.0);
        let layout = BoardLayout::default_grid();
        world.generate_board(&layout);
        assert_eq!(world.store.tiles().len(), layout.tiles.len());
    }

    #[test]
    fn test_regenerated_tiles_get_fresh_ids() {
        let mut world = World::new(1);
        let layout = BoardLayout::default_grid();
        world.generate_board(&layout);
        let max_id = world.store.tiles().iter().map(|t| t.id).max().unwrap();
        world.generate_board(&layout);
        let min_id = world.store.tiles().iter().map(|t| t.id).min().unwrap();
        assert!(min_id > max_id);
    }
}
