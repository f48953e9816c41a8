//! The entity store: sole owner of all live game objects
//!
//! IDs are allocated from per-category monotonic counters and never reused
//! mid-game, so a delayed network message naming a destroyed entity can
//! never alias a newer one. Removal is idempotent: a remote kill racing a
//! local detection of the same event resolves to a silent no-op.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::entities::{Ball, BonusBox, BonusType, Bullet, ObjectId, Player, Tile, TileType};

/// Owns the live collections of balls, tiles, bullets, and bonus boxes.
/// Iteration order is insertion order; the single-hit-per-tick tie-break
/// in the simulation step depends on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    balls: Vec<Ball>,
    tiles: Vec<Tile>,
    bullets: Vec<Bullet>,
    bonus_boxes: Vec<BonusBox>,

    next_ball_id: ObjectId,
    next_tile_id: ObjectId,
    next_bullet_id: ObjectId,
    next_bonus_id: ObjectId,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Balls ---

    pub fn add_ball(&mut self, owner: Player, pos: Vec2, dir: Vec2) -> ObjectId {
        let id = self.next_ball_id;
        self.next_ball_id += 1;
        self.balls.push(Ball::new(id, owner, pos, dir));
        id
    }

    /// Insert a ball whose ID was allocated by the remote peer
    pub fn add_remote_ball(&mut self, id: ObjectId, pos: Vec2, dir: Vec2) {
        self.balls.push(Ball::new(id, Player::Remote, pos, dir));
    }

    /// Idempotent: removing an already-gone ID is a no-op
    pub fn remove_ball(&mut self, id: ObjectId) -> bool {
        let before = self.balls.len();
        self.balls.retain(|b| b.id != id);
        self.balls.len() != before
    }

    pub fn ball(&self, id: ObjectId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Both peers allocate ball IDs from zero, so any per-entity lookup
    /// resolves by ID and owner together; an ID alone is ambiguous
    pub fn ball_owned(&self, id: ObjectId, owner: Player) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id && b.owner == owner)
    }

    pub fn ball_owned_mut(&mut self, id: ObjectId, owner: Player) -> Option<&mut Ball> {
        self.balls
            .iter_mut()
            .find(|b| b.id == id && b.owner == owner)
    }

    pub fn remove_ball_owned(&mut self, id: ObjectId, owner: Player) -> bool {
        let before = self.balls.len();
        self.balls.retain(|b| !(b.id == id && b.owner == owner));
        self.balls.len() != before
    }

    pub fn ball_mut(&mut self, id: ObjectId) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn balls_mut(&mut self) -> &mut [Ball] {
        &mut self.balls
    }

    /// Reap balls flagged dead during the tick
    pub fn retain_live_balls(&mut self) {
        self.balls.retain(|b| !b.dead);
    }

    // --- Tiles ---

    pub fn add_tile(&mut self, kind: TileType, x: f32, y: f32) -> ObjectId {
        let id = self.next_tile_id;
        self.next_tile_id += 1;
        self.tiles.push(Tile::new(id, kind, x, y));
        id
    }

    pub fn remove_tile(&mut self, id: ObjectId) -> bool {
        let before = self.tiles.len();
        self.tiles.retain(|t| t.id != id);
        self.tiles.len() != before
    }

    pub fn tile(&self, id: ObjectId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    pub fn tile_mut(&mut self, id: ObjectId) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|t| t.id == id)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn clear_tiles(&mut self) {
        self.tiles.clear();
    }

    /// Tiles that still need destroying before the level is done
    pub fn destroyable_tile_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.kind != TileType::Unbreakable)
            .count()
    }

    // --- Bullets ---

    pub fn add_bullet(&mut self, owner: Player, x: f32, y: f32) -> ObjectId {
        let id = self.next_bullet_id;
        self.next_bullet_id += 1;
        self.bullets.push(Bullet::new(id, owner, x, y));
        id
    }

    pub fn add_remote_bullet(&mut self, id: ObjectId, x: f32, y: f32) {
        self.bullets.push(Bullet::new(id, Player::Remote, x, y));
    }

    pub fn remove_bullet(&mut self, id: ObjectId) -> bool {
        let before = self.bullets.len();
        self.bullets.retain(|b| b.id != id);
        self.bullets.len() != before
    }

    pub fn bullet(&self, id: ObjectId) -> Option<&Bullet> {
        self.bullets.iter().find(|b| b.id == id)
    }

    pub fn bullet_owned_mut(&mut self, id: ObjectId, owner: Player) -> Option<&mut Bullet> {
        self.bullets
            .iter_mut()
            .find(|b| b.id == id && b.owner == owner)
    }

    pub fn remove_bullet_owned(&mut self, id: ObjectId, owner: Player) -> bool {
        let before = self.bullets.len();
        self.bullets.retain(|b| !(b.id == id && b.owner == owner));
        self.bullets.len() != before
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn bullets_mut(&mut self) -> &mut [Bullet] {
        &mut self.bullets
    }

    pub fn retain_live_bullets(&mut self) {
        self.bullets.retain(|b| !b.dead);
    }

    // --- Bonus boxes ---

    pub fn add_bonus_box(
        &mut self,
        kind: BonusType,
        owner: Player,
        pos: Vec2,
        dir: Vec2,
    ) -> ObjectId {
        let id = self.next_bonus_id;
        self.next_bonus_id += 1;
        self.bonus_boxes
            .push(BonusBox::new(id, Some(kind), owner, pos, dir));
        id
    }

    /// Remote boxes carry no kind; the owner applies the effect
    pub fn add_remote_bonus_box(&mut self, id: ObjectId, pos: Vec2, dir: Vec2) {
        self.bonus_boxes
            .push(BonusBox::new(id, None, Player::Remote, pos, dir));
    }

    pub fn remove_bonus_box(&mut self, id: ObjectId) -> bool {
        let before = self.bonus_boxes.len();
        self.bonus_boxes.retain(|b| b.id != id);
        self.bonus_boxes.len() != before
    }

    pub fn bonus_box(&self, id: ObjectId) -> Option<&BonusBox> {
        self.bonus_boxes.iter().find(|b| b.id == id)
    }

    pub fn remove_bonus_box_owned(&mut self, id: ObjectId, owner: Player) -> bool {
        let before = self.bonus_boxes.len();
        self.bonus_boxes
            .retain(|b| !(b.id == id && b.owner == owner));
        self.bonus_boxes.len() != before
    }

    pub fn bonus_boxes(&self) -> &[BonusBox] {
        &self.bonus_boxes
    }

    pub fn bonus_boxes_mut(&mut self) -> &mut [BonusBox] {
        &mut self.bonus_boxes
    }

    pub fn retain_live_bonus_boxes(&mut self) {
        self.bonus_boxes.retain(|b| !b.dead);
    }
}
