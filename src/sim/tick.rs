//! Fixed timestep simulation step
//!
//! Advances the world by one delta and reports what happened as a list of
//! domestic events. Only locally-owned objects get full physics (bounces,
//! deaths, collisions); remote-owned objects coast at their last wire
//! velocity and all their outcomes arrive as messages from the owner.
//!
//! Per-tick order matters for determinism:
//! 1. move balls, 2. bound-check (bottom exit = death), 3. paddle check,
//! 4. first-intersecting-tile scan (one hit per ball per tick),
//! 5./6. hit counters, destruction, scoring, explosions, bonus drops,
//! 7. bullets, 8. falling bonus boxes and pickups.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::sim::entities::{BonusType, GamePhase, ObjectId, Player, TileType};
use crate::sim::events::GameEvent;
use crate::sim::world::World;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target paddle x (from mouse/joystick), applied with clamping
    pub paddle_target_x: Option<f32>,
    /// Launch a new ball (enter/tap)
    pub launch: bool,
    /// Fire a bullet salvo if one is available
    pub fire: bool,
    /// Reactive AI drives the paddle instead of `paddle_target_x`
    pub ai_controlled: bool,
}

/// Advance the game state by one timestep. Returns the events produced.
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if world.phase != GamePhase::InGame {
        return events;
    }

    world.time_ticks += 1;

    let mut input = input.clone();
    if input.ai_controlled {
        ai_move(world, &mut input);
    }

    if let Some(target) = input.paddle_target_x {
        let board_width = world.board_width;
        world.local_paddle.set_x(target, board_width);
    }

    if input.launch {
        launch_ball(world, &mut events);
    }
    if input.fire {
        fire_bullets(world, &mut events);
    }

    move_and_bound_balls(world, dt, &mut events);
    paddle_check(world, &mut events);
    ball_tile_step(world, &mut events);
    update_bullets(world, dt, &mut events);
    update_bonus_boxes(world, dt, &mut events);

    world.store.retain_live_balls();
    world.store.retain_live_bullets();
    world.store.retain_live_bonus_boxes();

    check_level_done(world, &mut events);

    events
}

/// Reactive paddle-follow heuristic: track the ball closest to the paddle
/// line, but only once it has crossed the board midline. Launches
/// automatically when no ball is in play.
fn ai_move(world: &World, input: &mut TickInput) {
    if world.local_player.active_balls == 0 {
        input.launch = true;
    }

    let threat = world
        .store
        .balls()
        .iter()
        .filter(|b| b.owner == Player::Local)
        .max_by(|a, b| a.rect.bottom().total_cmp(&b.rect.bottom()));

    if let Some(ball) = threat {
        if ball.rect.bottom() > world.board_height / 2.0 {
            input.paddle_target_x =
                Some(ball.rect.center().x - world.local_paddle.rect.w / 2.0);
        }
    }
}

fn launch_ball(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.local_player.active_balls > 0 || world.local_player.lives == 0 {
        return;
    }

    let paddle = &world.local_paddle.rect;
    let pos = Vec2::new(
        paddle.x + paddle.w / 2.0 - BALL_SIZE / 2.0,
        paddle.y - BALL_SIZE - 2.0,
    );
    let dir = Vec2::new(world.rng.random_range(-0.4..0.4), -1.0);
    let id = world.store.add_ball(Player::Local, pos, dir);
    world.local_player.active_balls += 1;

    log::debug!("ball {id} launched");
    events.push(GameEvent::BallSpawned { id });
    events.push(GameEvent::BallMoved { id });
}

fn fire_bullets(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.bullet_salvos == 0 {
        return;
    }
    world.bullet_salvos -= 1;

    let paddle = &world.local_paddle.rect;
    let y = paddle.y - BULLET_HEIGHT;
    let left_id = world.store.add_bullet(Player::Local, paddle.left(), y);
    let right_id = world
        .store
        .add_bullet(Player::Local, paddle.right() - BULLET_WIDTH, y);

    events.push(GameEvent::BulletsFired {
        left_id,
        right_id,
        y,
    });
}

/// Steps 1 and 2: integrate ball positions, then reflect off the side and
/// top edges. A ball past the bottom edge dies instead of bouncing.
/// Remote balls integrate at their last wire velocity only; their bounces
/// and deaths arrive as messages from the owning peer.
fn move_and_bound_balls(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    let (bw, bh) = (world.board_width, world.board_height);
    let mut killed = Vec::new();

    for ball in world.store.balls_mut() {
        if ball.dead {
            continue;
        }

        ball.rect.x += ball.dir.x * ball.speed * dt;
        ball.rect.y += ball.dir.y * ball.speed * dt;

        if ball.owner != Player::Local {
            continue;
        }

        let mut bounced = false;
        if ball.rect.left() < 0.0 {
            ball.rect.x = 0.0;
            ball.dir.x = ball.dir.x.abs();
            bounced = true;
        } else if ball.rect.right() > bw {
            ball.rect.x = bw - ball.rect.w;
            ball.dir.x = -ball.dir.x.abs();
            bounced = true;
        }
        if ball.rect.top() < 0.0 {
            ball.rect.y = 0.0;
            ball.dir.y = ball.dir.y.abs();
            bounced = true;
        }

        if ball.rect.top() > bh {
            ball.dead = true;
            killed.push(ball.id);
        } else if bounced {
            events.push(GameEvent::BallMoved { id: ball.id });
        }
    }

    for id in killed {
        register_local_ball_death(world, id, events);
    }
}

/// Bookkeeping shared by bottom-exit deaths and the Death bonus
fn register_local_ball_death(world: &mut World, id: ObjectId, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::BallKilled { id });
    world.local_player.active_balls = world.local_player.active_balls.saturating_sub(1);

    if world.local_player.active_balls == 0 {
        world.local_player.lives = world.local_player.lives.saturating_sub(1);
        events.push(GameEvent::LifeLost {
            player: Player::Local,
        });
        log::info!("life lost, {} remaining", world.local_player.lives);

        if world.local_player.lives == 0 {
            world.phase = GamePhase::GameOver;
            events.push(GameEvent::PhaseChanged {
                phase: GamePhase::GameOver,
            });
        }
    }
}

/// Step 3: ball vs local paddle. Reflects the vertical direction and
/// steers horizontally in proportion to where on the paddle the ball
/// struck, which is what gives the game its feel.
fn paddle_check(world: &mut World, events: &mut Vec<GameEvent>) {
    let paddle = world.local_paddle.rect;

    for ball in world.store.balls_mut() {
        if ball.owner != Player::Local || ball.dead || ball.dir.y <= 0.0 {
            continue;
        }
        if !ball.rect.intersects(&paddle) {
            continue;
        }

        // 0 at the paddle center, -1/+1 at the edges
        let hit_offset =
            ((ball.rect.center().x - paddle.center().x) / (paddle.w / 2.0)).clamp(-1.0, 1.0);

        ball.dir = Vec2::new(hit_offset * PADDLE_MAX_STEER, -1.0).normalize();
        ball.rect.y = paddle.y - ball.rect.h;
        events.push(GameEvent::BallMoved { id: ball.id });
    }
}

/// Steps 4-6: each local ball scans tiles in store order and applies at
/// most one hit this tick. Stopping after the first intersecting tile is
/// the tie-break that keeps scoring deterministic when tiles overlap.
fn ball_tile_step(world: &mut World, events: &mut Vec<GameEvent>) {
    let ball_ids: Vec<ObjectId> = world
        .store
        .balls()
        .iter()
        .filter(|b| b.owner == Player::Local && !b.dead)
        .map(|b| b.id)
        .collect();

    for ball_id in ball_ids {
        let Some(ball) = world.store.ball_owned(ball_id, Player::Local) else {
            continue;
        };
        let ball_rect = ball.rect;
        let super_ball = ball.super_ball;

        let hit_tile = world
            .store
            .tiles()
            .iter()
            .find(|t| t.rect.intersects(&ball_rect))
            .map(|t| t.id);

        let Some(tile_id) = hit_tile else {
            continue;
        };

        if !super_ball {
            reflect_ball_off_tile(world, ball_id, tile_id, events);
        }

        apply_tile_hit(world, tile_id, super_ball, Player::Local, events);
    }
}

/// Flip the ball direction on the axis of least penetration
fn reflect_ball_off_tile(
    world: &mut World,
    ball_id: ObjectId,
    tile_id: ObjectId,
    events: &mut Vec<GameEvent>,
) {
    let Some(tile_rect) = world.store.tile(tile_id).map(|t| t.rect) else {
        return;
    };
    let Some(ball) = world.store.ball_owned_mut(ball_id, Player::Local) else {
        return;
    };

    let overlap_x = (ball.rect.right().min(tile_rect.right())
        - ball.rect.left().max(tile_rect.left()))
    .max(0.0);
    let overlap_y = (ball.rect.bottom().min(tile_rect.bottom())
        - ball.rect.top().max(tile_rect.top()))
    .max(0.0);

    if overlap_x < overlap_y {
        if ball.rect.center().x < tile_rect.center().x {
            ball.dir.x = -ball.dir.x.abs();
        } else {
            ball.dir.x = ball.dir.x.abs();
        }
    } else if ball.rect.center().y < tile_rect.center().y {
        ball.dir.y = -ball.dir.y.abs();
    } else {
        ball.dir.y = ball.dir.y.abs();
    }

    events.push(GameEvent::BallMoved { id: ball_id });
}

/// Apply one hit to a tile, handling destruction, scoring, explosion
/// chaining, and the bonus drop roll. Also used for bullet hits and for
/// replaying TileHit messages from the peer.
pub(crate) fn apply_tile_hit(
    world: &mut World,
    tile_id: ObjectId,
    super_hit: bool,
    scorer: Player,
    events: &mut Vec<GameEvent>,
) {
    if world.store.tile(tile_id).is_none() {
        // Already destroyed; racing a remote kill is expected
        log::debug!("tile hit on missing id {tile_id}, ignoring");
        return;
    }

    award_points(world, scorer, POINTS_PER_HIT as u64);

    let Some(tile) = world.store.tile_mut(tile_id) else {
        return;
    };
    let destroyed = tile.hit(super_hit);
    let kind = tile.kind;
    events.push(GameEvent::TileHit {
        id: tile_id,
        destroyed,
    });

    if !destroyed {
        return;
    }

    let chain = if kind == TileType::Explosive {
        resolve_explosion(world, tile_id)
    } else {
        vec![tile_id]
    };

    let drop_pos = world
        .store
        .tile(tile_id)
        .map(|t| t.rect.center())
        .unwrap_or_default();

    for &id in &chain {
        if let Some(victim) = world.store.tile(id) {
            let points = victim.kind.destroy_points() as u64;
            award_points(world, scorer, points);
            if id != tile_id {
                // Chain victims score the flat hit too, so the peer can
                // reproduce the total from TileHit messages alone
                award_points(world, scorer, POINTS_PER_HIT as u64);
                events.push(GameEvent::TileHit {
                    id,
                    destroyed: true,
                });
            }
        }
        world.store.remove_tile(id);
    }

    if scorer == Player::Local {
        roll_bonus_drop(world, chain.len(), drop_pos, events);
    }
}

/// Collect-then-apply blast resolution: the scan never mutates the tile
/// list it walks. Returns every tile ID the chain destroys, the
/// triggering tile included. Each tile enters the set at most once,
/// which bounds the recursion by the live tile count.
fn resolve_explosion(world: &World, trigger: ObjectId) -> Vec<ObjectId> {
    let mut destroyed = vec![trigger];
    let mut worklist = vec![trigger];

    while let Some(id) = worklist.pop() {
        let Some(tile) = world.store.tile(id) else {
            continue;
        };
        let blast = tile.rect.expanded(EXPLOSION_MARGIN);

        for other in world.store.tiles() {
            if destroyed.contains(&other.id) {
                continue;
            }
            if other.rect.intersects(&blast) {
                // Explosions one-shot everything, Unbreakable included
                destroyed.push(other.id);
                if other.kind == TileType::Explosive {
                    worklist.push(other.id);
                }
            }
        }
    }

    destroyed
}

fn award_points(world: &mut World, scorer: Player, points: u64) {
    match scorer {
        Player::Local => world.local_player.points += points,
        Player::Remote => world.remote_player.points += points,
    }
}

/// Drop probability scales with the number of tiles the chain destroyed
fn roll_bonus_drop(
    world: &mut World,
    tiles_destroyed: usize,
    pos: Vec2,
    events: &mut Vec<GameEvent>,
) {
    let chance = (BONUS_CHANCE_PER_TILE * tiles_destroyed as f64).min(BONUS_CHANCE_CAP);
    if !world.rng.random_bool(chance) {
        return;
    }

    let kind = match world.rng.random_range(0..4) {
        0 => BonusType::ExtraLife,
        1 => BonusType::Death,
        2 => BonusType::SuperBall,
        _ => BonusType::Shoot,
    };

    // Falls toward the local paddle
    let id = world
        .store
        .add_bonus_box(kind, Player::Local, pos, Vec2::Y);
    log::debug!("bonus box {id} ({kind:?}) dropped");
    events.push(GameEvent::BonusBoxSpawned { id });
}

/// Step 7: bullets travel toward the opposing edge and die on their first
/// tile hit or when they leave the board. Remote bullets are integrated
/// for display only; their hits arrive as TileHit messages.
fn update_bullets(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    let board_height = world.board_height;
    let mut local_hits: Vec<(ObjectId, ObjectId)> = Vec::new();

    for bullet in world.store.bullets_mut() {
        if bullet.dead {
            continue;
        }
        match bullet.owner {
            Player::Local => bullet.rect.y -= BULLET_SPEED * dt,
            Player::Remote => bullet.rect.y += BULLET_SPEED * dt,
        }
    }

    for bullet in world.store.bullets() {
        if bullet.dead || bullet.owner != Player::Local {
            continue;
        }
        if let Some(tile) = world
            .store
            .tiles()
            .iter()
            .find(|t| t.rect.intersects(&bullet.rect))
        {
            local_hits.push((bullet.id, tile.id));
        }
    }

    for (bullet_id, tile_id) in local_hits {
        if let Some(bullet) = world.store.bullet_owned_mut(bullet_id, Player::Local) {
            bullet.dead = true;
        }
        events.push(GameEvent::BulletKilled { id: bullet_id });
        apply_tile_hit(world, tile_id, false, Player::Local, events);
    }

    let mut out_of_bounds = Vec::new();
    for bullet in world.store.bullets_mut() {
        if bullet.dead {
            continue;
        }
        let gone = match bullet.owner {
            Player::Local => bullet.rect.bottom() < 0.0,
            Player::Remote => bullet.rect.top() > board_height,
        };
        if gone {
            bullet.dead = true;
            if bullet.owner == Player::Local {
                out_of_bounds.push(bullet.id);
            }
        }
    }
    for id in out_of_bounds {
        events.push(GameEvent::BulletKilled { id });
    }
}

/// Step 8: bonus boxes fall in a straight line; motion is deterministic so
/// both peers integrate it, but only the owner decides pickups.
fn update_bonus_boxes(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    let paddle = world.local_paddle.rect;
    let board_height = world.board_height;
    let mut picked_up = Vec::new();

    for bb in world.store.bonus_boxes_mut() {
        if bb.dead {
            continue;
        }
        bb.rect.x += bb.dir.x * BONUS_BOX_SPEED * dt;
        bb.rect.y += bb.dir.y * BONUS_BOX_SPEED * dt;

        if bb.owner == Player::Local && bb.rect.intersects(&paddle) {
            bb.dead = true;
            picked_up.push((bb.id, bb.kind));
            continue;
        }
        // Leaving the board in either direction removes the box silently
        if bb.rect.top() > board_height || bb.rect.bottom() < 0.0 {
            bb.dead = true;
        }
    }

    for (id, kind) in picked_up {
        log::debug!("bonus box {id} ({kind:?}) picked up");
        events.push(GameEvent::BonusBoxPickup { id });
        // Local boxes always carry their kind; the None case is remote
        // boxes, which never reach this path
        if let Some(kind) = kind {
            apply_bonus(world, kind, events);
        }
    }
}

/// Apply a bonus effect to the local player
fn apply_bonus(world: &mut World, kind: BonusType, events: &mut Vec<GameEvent>) {
    match kind {
        BonusType::ExtraLife => {
            world.local_player.lives += 1;
        }
        BonusType::Death => {
            let victims: Vec<ObjectId> = world
                .store
                .balls()
                .iter()
                .filter(|b| b.owner == Player::Local && !b.dead)
                .map(|b| b.id)
                .collect();
            for id in victims {
                if let Some(ball) = world.store.ball_owned_mut(id, Player::Local) {
                    ball.dead = true;
                }
                register_local_ball_death(world, id, events);
            }
        }
        BonusType::SuperBall => {
            for ball in world.store.balls_mut() {
                if ball.owner == Player::Local {
                    ball.super_ball = true;
                }
            }
        }
        BonusType::Shoot => {
            world.bullet_salvos += 3;
        }
    }
}

fn check_level_done(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.board_generated && !world.level_done && world.store.destroyable_tile_count() == 0 {
        world.level_done = true;
        events.push(GameEvent::LevelDone);
    }
}
