//! Event/message translation between two peer simulations
//!
//! Each peer is authoritative for the objects it owns and mirrors the
//! opponent's objects from wire messages. Outbound positions are flipped
//! across the sender's board midline before encoding, so every received
//! coordinate is already in the receiver's frame; inbound positions are
//! rescaled by the ratio of local to remote board dimensions.
//!
//! A mutation naming an object the store no longer has (a kill racing a
//! local detection, a hit on an already-destroyed tile) is a silent no-op.

use glam::Vec2;

use crate::consts::*;
use crate::geometry::{mirror_dir_y, Rect};
use crate::net::message::Message;
use crate::net::transport::MessageTarget;
use crate::sim::entities::{GamePhase, ObjectId, Player};
use crate::sim::events::GameEvent;
use crate::sim::world::World;

/// Translates local simulation events into wire messages and applies
/// inbound messages to the world. One instance per connection.
#[derive(Debug)]
pub struct SyncLayer {
    /// Last paddle x we put on the wire; movement below the send
    /// threshold is coalesced away
    last_sent_paddle_x: Option<f32>,
    remote_board_width: f32,
    remote_board_height: f32,
    remote_scale: f64,
    remote_phase: GamePhase,
    /// Guards the settings exchange against replying to a reply
    settings_sent: bool,
}

impl Default for SyncLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncLayer {
    pub fn new() -> Self {
        Self {
            last_sent_paddle_x: None,
            remote_board_width: 0.0,
            remote_board_height: 0.0,
            remote_scale: 1.0,
            remote_phase: GamePhase::Lobby,
            settings_sent: false,
        }
    }

    pub fn remote_phase(&self) -> GamePhase {
        self.remote_phase
    }

    /// Horizontal scale from the remote frame into the local one
    fn scale_x(&self, world: &World) -> f32 {
        if self.remote_board_width > 0.0 {
            world.board_width / self.remote_board_width
        } else {
            1.0
        }
    }

    fn scale_y(&self, world: &World) -> f32 {
        if self.remote_board_height > 0.0 {
            world.board_height / self.remote_board_height
        } else {
            1.0
        }
    }

    /// Turn the events of one tick into outbound messages. Positions are
    /// looked up in the store at call time and mirrored into the peer's
    /// orientation.
    pub fn outbound(
        &mut self,
        world: &World,
        events: &[GameEvent],
    ) -> Vec<(Message, MessageTarget)> {
        let mut out = Vec::new();
        for event in events {
            match event {
                GameEvent::BallSpawned { id } => {
                    out.push((Message::BallSpawned { id: *id }, MessageTarget::Client));
                    if let Some(msg) = ball_data(world, *id) {
                        out.push((msg, MessageTarget::Client));
                    }
                }
                GameEvent::BallMoved { id } => {
                    if let Some(msg) = ball_data(world, *id) {
                        out.push((msg, MessageTarget::Client));
                    }
                }
                GameEvent::BallKilled { id } => {
                    out.push((Message::BallKilled { id: *id }, MessageTarget::Client));
                }
                GameEvent::TileHit { id, destroyed } => {
                    out.push((
                        Message::TileHit {
                            id: *id,
                            destroyed: *destroyed,
                        },
                        MessageTarget::Client,
                    ));
                }
                GameEvent::BonusBoxSpawned { id } => {
                    if let Some(bbox) = world.store.bonus_box(*id) {
                        let mirrored = bbox.rect.mirror_y(world.board_height);
                        let dir = mirror_dir_y(bbox.dir);
                        out.push((
                            Message::BonusBoxSpawned {
                                id: *id,
                                pos_x: mirrored.x,
                                pos_y: mirrored.y,
                                dir_x: dir.x,
                                dir_y: dir.y,
                            },
                            MessageTarget::Client,
                        ));
                    }
                }
                GameEvent::BonusBoxPickup { id } => {
                    out.push((Message::BonusBoxPickup { id: *id }, MessageTarget::Client));
                }
                GameEvent::BulletsFired {
                    left_id,
                    right_id,
                    y,
                } => {
                    let mirrored_y = Rect::new(0.0, *y, BULLET_WIDTH, BULLET_HEIGHT)
                        .mirror_y(world.board_height)
                        .y;
                    out.push((
                        Message::BulletFire {
                            left_id: *left_id,
                            right_id: *right_id,
                            y: mirrored_y,
                        },
                        MessageTarget::Client,
                    ));
                }
                GameEvent::BulletKilled { id } => {
                    out.push((Message::BulletKilled { id: *id }, MessageTarget::Client));
                }
                GameEvent::PhaseChanged { phase } => {
                    out.push((
                        Message::GameStateChanged {
                            state_code: phase.to_code(),
                        },
                        MessageTarget::Client,
                    ));
                }
                GameEvent::LevelDone => {
                    out.push((Message::LevelDone, MessageTarget::Client));
                }
                // Lives are tracked per peer; never on the wire
                GameEvent::LifeLost { .. } => {}
            }
        }

        if world.phase == GamePhase::InGame {
            let x = world.local_paddle.rect.x;
            let moved = self
                .last_sent_paddle_x
                .is_none_or(|prev| (x - prev).abs() >= PADDLE_SEND_THRESHOLD);
            if moved {
                out.push((Message::PaddlePosition { x }, MessageTarget::Client));
                self.last_sent_paddle_x = Some(x);
            }
        }

        out
    }

    /// Apply one inbound message to the world. Returns any replies the
    /// message demands (the join/settings handshake).
    pub fn apply(&mut self, world: &mut World, msg: Message) -> Vec<(Message, MessageTarget)> {
        let mut replies = Vec::new();
        match msg {
            Message::BallSpawned { id } => {
                if world.store.ball_owned_mut(id, Player::Remote).is_some() {
                    log::debug!("duplicate remote ball spawn {id}");
                } else {
                    // Placeholder position until the first BallData lands
                    let pos = Vec2::new(world.remote_paddle.rect.x, world.remote_paddle.rect.y);
                    world.store.add_remote_ball(id, pos, Vec2::Y);
                    world.remote_player.active_balls += 1;
                }
            }
            Message::BallData {
                id,
                pos_x,
                pos_y,
                dir_x,
                dir_y,
            } => {
                let (sx, sy) = (self.scale_x(world), self.scale_y(world));
                match world.store.ball_owned_mut(id, Player::Remote) {
                    Some(ball) => {
                        ball.rect.x = pos_x * sx;
                        ball.rect.y = pos_y * sy;
                        ball.dir = Vec2::new(dir_x, dir_y).normalize_or_zero();
                    }
                    None => log::debug!("ball data for unknown remote ball {id}"),
                }
            }
            Message::BallKilled { id } => {
                if world.store.remove_ball_owned(id, Player::Remote) {
                    world.remote_player.active_balls =
                        world.remote_player.active_balls.saturating_sub(1);
                } else {
                    log::debug!("kill for unknown remote ball {id}");
                }
            }
            Message::TileHit { id, destroyed } => {
                self.apply_remote_tile_hit(world, id, destroyed);
            }
            Message::PaddlePosition { x } => {
                let sx = self.scale_x(world);
                let width = world.board_width;
                world.remote_paddle.set_x(x * sx, width);
            }
            Message::BonusBoxSpawned {
                id,
                pos_x,
                pos_y,
                dir_x,
                dir_y,
            } => {
                let (sx, sy) = (self.scale_x(world), self.scale_y(world));
                world.store.add_remote_bonus_box(
                    id,
                    Vec2::new(pos_x * sx, pos_y * sy),
                    Vec2::new(dir_x, dir_y),
                );
            }
            Message::BonusBoxPickup { id } => {
                if !world.store.remove_bonus_box_owned(id, Player::Remote) {
                    log::debug!("pickup for unknown remote bonus box {id}");
                }
            }
            Message::BulletFire {
                left_id,
                right_id,
                y,
            } => {
                let sy = self.scale_y(world);
                let paddle = world.remote_paddle.rect;
                world.store.add_remote_bullet(left_id, paddle.x, y * sy);
                world
                    .store
                    .add_remote_bullet(right_id, paddle.x + paddle.w - BULLET_WIDTH, y * sy);
            }
            Message::BulletKilled { id } => {
                if !world.store.remove_bullet_owned(id, Player::Remote) {
                    log::debug!("kill for unknown remote bullet {id}");
                }
            }
            Message::GameSettings {
                board_width,
                board_height,
                scale,
            } => {
                self.remote_board_width = board_width;
                self.remote_board_height = board_height;
                self.remote_scale = scale;
                log::info!("peer board {board_width}x{board_height} (scale {scale})");
                if !self.settings_sent {
                    self.settings_sent = true;
                    replies.push((settings_message(world), MessageTarget::Client));
                    replies.push((
                        Message::PlayerName {
                            name: world.local_player.name.clone(),
                        },
                        MessageTarget::Client,
                    ));
                }
            }
            Message::GameStateChanged { state_code } => match GamePhase::from_code(state_code) {
                Some(phase) => {
                    self.remote_phase = phase;
                    if phase == GamePhase::InGame && world.phase == GamePhase::Lobby {
                        world.phase = GamePhase::InGame;
                    }
                }
                None => log::warn!("unknown game state code {state_code}"),
            },
            Message::LevelDone => {
                world.opponent_level_done = true;
            }
            Message::PlayerName { name } => {
                log::info!("peer is {name}");
                world.remote_player.name = name;
            }
            Message::JoinGame { game_id } => {
                // We are hosting: hand the joiner our settings and start
                log::info!("peer joined game {game_id}");
                self.settings_sent = true;
                replies.push((settings_message(world), MessageTarget::Client));
                replies.push((
                    Message::PlayerName {
                        name: world.local_player.name.clone(),
                    },
                    MessageTarget::Client,
                ));
                world.phase = GamePhase::InGame;
                replies.push((
                    Message::GameStateChanged {
                        state_code: GamePhase::InGame.to_code(),
                    },
                    MessageTarget::Client,
                ));
            }
            // Matchmaking traffic is the lobby server's concern
            Message::NewGame { .. } | Message::EndGame { .. } | Message::GameListRequest => {
                log::debug!("ignoring lobby message {msg:?}");
            }
        }
        replies
    }

    /// The peer is authoritative for hits its objects cause: apply the
    /// exact outcome it reported, without re-running thresholds or
    /// explosion chains locally.
    fn apply_remote_tile_hit(&mut self, world: &mut World, id: ObjectId, destroyed: bool) {
        let Some(tile) = world.store.tile(id) else {
            log::debug!("hit for unknown tile {id}");
            return;
        };
        let mut points = POINTS_PER_HIT as u64;
        if destroyed {
            points += tile.kind.destroy_points() as u64;
            world.store.remove_tile(id);
        } else if let Some(tile) = world.store.tile_mut(id) {
            tile.hits += 1;
        }
        world.remote_player.points += points;
    }
}

fn ball_data(world: &World, id: ObjectId) -> Option<Message> {
    let ball = world.store.ball_owned(id, Player::Local)?;
    let mirrored = ball.rect.mirror_y(world.board_height);
    let dir = mirror_dir_y(ball.dir);
    Some(Message::BallData {
        id,
        pos_x: mirrored.x,
        pos_y: mirrored.y,
        dir_x: dir.x,
        dir_y: dir.y,
    })
}

fn settings_message(world: &World) -> Message {
    Message::GameSettings {
        board_width: world.board_width,
        board_height: world.board_height,
        scale: world.scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::TileType;

    fn in_game_world() -> World {
        let mut world = World::new(7);
        world.phase = GamePhase::InGame;
        world
    }

    #[test]
    fn test_ball_events_mirror_positions() {
        let mut world = in_game_world();
        let id = world
            .store
            .add_ball(Player::Local, Vec2::new(100.0, 600.0), Vec2::new(0.0, -1.0));
        let mut sync = SyncLayer::new();

        let out = sync.outbound(&world, &[GameEvent::BallSpawned { id }]);

        assert!(out.contains(&(Message::BallSpawned { id }, MessageTarget::Client)));
        let data = out.iter().find_map(|(m, _)| match m {
            Message::BallData { pos_y, dir_y, .. } => Some((*pos_y, *dir_y)),
            _ => None,
        });
        // 720 - 600 - ball size, direction flipped
        assert_eq!(data, Some((720.0 - 600.0 - BALL_SIZE, 1.0)));
    }

    #[test]
    fn test_ball_data_reports_local_ball_when_ids_collide() {
        let mut world = in_game_world();
        // The peer's ball 0 is inserted before our own launch reuses the ID
        world
            .store
            .add_remote_ball(0, Vec2::new(500.0, 50.0), Vec2::Y);
        let id = world
            .store
            .add_ball(Player::Local, Vec2::new(100.0, 600.0), Vec2::new(0.0, -1.0));
        assert_eq!(id, 0);
        let mut sync = SyncLayer::new();

        let out = sync.outbound(&world, &[GameEvent::BallMoved { id }]);

        let data = out.iter().find_map(|(m, _)| match m {
            Message::BallData { pos_x, pos_y, .. } => Some((*pos_x, *pos_y)),
            _ => None,
        });
        // Our ball's rectangle mirrored, never the peer copy's
        assert_eq!(data, Some((100.0, 720.0 - 600.0 - BALL_SIZE)));
    }

    #[test]
    fn test_paddle_updates_respect_threshold() {
        let mut world = in_game_world();
        let mut sync = SyncLayer::new();

        // First tick always reports the paddle
        let out = sync.outbound(&world, &[]);
        assert_eq!(out.len(), 1);

        // Sub-threshold wiggle is coalesced away
        let x = world.local_paddle.rect.x;
        world.local_paddle.set_x(x + 1.0, world.board_width);
        assert!(sync.outbound(&world, &[]).is_empty());

        world.local_paddle.set_x(x + 10.0, world.board_width);
        let out = sync.outbound(&world, &[]);
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0].0, Message::PaddlePosition { .. }));
    }

    #[test]
    fn test_no_paddle_traffic_outside_game() {
        let world = World::new(7);
        let mut sync = SyncLayer::new();
        assert!(sync.outbound(&world, &[]).is_empty());
    }

    #[test]
    fn test_apply_clamps_remote_paddle() {
        let mut world = World::with_board(7, 600.0, 720.0);
        let mut sync = SyncLayer::new();
        sync.apply(&mut world, Message::PaddlePosition { x: 500.0 });
        // 600 board, 120 paddle: clamp lands at 480
        assert_eq!(world.remote_paddle.rect.x, 480.0);
    }

    #[test]
    fn test_remote_tile_hit_scores_opponent() {
        let mut world = in_game_world();
        let id = world.store.add_tile(TileType::Regular, 100.0, 100.0);
        let mut sync = SyncLayer::new();

        sync.apply(
            &mut world,
            Message::TileHit {
                id,
                destroyed: true,
            },
        );

        assert!(world.store.tile(id).is_none());
        assert_eq!(world.remote_player.points, 30);
        assert_eq!(world.local_player.points, 0);
    }

    #[test]
    fn test_remote_partial_hit_keeps_tile() {
        let mut world = in_game_world();
        let id = world.store.add_tile(TileType::Hard, 100.0, 100.0);
        let mut sync = SyncLayer::new();

        sync.apply(
            &mut world,
            Message::TileHit {
                id,
                destroyed: false,
            },
        );

        let tile = world.store.tile(id).unwrap();
        assert_eq!(tile.hits, 1);
        assert_eq!(world.remote_player.points, POINTS_PER_HIT as u64);
    }

    #[test]
    fn test_stale_ids_are_noops() {
        let mut world = in_game_world();
        let mut sync = SyncLayer::new();

        sync.apply(&mut world, Message::BallKilled { id: 99 });
        sync.apply(&mut world, Message::BulletKilled { id: 99 });
        sync.apply(&mut world, Message::BonusBoxPickup { id: 99 });
        sync.apply(
            &mut world,
            Message::TileHit {
                id: 99,
                destroyed: true,
            },
        );
        sync.apply(
            &mut world,
            Message::BallData {
                id: 99,
                pos_x: 0.0,
                pos_y: 0.0,
                dir_x: 0.0,
                dir_y: 1.0,
            },
        );

        assert_eq!(world.remote_player.points, 0);
        assert!(world.store.balls().is_empty());
    }

    #[test]
    fn test_remote_ball_lifecycle_tracks_count() {
        let mut world = in_game_world();
        let mut sync = SyncLayer::new();

        sync.apply(&mut world, Message::BallSpawned { id: 0 });
        assert_eq!(world.remote_player.active_balls, 1);
        // Duplicate spawn does not double-count
        sync.apply(&mut world, Message::BallSpawned { id: 0 });
        assert_eq!(world.remote_player.active_balls, 1);
        assert_eq!(world.store.balls().len(), 1);

        sync.apply(&mut world, Message::BallKilled { id: 0 });
        assert_eq!(world.remote_player.active_balls, 0);
        assert!(world.store.balls().is_empty());
    }

    #[test]
    fn test_ball_data_rescales_between_board_sizes() {
        let mut world = in_game_world();
        let mut sync = SyncLayer::new();
        sync.apply(
            &mut world,
            Message::GameSettings {
                board_width: 640.0,
                board_height: 360.0,
                scale: 1.0,
            },
        );
        sync.apply(&mut world, Message::BallSpawned { id: 0 });
        sync.apply(
            &mut world,
            Message::BallData {
                id: 0,
                pos_x: 100.0,
                pos_y: 50.0,
                dir_x: 0.0,
                dir_y: 1.0,
            },
        );

        // Local board is 1280x720: twice the peer's in both axes
        let ball = world.store.ball(0).unwrap();
        assert_eq!(ball.rect.x, 200.0);
        assert_eq!(ball.rect.y, 100.0);
    }

    #[test]
    fn test_settings_exchange_terminates() {
        let mut world = in_game_world();
        let mut sync = SyncLayer::new();
        let settings = Message::GameSettings {
            board_width: 1280.0,
            board_height: 720.0,
            scale: 1.0,
        };

        let replies = sync.apply(&mut world, settings.clone());
        assert_eq!(replies.len(), 2);
        assert!(matches!(replies[0].0, Message::GameSettings { .. }));
        assert!(matches!(replies[1].0, Message::PlayerName { .. }));

        // A reply to our reply must not echo again
        assert!(sync.apply(&mut world, settings).is_empty());
    }

    #[test]
    fn test_join_game_starts_match() {
        let mut world = World::new(7);
        world.local_player.name = "host".into();
        let mut sync = SyncLayer::new();

        let replies = sync.apply(&mut world, Message::JoinGame { game_id: 1 });

        assert_eq!(world.phase, GamePhase::InGame);
        assert_eq!(replies.len(), 3);
        assert!(matches!(replies[0].0, Message::GameSettings { .. }));
        assert!(
            replies
                .iter()
                .any(|(m, _)| *m == Message::GameStateChanged { state_code: 1 })
        );
    }

    #[test]
    fn test_level_done_sets_opponent_flag() {
        let mut world = in_game_world();
        let mut sync = SyncLayer::new();
        sync.apply(&mut world, Message::LevelDone);
        assert!(world.opponent_level_done);
    }
}
