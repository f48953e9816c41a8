//! The per-peer session: one world, one sync layer, one transport
//!
//! `pump` is the whole per-frame contract: drain and apply every inbound
//! message, advance the simulation one fixed step, then flush outbound
//! traffic. Inbound-before-tick keeps remote state at most one tick stale;
//! sends are fire-and-forget, so a dead transport degrades the session to
//! solo play instead of stalling it.

use crate::board::BoardLayout;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::net::message::Message;
use crate::net::sync::SyncLayer;
use crate::net::transport::{MessageTarget, Transport};
use crate::sim::entities::GamePhase;
use crate::sim::events::GameEvent;
use crate::sim::tick::{TickInput, tick};
use crate::sim::world::World;

/// A running game session for one peer
pub struct Session<T: Transport> {
    pub world: World,
    sync: SyncLayer,
    transport: T,
    layout: BoardLayout,
}

impl<T: Transport> Session<T> {
    fn new(name: &str, seed: u64, transport: T, layout: BoardLayout) -> Self {
        let mut world = World::new(seed);
        world.local_player.name = name.to_string();
        Self {
            world,
            sync: SyncLayer::new(),
            transport,
            layout,
        }
    }

    /// Start a solo game: the board is generated immediately and play
    /// begins without any handshake.
    pub fn start_local_game(name: &str, seed: u64, transport: T) -> Self {
        let mut session = Self::new(name, seed, transport, BoardLayout::default_grid());
        session.world.generate_board(&session.layout);
        session.world.phase = GamePhase::InGame;
        session
    }

    /// Host a network game: announce it to the lobby, then idle in the
    /// lobby phase until a JoinGame arrives.
    pub fn host_network_game(name: &str, ip: &str, port: u16, seed: u64, transport: T) -> Self {
        let mut session = Self::new(name, seed, transport, BoardLayout::default_grid());
        session.send(
            Message::NewGame {
                ip: ip.to_string(),
                port,
                name: name.to_string(),
            },
            MessageTarget::Host,
        );
        session
    }

    /// Join a hosted game. The host answers with GameSettings, its player
    /// name, and the InGame state change.
    pub fn join_remote_game(name: &str, game_id: i32, seed: u64, transport: T) -> Self {
        let mut session = Self::new(name, seed, transport, BoardLayout::default_grid());
        session.send(Message::JoinGame { game_id }, MessageTarget::Host);
        session.send(
            Message::PlayerName {
                name: name.to_string(),
            },
            MessageTarget::Client,
        );
        session
    }

    /// Ask the lobby for the open game list. Replies arrive out of band.
    pub fn request_game_list(&mut self) {
        self.send(Message::GameListRequest, MessageTarget::Host);
    }

    /// Advance the session by one fixed step. Returns the tick's events
    /// for observers (UI, audio).
    pub fn pump(&mut self, input: &TickInput) -> Vec<GameEvent> {
        self.pump_dt(input, SIM_DT)
    }

    /// Advance by a variable frame delta as whole fixed substeps, capped
    /// so a long stall cannot spiral
    pub fn pump_frame(&mut self, input: &TickInput, frame_dt: f32) -> Vec<GameEvent> {
        let steps = ((frame_dt / SIM_DT).round() as u32).clamp(1, MAX_SUBSTEPS);
        let mut events = Vec::new();
        for _ in 0..steps {
            events.extend(self.pump_dt(input, SIM_DT));
        }
        events
    }

    pub fn pump_dt(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        // Inbound first: every buffered message lands before physics runs
        for line in self.transport.poll_received() {
            match Message::decode(&line) {
                Ok(msg) => {
                    let first_board = self.entering_game(&msg);
                    let replies = self.sync.apply(&mut self.world, msg);
                    if first_board {
                        self.world.generate_board(&self.layout);
                    }
                    for (reply, target) in replies {
                        self.send(reply, target);
                    }
                }
                Err(err) => log::warn!("dropping malformed message {line:?}: {err}"),
            }
        }

        let events = tick(&mut self.world, input, dt);

        for (msg, target) in self.sync.outbound(&self.world, &events) {
            self.send(msg, target);
        }

        self.maybe_advance_level();
        events
    }

    /// A message that flips us from lobby to play needs a board
    fn entering_game(&self, msg: &Message) -> bool {
        if self.world.phase != GamePhase::Lobby {
            return false;
        }
        match msg {
            Message::JoinGame { .. } => true,
            Message::GameStateChanged { state_code } => {
                GamePhase::from_code(*state_code) == Some(GamePhase::InGame)
            }
            _ => false,
        }
    }

    /// Both sides must clear their board before the next level starts; a
    /// disconnected peer never blocks progression.
    fn maybe_advance_level(&mut self) {
        if !self.world.level_done {
            return;
        }
        if self.world.opponent_level_done || !self.transport.is_connected() {
            log::info!("level complete, regenerating board");
            self.world.generate_board(&self.layout);
        }
    }

    pub fn end_game(&mut self, game_id: i32, ip: &str, port: u16) {
        self.send(
            Message::EndGame {
                game_id,
                ip: ip.to_string(),
                port,
            },
            MessageTarget::Host,
        );
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send(&mut self, msg: Message, target: MessageTarget) {
        self.transport.send(&msg.encode(), target);
    }
}
