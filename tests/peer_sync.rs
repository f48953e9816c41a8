//! Two full sessions wired back to back over the loopback transport

use netbrick::consts::SIM_DT;
use netbrick::net::transport::LoopbackTransport;
use netbrick::session::Session;
use netbrick::sim::tick::TickInput;
use netbrick::sim::{GamePhase, Player};

fn connected_pair() -> (Session<LoopbackTransport>, Session<LoopbackTransport>) {
    let (host_pipe, joiner_pipe) = LoopbackTransport::pair();
    let mut host = Session::host_network_game("alice", "127.0.0.1", 4242, 11, host_pipe);
    let mut joiner = Session::join_remote_game("bob", 0, 22, joiner_pipe);

    // Handshake: JoinGame -> settings/name/state -> settings/name back
    let idle = TickInput::default();
    host.pump(&idle);
    joiner.pump(&idle);
    host.pump(&idle);

    (host, joiner)
}

#[test]
fn test_handshake_brings_both_peers_in_game() {
    let (host, joiner) = connected_pair();

    assert_eq!(host.world.phase, GamePhase::InGame);
    assert_eq!(joiner.world.phase, GamePhase::InGame);
    assert_eq!(host.world.remote_player.name, "bob");
    assert_eq!(joiner.world.remote_player.name, "alice");
    // Identical layouts on both sides
    assert!(!host.world.store.tiles().is_empty());
    assert_eq!(
        host.world.store.tiles().len(),
        joiner.world.store.tiles().len()
    );
}

#[test]
fn test_paddle_position_propagates() {
    let (mut host, mut joiner) = connected_pair();

    let input = TickInput {
        paddle_target_x: Some(300.0),
        ..TickInput::default()
    };
    host.pump(&input);
    joiner.pump(&TickInput::default());

    assert_eq!(host.world.local_paddle.rect.x, 300.0);
    assert_eq!(joiner.world.remote_paddle.rect.x, 300.0);
}

#[test]
fn test_ball_spawn_mirrors_onto_peer() {
    let (mut host, mut joiner) = connected_pair();

    let launch = TickInput {
        launch: true,
        ..TickInput::default()
    };
    host.pump(&launch);
    joiner.pump(&TickInput::default());

    let host_ball = &host.world.store.balls()[0];
    let mirrored = host_ball.rect.mirror_y(host.world.board_height);

    let remote = joiner
        .world
        .store
        .balls()
        .iter()
        .find(|b| b.owner == Player::Remote)
        .expect("peer ball should appear");
    assert_eq!(remote.id, host_ball.id);
    // Applied at the mirrored wire position, then coasted one local tick
    assert_eq!(
        remote.rect.x,
        mirrored.x + remote.dir.x * remote.speed * SIM_DT
    );
    assert_eq!(
        remote.rect.y,
        mirrored.y + remote.dir.y * remote.speed * SIM_DT
    );
    // The owner's upward launch travels downward in our frame
    assert!(remote.dir.y > 0.0);
    assert_eq!(joiner.world.remote_player.active_balls, 1);
}

#[test]
fn test_boards_and_scores_converge_under_play() {
    let (mut host, mut joiner) = connected_pair();

    let input = TickInput {
        launch: true,
        ai_controlled: true,
        ..TickInput::default()
    };
    // Five simulated seconds of both peers playing
    for _ in 0..600 {
        host.pump(&input);
        joiner.pump(&input);
    }
    // Pause both simulations, then drain in-flight messages so neither
    // side generates new events while the other has stopped listening
    host.world.phase = GamePhase::Paused;
    joiner.world.phase = GamePhase::Paused;
    host.pump(&TickInput::default());
    joiner.pump(&TickInput::default());
    host.pump(&TickInput::default());

    assert!(host.world.local_player.points > 0, "host never hit a tile");
    assert_eq!(
        host.world.local_player.points,
        joiner.world.remote_player.points
    );
    assert_eq!(
        joiner.world.local_player.points,
        host.world.remote_player.points
    );
    assert_eq!(
        host.world.store.tiles().len(),
        joiner.world.store.tiles().len()
    );
}

#[test]
fn test_disconnect_degrades_to_solo_play() {
    let (mut host, _joiner) = connected_pair();

    host.transport().sever();
    assert!(!host.is_connected());

    // Clearing the board solo must regenerate without the peer's consent
    let tiles_before = host.world.store.tiles().len();
    let ids: Vec<_> = host.world.store.tiles().iter().map(|t| t.id).collect();
    for id in ids {
        host.world.store.remove_tile(id);
    }
    host.pump(&TickInput::default());

    assert_eq!(host.world.store.tiles().len(), tiles_before);
    assert!(!host.world.level_done);
}
