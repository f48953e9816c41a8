//! Headless two-peer demo
//!
//! Runs a host and a joiner over the in-memory loopback transport with the
//! reactive AI driving both paddles, then prints the final scores. Useful
//! for soak-testing the sync layer without a UI:
//!
//! ```text
//! netbrick [seed] [ticks]
//! ```

use netbrick::net::transport::LoopbackTransport;
use netbrick::session::Session;
use netbrick::sim::tick::TickInput;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);
    let ticks: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(7200);

    let (host_pipe, joiner_pipe) = LoopbackTransport::pair();
    let mut host = Session::host_network_game("host", "127.0.0.1", 4242, seed, host_pipe);
    let mut joiner = Session::join_remote_game("joiner", 0, seed.wrapping_add(1), joiner_pipe);

    let input = TickInput {
        launch: true,
        ai_controlled: true,
        ..TickInput::default()
    };

    for _ in 0..ticks {
        host.pump(&input);
        joiner.pump(&input);
    }

    for session in [&host, &joiner] {
        let world = &session.world;
        log::info!(
            "{}: {} pts, {} lives | sees {} at {} pts",
            world.local_player.name,
            world.local_player.points,
            world.local_player.lives,
            world.remote_player.name,
            world.remote_player.points,
        );
    }

    match serde_json::to_string_pretty(host.world.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("snapshot serialization failed: {err}"),
    }
}
