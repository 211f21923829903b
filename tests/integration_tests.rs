//! Integration tests for the snake arena server
//!
//! These tests run a real server on an ephemeral port and talk to it over TCP
//! the way a game client would.

use server::codec;
use server::config::ServerConfig;
use server::network::Server;
use shared::{Direction, Packet, Snapshot, MAX_FRAME_LEN};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(10);

fn fast_config(max_players: usize) -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1:0".to_string(),
        tick_duration: Duration::from_millis(5),
        max_players,
        countdown_from: 2,
        countdown_step: Duration::from_millis(20),
    }
}

async fn start_server(config: ServerConfig) -> SocketAddr {
    let server = Server::bind(config).await.expect("Failed to bind server");
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

async fn read(stream: &mut TcpStream) -> Packet {
    timeout(WAIT, codec::read_packet(stream, MAX_FRAME_LEN))
        .await
        .expect("Timed out waiting for a packet")
        .expect("Failed to read packet")
}

/// Connects and returns the stream together with the assigned player id.
async fn join(addr: SocketAddr) -> (TcpStream, u32) {
    let mut stream = TcpStream::connect(addr).await.expect("Failed to connect");
    match read(&mut stream).await {
        Packet::Join { player_id, .. } => (stream, player_id),
        other => panic!("Expected Join, got {:?}", other),
    }
}

/// Reads snapshots until one satisfies `done`.
async fn snapshot_until(stream: &mut TcpStream, done: impl Fn(&Snapshot) -> bool) -> Snapshot {
    timeout(WAIT, async {
        loop {
            if let Packet::Snapshot(snapshot) = read(stream).await {
                if done(&snapshot) {
                    return snapshot;
                }
            }
        }
    })
    .await
    .expect("Condition never reached")
}

/// CONNECTION LIFECYCLE TESTS
mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn join_carries_initial_state() {
        let addr = start_server(fast_config(2)).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        match read(&mut stream).await {
            Packet::Join {
                player_id,
                game_state,
                max_players,
            } => {
                assert_eq!(player_id, 0);
                assert_eq!(max_players, 2);
                assert_eq!(game_state.score(0), Some(0));
                assert!(!game_state.countdown);
                assert_eq!(game_state.countdown_value, 2);
                assert!((400..600).contains(&game_state.food.x));
                assert!((400..600).contains(&game_state.food.y));
            }
            other => panic!("Expected Join, got {:?}", other),
        }

        let waiting = snapshot_until(&mut stream, |_| true).await;
        assert!(!waiting.game_started);
        assert_eq!(waiting.players.len(), 1);
    }

    #[tokio::test]
    async fn ids_are_sequential() {
        let addr = start_server(fast_config(3)).await;

        let (_a, first) = join(addr).await;
        let (_b, second) = join(addr).await;

        assert_eq!((first, second), (0, 1));
    }

    #[tokio::test]
    async fn full_room_rejects_newcomers() {
        let addr = start_server(fast_config(2)).await;
        let (_a, _) = join(addr).await;
        let (_b, _) = join(addr).await;

        let mut late = TcpStream::connect(addr).await.unwrap();
        match read(&mut late).await {
            Packet::Rejected { reason } => assert!(reason.contains("full"), "{}", reason),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn disconnect_removes_snake_from_snapshots() {
        let addr = start_server(fast_config(3)).await;
        let (mut stay, _) = join(addr).await;
        let (leave, leaver) = join(addr).await;

        snapshot_until(&mut stay, |s| s.player(leaver).is_some()).await;
        drop(leave);

        let after = snapshot_until(&mut stay, |s| s.player(leaver).is_none()).await;
        assert_eq!(after.score(leaver), None);
        assert!(after.player(0).is_some());
        assert!(!after.game_started);
    }
}

/// GAME FLOW TESTS
mod game_flow_tests {
    use super::*;

    #[tokio::test]
    async fn countdown_then_start() {
        let addr = start_server(fast_config(2)).await;
        let (mut a, _) = join(addr).await;
        let (_b, _) = join(addr).await;

        let counting = snapshot_until(&mut a, |s| s.countdown).await;
        assert!(counting.countdown_value >= 1 && counting.countdown_value <= 2);
        assert!(!counting.game_started);

        let started = snapshot_until(&mut a, |s| s.game_started).await;
        assert!(!started.countdown);
        assert_eq!(started.countdown_value, 0);
        assert_eq!(started.players.len(), 2);
    }

    #[tokio::test]
    async fn first_wall_hit_decides_winner() {
        let addr = start_server(fast_config(2)).await;
        let (mut a, id_a) = join(addr).await;

        // Player 0 spawns near the top-left corner and heads straight up
        // into the wall long before player 1 can reach anything.
        let intent = Packet::Intent {
            player_id: id_a,
            direction: Direction::Up,
        };
        codec::write_packet(&mut a, &intent).await.unwrap();

        let (mut b, id_b) = join(addr).await;

        let over = snapshot_until(&mut a, |s| s.game_over).await;
        assert_eq!(over.winner, Some(id_b.to_string()));
        assert!(!over.tie);
        assert!(over.player(id_a).is_none());
        assert_eq!(over.score(id_a), Some(0), "the dead keep their score");

        let seen_by_b = snapshot_until(&mut b, |s| s.game_over).await;
        assert_eq!(seen_by_b.winner, over.winner);
    }

    #[tokio::test]
    async fn reversal_intent_is_ignored() {
        let addr = start_server(fast_config(2)).await;
        let (mut a, id_a) = join(addr).await;

        // Spawned facing right; a left turn would reverse onto the body.
        let intent = Packet::Intent {
            player_id: id_a,
            direction: Direction::Left,
        };
        codec::write_packet(&mut a, &intent).await.unwrap();

        let (_b, _) = join(addr).await;
        let started = snapshot_until(&mut a, |s| s.game_started).await;
        assert_eq!(started.player(id_a).unwrap().direction, Direction::Right);
    }

    #[tokio::test]
    async fn leaving_mid_game_hands_over_the_win() {
        let addr = start_server(fast_config(2)).await;
        let (mut a, id_a) = join(addr).await;
        let (b, _) = join(addr).await;

        snapshot_until(&mut a, |s| s.game_started).await;
        drop(b);

        let over = snapshot_until(&mut a, |s| s.game_over).await;
        assert_eq!(over.winner, Some(id_a.to_string()));

        // The room is no longer full, but the game has already been played.
        let mut late = TcpStream::connect(addr).await.unwrap();
        match read(&mut late).await {
            Packet::Rejected { reason } => assert!(reason.contains("in progress"), "{}", reason),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }
}
