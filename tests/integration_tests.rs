//! Integration tests for the number-betting server
//!
//! These tests run a real `GameServer` on a loopback port and talk to it over
//! WebSocket, the same way a browser or the terminal client would.

use futures_util::{SinkExt, StreamExt};
use server::config::GameConfig;
use server::engine::{FixedSource, RoundEngine};
use server::network::GameServer;
use server::registry::PlayerRegistry;
use shared::{Bet, ClientCommand, RoundResult, ServerFrame};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Long enough that only manual `resolve()` calls settle rounds
const MANUAL_PERIOD: Duration = Duration::from_secs(3600);

async fn start_server(period: Duration, winning_number: i64) -> (SocketAddr, Arc<RoundEngine>) {
    let registry = Arc::new(PlayerRegistry::new());
    let config = GameConfig {
        round_period: period,
        ..GameConfig::default()
    };
    let engine = RoundEngine::new(config, registry)
        .expect("Invalid test config")
        .with_source(FixedSource(winning_number));
    let server = GameServer::bind("127.0.0.1:0", engine)
        .await
        .expect("Failed to bind server");
    let addr = server.local_addr().unwrap();
    let engine = Arc::clone(server.engine());
    tokio::spawn(server.run());
    (addr, engine)
}

async fn connect(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{}", addr))
        .await
        .expect("Failed to connect");
    socket
}

async fn send(socket: &mut Socket, text: &str) {
    socket.send(Message::Text(text.to_string())).await.unwrap();
}

async fn register(socket: &mut Socket, nickname: &str) {
    send(socket, &ClientCommand::Nickname(nickname).encode()).await;
}

async fn bet(socket: &mut Socket, nickname: &str, number: i64, amount: f64) {
    let payload = Bet::new(nickname, number, amount).to_json().unwrap();
    send(socket, &ClientCommand::Bet(&payload).encode()).await;
}

async fn next_frame(socket: &mut Socket) -> ServerFrame {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Connection closed")
            .expect("WebSocket error");
        if let Message::Text(text) = message {
            return ServerFrame::parse(&text).expect("Unrecognized frame");
        }
    }
}

/// Frames on one connection are handled in order, so once the error reply to
/// a junk message arrives everything sent before it has been processed.
async fn sync(socket: &mut Socket) {
    send(socket, "PING").await;
    match next_frame(socket).await {
        ServerFrame::Error(message) => assert!(message.starts_with("Valid commands: ")),
        other => panic!("Expected error frame, got {:?}", other),
    }
}

fn expect_summary(frame: ServerFrame) -> RoundResult {
    match frame {
        ServerFrame::Winners(result) => result,
        other => panic!("Expected round summary, got {:?}", other),
    }
}

/// PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    /// Tests that a frame with no known prefix is answered with the usage text
    #[tokio::test]
    async fn unknown_command_gets_usage() {
        let (addr, _engine) = start_server(MANUAL_PERIOD, 1).await;
        let mut socket = connect(addr).await;

        send(&mut socket, "HELLO").await;

        assert_eq!(
            next_frame(&mut socket).await,
            ServerFrame::Error(shared::USAGE_MESSAGE.to_string())
        );
    }

    /// Tests that bets from an unregistered nickname are refused and never queued
    #[tokio::test]
    async fn bet_before_registration_rejected() {
        let (addr, engine) = start_server(MANUAL_PERIOD, 1).await;
        let mut socket = connect(addr).await;

        bet(&mut socket, "Stranger", 3, 50.0).await;

        assert_eq!(
            next_frame(&mut socket).await,
            ServerFrame::Error("Register player first, then place bet".to_string())
        );
        assert_eq!(engine.pending_count().await, 0);
    }

    /// Tests every validation rejection plus the undecodable-payload error
    #[tokio::test]
    async fn invalid_bets_rejected() {
        let (addr, engine) = start_server(MANUAL_PERIOD, 1).await;
        let mut socket = connect(addr).await;
        register(&mut socket, "Player1").await;

        bet(&mut socket, "Player1", 11, 10.0).await;
        bet(&mut socket, "Player1", 5, 0.0).await;
        send(&mut socket, "BET:null").await;

        for _ in 0..3 {
            assert_eq!(
                next_frame(&mut socket).await,
                ServerFrame::Error("Error placing bet: Invalid bet".to_string())
            );
        }

        // Undecodable JSON is a general error, not an invalid bet
        send(&mut socket, "BET:{not json").await;
        match next_frame(&mut socket).await {
            ServerFrame::Error(message) => assert!(message.starts_with("General error: ")),
            other => panic!("Expected general error, got {:?}", other),
        }

        assert_eq!(engine.pending_count().await, 0);
    }
}

/// ROUND SETTLEMENT TESTS
mod round_tests {
    use super::*;

    /// Tests a full round with one winning and one losing player
    #[tokio::test]
    async fn two_players_one_winner() {
        let (addr, engine) = start_server(MANUAL_PERIOD, 2).await;
        let mut alice = connect(addr).await;
        let mut bob = connect(addr).await;

        // Both players register and bet before the draw
        register(&mut alice, "Alice").await;
        register(&mut bob, "Bob").await;
        bet(&mut alice, "Alice", 2, 10.0).await;
        bet(&mut bob, "Bob", 5, 10.0).await;
        sync(&mut alice).await;
        sync(&mut bob).await;
        assert_eq!(engine.pending_count().await, 2);

        // Draw 2: Alice wins 10 x 9.9
        let result = engine.resolve().await;
        assert_eq!(result.winning_number, 2);
        assert_eq!(result.winners.len(), 1);

        assert_eq!(next_frame(&mut alice).await, ServerFrame::Win(99.0));
        let summary = expect_summary(next_frame(&mut alice).await);
        assert_eq!(summary, result);

        assert_eq!(next_frame(&mut bob).await, ServerFrame::Lose);
        let summary = expect_summary(next_frame(&mut bob).await);
        assert_eq!(summary.winner("Alice").map(|w| w.amount), Some(99.0));
        assert!(summary.winner("Bob").is_none());
    }

    /// Tests that a registered player without a bet still receives the summary
    #[tokio::test]
    async fn watcher_only_sees_summary() {
        let (addr, engine) = start_server(MANUAL_PERIOD, 7).await;
        let mut watcher = connect(addr).await;
        let mut player = connect(addr).await;

        register(&mut watcher, "Watcher").await;
        register(&mut player, "Player").await;
        bet(&mut player, "Player", 7, 1.0).await;
        sync(&mut watcher).await;
        sync(&mut player).await;

        engine.resolve().await;

        let summary = expect_summary(next_frame(&mut watcher).await);
        assert_eq!(summary.winning_number, 7);
        assert_eq!(summary.winners.len(), 1);
        assert_eq!(summary.winners[0].nickname, "Player");
    }

    /// Tests that a settled bet is not carried into the next round
    #[tokio::test]
    async fn pending_bets_settle_once() {
        let (addr, engine) = start_server(MANUAL_PERIOD, 4).await;
        let mut socket = connect(addr).await;

        register(&mut socket, "Once").await;
        bet(&mut socket, "Once", 4, 2.0).await;
        sync(&mut socket).await;

        engine.resolve().await;
        assert_eq!(next_frame(&mut socket).await, ServerFrame::Win(19.8));
        expect_summary(next_frame(&mut socket).await);

        let second = engine.resolve().await;
        assert!(second.winners.is_empty());
        // Only the empty summary arrives for the second round
        let summary = expect_summary(next_frame(&mut socket).await);
        assert!(summary.winners.is_empty());
        assert_eq!(engine.rounds_resolved(), 2);
    }

    /// Tests that the server's own timer settles rounds without manual resolves
    #[tokio::test]
    async fn timer_settles_rounds() {
        let (addr, _engine) = start_server(Duration::from_millis(200), 3).await;
        let mut socket = connect(addr).await;

        register(&mut socket, "Timed").await;
        bet(&mut socket, "Timed", 3, 5.0).await;

        // Empty rounds may settle before the bet lands; the first outcome
        // frame is always followed by its round's summary.
        let outcome = loop {
            match next_frame(&mut socket).await {
                ServerFrame::Winners(_) => continue,
                frame => break frame,
            }
        };
        assert_eq!(outcome, ServerFrame::Win(49.5));

        let summary = expect_summary(next_frame(&mut socket).await);
        assert_eq!(summary.winner("Timed").map(|w| w.amount), Some(49.5));
    }
}

/// CONNECTION LIFECYCLE TESTS
mod lifecycle_tests {
    use super::*;

    /// Tests that registering a taken nickname moves it to the new connection
    #[tokio::test]
    async fn reregistration_moves_nickname() {
        let (addr, engine) = start_server(MANUAL_PERIOD, 1).await;
        let mut first = connect(addr).await;
        let mut second = connect(addr).await;

        register(&mut first, "Nomad").await;
        sync(&mut first).await;
        register(&mut second, "Nomad").await;
        bet(&mut second, "Nomad", 1, 1.0).await;
        sync(&mut second).await;

        engine.resolve().await;

        assert_eq!(next_frame(&mut second).await, ServerFrame::Win(9.9));
        expect_summary(next_frame(&mut second).await);

        // The first connection no longer answers to any nickname, so it hears nothing
        let quiet = tokio::time::timeout(Duration::from_millis(200), first.next()).await;
        assert!(quiet.is_err());
    }

    /// Tests that closing the socket drops the player's nickname
    #[tokio::test]
    async fn disconnected_player_is_forgotten() {
        let (addr, engine) = start_server(MANUAL_PERIOD, 1).await;
        let mut socket = connect(addr).await;

        register(&mut socket, "Ghost").await;
        sync(&mut socket).await;
        assert!(engine.registry().lookup("Ghost").await.is_some());

        socket.close(None).await.unwrap();

        // Cleanup runs on the server's connection task, so poll for it
        let mut removed = false;
        for _ in 0..100 {
            if engine.registry().lookup("Ghost").await.is_none() {
                removed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(removed);
    }

    /// Tests the terminal client end to end: register, bet, quit
    #[tokio::test]
    async fn terminal_client_places_bet() {
        let (addr, engine) = start_server(MANUAL_PERIOD, 6).await;

        let mut client = client::network::Client::new(&format!("ws://{}", addr), "Typist");
        let input = tokio::io::BufReader::new(&b"bet 6 3\nquit\n"[..]);
        client.run_with_input(input).await.unwrap();

        let mut queued = false;
        for _ in 0..100 {
            if engine.pending_count().await == 1 {
                queued = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(queued);
    }
}
