//! End-to-end tests: a `GameClient` against a scripted TCP server.
//!
//! The "server" is a raw `tokio::net::TcpStream` that reads and writes
//! frames by hand, playing the part of the hangman server.

use std::time::Duration;

use gallows::prelude::*;
use gallows::protocol::ScoreboardEntry;
use gallows::{GameClientBuilder, Standing};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Builds one frame the way the server would.
fn frame(type_byte: u8, body: &str) -> Vec<u8> {
    let len = (body.len() + 1) as u32;
    let mut bytes = len.to_be_bytes().to_vec();
    bytes.push(type_byte);
    bytes.extend_from_slice(body.as_bytes());
    bytes
}

/// Reads one frame off the server's end.
async fn read_frame(server: &mut TcpStream) -> (u8, String) {
    let mut prefix = [0u8; 4];
    server.read_exact(&mut prefix).await.unwrap();
    let mut body = vec![0u8; u32::from_be_bytes(prefix) as usize];
    server.read_exact(&mut body).await.unwrap();
    let payload = body.split_off(1);
    (body[0], String::from_utf8(payload).unwrap())
}

async fn connected_client() -> (GameClient<TcpConnection>, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let accept = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        stream
    });

    let client = GameClientBuilder::new()
        .server_addr(&addr)
        .connect()
        .await
        .expect("client should connect");
    let server = accept.await.unwrap();
    (client, server)
}

/// Joins as `name` and has the server accept.
async fn joined_client(name: &str) -> (GameClient<TcpConnection>, TcpStream) {
    let (mut client, mut server) = connected_client().await;
    client.join(name).await.unwrap();
    assert_eq!(read_frame(&mut server).await, (0x01, name.to_string()));

    server.write_all(&frame(0x41, r#"{"success":1}"#)).await.unwrap();
    assert_eq!(next_event(&mut client).await.unwrap(), ServerEvent::JoinAccepted);
    (client, server)
}

/// Polls once per 1 ms tick until an event arrives. Gives up after 5 s.
async fn next_event(
    client: &mut GameClient<TcpConnection>,
) -> Result<ServerEvent, ClientError> {
    for _ in 0..5_000 {
        if let Some(event) = client.poll_event()? {
            return Ok(event);
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("no event within 5 seconds");
}

async fn assert_quiet_for(client: &mut GameClient<TcpConnection>, ticks: usize) {
    for _ in 0..ticks {
        assert_eq!(client.poll().expect("should not fail"), Polled::NothingYet);
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

#[tokio::test]
async fn test_join_bob_bytes_on_the_wire() {
    let (mut client, mut server) = connected_client().await;
    assert_eq!(client.state(), ConnectionState::Connected);

    client.join("Bob").await.unwrap();

    let mut buf = [0u8; 8];
    server.read_exact(&mut buf).await.unwrap();
    assert_eq!(buf, [0x00, 0x00, 0x00, 0x04, 0x01, 0x42, 0x6F, 0x62]);
    assert_eq!(client.player_name(), Some("Bob"));
}

#[tokio::test]
async fn test_join_then_game_session() {
    let (mut client, mut server) = joined_client("Alice").await;
    assert_eq!(client.state(), ConnectionState::Joined);

    client.request_scoreboard().await.unwrap();
    assert_eq!(read_frame(&mut server).await, (0x12, String::new()));
    client.request_phrase().await.unwrap();
    assert_eq!(read_frame(&mut server).await, (0x11, String::new()));

    server
        .write_all(&frame(0x52, r#"[{"name": "Alice","score": 0,"fails": 0}]"#))
        .await
        .unwrap();
    server
        .write_all(&frame(0x91, r#"{"phrase": "H_NGM_N"}"#))
        .await
        .unwrap();

    let mut view = GameView::new();
    view.apply(&next_event(&mut client).await.unwrap());
    view.apply(&next_event(&mut client).await.unwrap());
    assert_eq!(view.phrase(), Some("H_NGM_N"));
    assert_eq!(
        view.scoreboard().get("Alice"),
        Some(Standing { score: 0, fails: 0 })
    );

    client.guess('A').await.unwrap();
    assert_eq!(read_frame(&mut server).await, (0x11, "A".to_string()));
}

#[tokio::test]
async fn test_notifications_update_view() {
    let (mut client, mut server) = joined_client("Alice").await;

    server.write_all(&frame(0x81, r#"{"name": "Bob"}"#)).await.unwrap();
    server
        .write_all(&frame(0x92, r#"{"player": "Bob", "score": 3}"#))
        .await
        .unwrap();
    server
        .write_all(&frame(0x93, r#"{"player": "Bob", "fails": 1}"#))
        .await
        .unwrap();
    server.write_all(&frame(0xA1, "{}")).await.unwrap();

    let mut view = GameView::new();
    for _ in 0..4 {
        view.apply(&next_event(&mut client).await.unwrap());
    }

    assert_eq!(view.scoreboard().get("Bob"), Some(Standing { score: 3, fails: 1 }));
    assert_eq!(view.outcome(), Some(Outcome::Won));
    assert_eq!(client.state(), ConnectionState::Joined);
}

#[tokio::test]
async fn test_join_rejected() {
    let (mut client, mut server) = connected_client().await;
    client.join("").await.unwrap();
    server.write_all(&frame(0x41, r#"{"success":0}"#)).await.unwrap();

    assert_eq!(next_event(&mut client).await.unwrap(), ServerEvent::JoinRejected);
    assert_eq!(client.state(), ConnectionState::Rejected);
}

#[tokio::test]
async fn test_request_direction_from_server_is_dropped() {
    let (mut client, mut server) = joined_client("Alice").await;

    server.write_all(&frame(0x11, "Z")).await.unwrap();
    server
        .write_all(&frame(0x91, r#"{"phrase": "Z__"}"#))
        .await
        .unwrap();

    // The REQUEST frame never surfaces; the next event is the phrase.
    assert_eq!(
        next_event(&mut client).await.unwrap(),
        ServerEvent::PhraseRevealed { phrase: "Z__".into() }
    );
}

#[tokio::test]
async fn test_scoreboard_split_across_writes() {
    let (mut client, mut server) = joined_client("Alice").await;
    let bytes = frame(
        0x52,
        r#"[{"name": "Alice","score": 1,"fails": 0},{"name": "Bob","score": 2,"fails": 2}]"#,
    );
    let (head, tail) = bytes.split_at(7);

    server.write_all(head).await.unwrap();
    server.flush().await.unwrap();
    assert_quiet_for(&mut client, 20).await;

    server.write_all(tail).await.unwrap();
    assert_eq!(
        next_event(&mut client).await.unwrap(),
        ServerEvent::Scoreboard(vec![
            ScoreboardEntry { name: "Alice".into(), score: 1, fails: 0 },
            ScoreboardEntry { name: "Bob".into(), score: 2, fails: 2 },
        ])
    );
}

#[tokio::test]
async fn test_leave_is_acknowledged() {
    let (mut client, mut server) = joined_client("Alice").await;

    client.leave().await.unwrap();
    assert_eq!(read_frame(&mut server).await, (0x02, String::new()));
    server.write_all(&frame(0x41, "{}")).await.unwrap();

    assert_eq!(
        next_event(&mut client).await.unwrap(),
        ServerEvent::LeaveAcknowledged
    );
    client.disconnect().await.unwrap();
    assert_eq!(client.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_server_close_mid_prefix_then_double_close() {
    let (mut client, mut server) = joined_client("Alice").await;

    server.write_all(&[0x00, 0x00]).await.unwrap();
    drop(server);

    let err = next_event(&mut client).await.unwrap_err();
    assert!(err.is_connection_closed());
    assert_eq!(client.state(), ConnectionState::Disconnected);

    client.close();
    client.close();
    assert!(matches!(
        client.poll(),
        Err(ClientError::Transport(_))
    ));
}
