use std::time::Duration;

use gallows::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(view: &GameView, session: &Session) {
    println!();
    match view.phrase() {
        Some(phrase) => println!("  phrase: {phrase}"),
        None => println!("  phrase: (waiting)"),
    }
    if let Some(me) = session.player_name() {
        if let Some(standing) = view.scoreboard().get(me) {
            println!(
                "  you:    {me}  score {}  fails {}",
                standing.score, standing.fails
            );
        }
    }
    for (name, standing) in view.scoreboard().others(session) {
        println!(
            "          {name}  score {}  fails {}",
            standing.score, standing.fails
        );
    }
    match view.outcome() {
        Some(Outcome::Won) => println!("  *** you won ***"),
        Some(Outcome::Lost) => println!("  *** you were hanged ***"),
        None => println!("  guess a letter, '?' for the scoreboard, 'quit' to leave"),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Polls until the server answers the join request.
async fn wait_for_join(
    client: &mut GameClient<TcpConnection>,
    interval: Duration,
) -> Result<bool, ClientError> {
    let mut tick = tokio::time::interval(interval);
    loop {
        tick.tick().await;
        match client.poll_event()? {
            Some(ServerEvent::JoinAccepted) => return Ok(true),
            Some(ServerEvent::JoinRejected) => return Ok(false),
            Some(other) => tracing::debug!(?other, "event before join reply"),
            None => {}
        }
    }
}

async fn play(
    client: &mut GameClient<TcpConnection>,
    interval: Duration,
) -> Result<(), ClientError> {
    client.request_scoreboard().await?;
    client.request_phrase().await?;

    let mut view = GameView::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let mut changed = false;
                for event in client.drain_events()? {
                    changed |= view.apply(&event);
                }
                if changed {
                    render(&view, client.session());
                }
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else {
                    return Ok(());
                };
                match line.trim() {
                    "quit" => return Ok(()),
                    "?" => client.request_scoreboard().await?,
                    "" => {}
                    _ if !view.can_guess() => println!("  the game is over for you"),
                    text => match client.guess_text(text).await {
                        Err(ClientError::Protocol(_)) => println!("  one letter at a time"),
                        other => other?,
                    },
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let [_, host, port, name] = args.as_slice() else {
        eprintln!("usage: console-client <host> <port> <name>");
        std::process::exit(2);
    };

    let config = ClientConfig {
        server_addr: format!("{host}:{port}"),
        ..ClientConfig::default()
    };
    let interval = config.poll_interval;

    let mut client = gallows::GameClientBuilder::from_config(config)
        .connect()
        .await?;
    client.join(name).await?;

    if !wait_for_join(&mut client, interval).await? {
        eprintln!("the server refused the name {name:?}");
        client.disconnect().await?;
        std::process::exit(1);
    }
    println!("joined as {name}");

    let result = play(&mut client, interval).await;
    if client.state().is_in_game() {
        client.leave().await?;
    }
    client.disconnect().await?;

    if let Err(e) = &result {
        if e.is_connection_closed() {
            eprintln!("the server closed the connection");
            return Ok(());
        }
    }
    Ok(result?)
}
