use castplay::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Move { row: i32, column: i32 },
    Join(String),
    Board,
    Leave,
    Quit,
    Help,
}

const HELP: &str = "commands: <row> <column> | join <name> | board | leave | quit";

fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Err("empty input".into());
    };
    let input = match first {
        "join" => {
            let name = words.collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                return Err("join needs a name".into());
            }
            return Ok(Input::Join(name));
        }
        "board" => Input::Board,
        "leave" => Input::Leave,
        "quit" | "exit" => Input::Quit,
        "help" | "?" => Input::Help,
        row => {
            let column = words.next().ok_or("expected <row> <column>")?;
            let row = row.parse().map_err(|_| format!("bad row: {row}"))?;
            let column = column.parse().map_err(|_| format!("bad column: {column}"))?;
            Input::Move { row, column }
        }
    };
    match words.next() {
        Some(extra) => Err(format!("unexpected: {extra}")),
        None => Ok(input),
    }
}

// ---------------------------------------------------------------------------
// Event printing
// ---------------------------------------------------------------------------

/// Keeps a [`GameView`] and prints what changed after each event.
struct Console {
    view: GameView,
}

impl EventHandler for Console {
    fn on_event(&mut self, event: Event, stream: &GameStream) {
        self.view.on_event(event.clone(), stream);
        match &event {
            Event::Joined { player, opponent } => {
                println!("joined as {player} against {opponent}");
            }
            Event::Moved { player, row, column, .. } => {
                println!("{player} played {row} {column}");
            }
            Event::EndGame { .. } => {
                if let Phase::Finished(outcome) = self.view.phase() {
                    println!("game over: {outcome}");
                }
            }
            Event::Error { message } => println!("error: {message}"),
            Event::BoardLayoutResponse { .. } => {}
        }
        println!("{}", self.view.board());
        if self.view.is_our_turn() {
            println!("your move");
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = SessionConfig {
        url: args.next().unwrap_or_else(|| SessionConfig::default().url),
        player_name: args.next(),
        ..SessionConfig::default()
    };

    let mut session = GameSession::builder()
        .config(config)
        .connect(Console { view: GameView::new() })
        .await?;
    let stream = session.stream().clone();
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            () = session.closed() => {
                println!("authority closed the channel");
                break;
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match parse_input(&line) {
            Ok(Input::Move { row, column }) => stream.make_move(row, column),
            Ok(Input::Join(name)) => stream.join(&name),
            Ok(Input::Board) => stream.request_board_layout(),
            Ok(Input::Leave) => stream.leave(),
            Ok(Input::Quit) => break,
            Ok(Input::Help) => println!("{HELP}"),
            Err(e) => println!("{e}\n{HELP}"),
        }
    }

    session.end().await?;
    Ok(())
}
