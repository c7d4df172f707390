use std::sync::Arc;

use anyhow::Context;
use broadside::{
    init_logging, AiOpponent, Coord, Event, LobbyConfig, LobbyService, MatchSession, Opponent,
    PlayerSlot, Rules, TurnState, Update,
};
use clap::Parser;
use serde_json::json;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Run an AI vs AI match through the lobby and session stack.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local { seed } => run_local(seed).await,
    }
}

async fn run_local(seed: Option<u64>) -> anyhow::Result<()> {
    let service = Arc::new(LobbyService::new(LobbyConfig::default()));
    let lobby = service.create("local".into(), "ai-one".into()).await;
    service.join(lobby.lobby_id, "ai-two".into()).await?;
    let session_id = service
        .match_for(lobby.lobby_id)
        .await
        .context("joined lobby has no session")?;
    let session = service
        .session(session_id)
        .await
        .context("session not registered")?;

    let rules = session.rules().await;
    let one = drive_seat(session.clone(), PlayerSlot::One, make_ai(&rules, seed, 0));
    let two = drive_seat(session.clone(), PlayerSlot::Two, make_ai(&rules, seed, 1));
    let (shots_one, shots_two) = tokio::try_join!(one, two)?;

    let winner = session.winner().await;
    let result = json!({
        "session": session_id.to_string(),
        "player_one": {"name": session.player_name(PlayerSlot::One), "shots": shots_one},
        "player_two": {"name": session.player_name(PlayerSlot::Two), "shots": shots_two},
        "winner": winner.map(|w| session.player_name(w).to_string()),
    });
    println!("{}", serde_json::to_string(&result)?);

    service.drop_session(session_id).await;
    Ok(())
}

fn make_ai(rules: &Rules, seed: Option<u64>, offset: u64) -> AiOpponent {
    match seed {
        Some(s) => AiOpponent::seeded(rules, s.wrapping_add(offset)),
        None => AiOpponent::new(rules),
    }
}

/// Play one seat as a client would: submit the fleet, then fire whenever a
/// status update says the turn is ours, acknowledging every grid update.
async fn drive_seat(
    session: Arc<MatchSession>,
    seat: PlayerSlot,
    mut ai: AiOpponent,
) -> anyhow::Result<usize> {
    let mut updates = session
        .take_updates(seat)
        .await
        .context("update stream already taken")?;
    let rules = session.rules().await;
    let layout = ai.place_ships(&rules);
    session.handle(seat, Event::GameConfig { layout }).await?;
    session.handle(seat, Event::StatusQuery).await?;

    let mut shots = 0usize;
    let mut in_flight: Option<Coord> = None;
    while let Some(update) = updates.recv().await {
        match update {
            Update::GameStatus {
                state: TurnState::GameOver(_),
                ..
            } => break,
            Update::GameStatus {
                state: TurnState::AwaitingShot(active),
                ..
            } if active == seat && in_flight.is_none() => {
                let coord = ai.calculate_next_shot();
                session.handle(seat, Event::ShotRequest { coord }).await?;
                in_flight = Some(coord);
                shots += 1;
            }
            Update::GridUpdate {
                board,
                coord,
                outcome,
            } => {
                // our own shots are the only ones that land on the enemy board
                if board == seat.opponent() && in_flight == Some(coord) {
                    ai.process_last_shot_result(outcome.is_hit());
                    in_flight = None;
                }
                session
                    .handle(seat, Event::GridUpdateAck { board, coord })
                    .await?;
            }
            _ => {}
        }
    }
    Ok(shots)
}
