use anyhow::Context;
use comms::event::StateEvent;
use rooms::RoomState;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio_stream::{wrappers::LinesStream, StreamExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SESSION_USER_ID: &str = "@me:example.org";
const DEFAULT_ROOM_ID: &str = "!replay:example.org";

/// Reads newline delimited state events from stdin, applies them to a single room
/// and prints the derived title, topic and members
///
/// Usage: `cargo run -p rooms --example replay -- [session user id] [room id] < events.jsonl`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let session_user_id = args
        .next()
        .unwrap_or_else(|| DEFAULT_SESSION_USER_ID.to_string());
    let room_id = args.next().unwrap_or_else(|| DEFAULT_ROOM_ID.to_string());

    let mut room = RoomState::new(room_id, session_user_id);
    let mut lines = LinesStream::new(BufReader::new(io::stdin()).lines());
    let mut applied = 0;

    while let Some(line) = lines.next().await {
        let line = line.context("could not read line from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<StateEvent>(&line) {
            Ok(event) => {
                room.apply_state_event(event);
                applied += 1;
            }
            // skip lines that are not state events, e.g. messages in a dumped timeline
            Err(e) => warn!(error = %e, "skipping line"),
        }
    }

    info!(room_id = %room.room_id(), applied, "replayed state events");

    println!("title: {}", room.title());
    println!("topic: {}", room.topic());

    let mut members: Vec<_> = room.members().values().cloned().collect();
    members.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    for member in members {
        println!(
            "member: {} ({}) {}",
            member.display_name,
            member.user_id,
            member.membership.as_str()
        );
    }

    Ok(())
}
