use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use pairlink::RoomId;
use pairlink::peer::{CloseReason, Message, PeerConfig, RoomSession, SessionEvent};
use pairlink::server::ServerConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pairlink", version, about = "Direct two-person chat over WebRTC")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rendezvous service.
    Serve {
        /// Listen address. Overrides PAIRLINK_BIND.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Join a room and chat with whoever else joins it.
    Chat {
        /// Signaling URL. Overrides PAIRLINK_SIGNALING_URL.
        #[arg(long)]
        server: Option<String>,

        #[arg(long, conflicts_with = "create")]
        room: Option<String>,

        /// Create a fresh room and print its id.
        #[arg(long)]
        create: bool,

        /// Seconds allowed for the connection to be negotiated.
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Serve { bind } => {
            let mut config = ServerConfig::from_env();
            if let Some(bind) = bind {
                config.bind = bind;
            }
            println!("{}", format!("Serving on {}", config.bind).green().bold());
            pairlink::server::run(config).await
        }
        Commands::Chat {
            server,
            room,
            create,
            timeout,
        } => {
            let mut config = PeerConfig::from_env();
            if let Some(server) = server {
                config.signaling_url = server;
            }
            if let Some(secs) = timeout {
                config.negotiation_timeout = Duration::from_secs(secs);
            }

            let room = match (room, create) {
                (Some(room), _) => RoomId::from(room),
                (None, true) => RoomId::generate(),
                (None, false) => tokio::task::spawn_blocking(prompt_room).await??,
            };
            chat(config, room).await
        }
    }
}

fn prompt_room() -> Result<RoomId> {
    let input: String = Input::new()
        .with_prompt("Room id (empty to create one)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read room id")?;

    let input = input.trim();
    Ok(if input.is_empty() {
        RoomId::generate()
    } else {
        RoomId::from(input)
    })
}

async fn chat(config: PeerConfig, room: RoomId) -> Result<()> {
    println!("{} {}", "Room:".cyan().bold(), room.as_str().bold());

    let mut session = RoomSession::join(&config, room)
        .await
        .with_context(|| format!("Failed to join via {}", config.signaling_url))?;
    println!(
        "{}",
        format!("Connected as {}. Waiting for a peer...", session.local_id()).cyan()
    );
    println!("{}", "Type a line to send it, /quit to leave.".dimmed());

    let handle = session.handle();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(line) if line.trim() == "/quit" => break,
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    if let Err(e) = handle.send(line).await {
                        println!("{} {}", "!".red().bold(), e);
                    }
                }
                None => break,
            },

            event = session.next_event() => match event {
                Some(event) => print_event(&event),
                None => break,
            },
        }
    }

    session.leave().await;
    println!("{}", "Bye.".cyan());
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::RoleAssigned { peer, role } => {
            println!("{}", format!("Peer {peer} found, connecting as {role}").yellow())
        }
        SessionEvent::Stable { .. } => println!("{}", "Negotiation complete".yellow()),
        SessionEvent::ChannelOpen { .. } => println!("{}", "✨ Channel open, say hi".green().bold()),
        SessionEvent::ChannelClosed { .. } => println!("{}", "Channel closed".yellow()),
        SessionEvent::MessageReceived(message) => print_message(message),
        SessionEvent::MessageSent(_) => {}
        SessionEvent::ContextClosed { reason, .. } => {
            let text = format!("Connection closed: {reason}");
            match reason {
                CloseReason::Left | CloseReason::PeerLeft => println!("{}", text.yellow()),
                _ => println!("{}", text.red()),
            }
        }
        SessionEvent::RoomFull(room) => {
            println!("{}", format!("Room {room} already has two people").red().bold())
        }
        SessionEvent::SignalingLost => println!("{}", "Lost the signaling server".red()),
    }
}

fn print_message(message: &Message) {
    println!(
        "{} {} {}",
        message.received_at.format("%H:%M:%S").to_string().dimmed(),
        format!("{}:", message.from).green().bold(),
        message.value
    );
}
