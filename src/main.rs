//! VoiceBrain - Continuous Voice Control
//!
//! Wires a recognizer backend to the listening controller and the command
//! dispatcher, and keeps the session alive until a quit phrase or Ctrl-C.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use voicebrain::config::Config;
use voicebrain::controller::{AlwaysFocused, ListeningController, RestartPolicy, Status};
use voicebrain::dispatch::CommandDispatcher;
use voicebrain::graph::GraphClient;
use voicebrain::llm::GroqClient;
use voicebrain::page::LoggingPageDriver;
use voicebrain::recognizer::create_recognizer;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Recognizer backend to use (overrides config)
    #[arg(short, long)]
    recognizer: Option<String>,

    /// Disable automatic session restarts
    #[arg(long)]
    no_restart: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🧠 VoiceBrain v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load()?;
    if let Some(recognizer) = args.recognizer {
        config.recognizer = recognizer;
    }
    if args.no_restart {
        config.auto_restart = false;
    }

    // Command dispatcher with optional LLM and knowledge-graph collaborators
    let driver = Arc::new(LoggingPageDriver);
    let mut dispatcher = CommandDispatcher::new(driver, &config);

    let llm = GroqClient::new(&config);
    if llm.is_enabled() {
        if llm.health_check().await {
            info!("🤖 Groq LLM fallback enabled ({})", config.groq_model);
        } else {
            warn!("Groq configured but unreachable, continuing without it");
        }
        dispatcher.set_llm(llm);
    }

    let graph = GraphClient::new(&config);
    if graph.is_enabled() {
        info!("🗂️ Knowledge graph enabled at {}", config.neo4j_url);
        dispatcher.set_graph(graph);
    }

    let quit = dispatcher.quit_signal();

    // Recognizer + controller
    let (recognizer, events) = create_recognizer(&config)?;
    let policy = RestartPolicy::from_config(&config);
    let (handle, mut status_rx) = ListeningController::spawn(
        recognizer,
        events,
        Box::new(dispatcher),
        policy,
        Box::new(AlwaysFocused),
    );

    // Surface lifecycle transitions the way the UI layer would
    let status_task = tokio::spawn(async move {
        while let Some(status) = status_rx.recv().await {
            match status {
                Status::Started => info!("🎙️ Listening"),
                Status::Stopped => info!("🔇 Stopped"),
                Status::RestartScheduled { attempt, delay } => {
                    info!("🔁 Restart {} in {:?}", attempt, delay)
                }
                Status::RestartExhausted => {
                    warn!("Restart budget exhausted, say nothing more or restart manually")
                }
                Status::Error { kind, fatal } => {
                    if fatal {
                        warn!("❌ Fatal recognizer error: {}", kind);
                    } else {
                        warn!("⚠️ Recognizer error: {}", kind);
                    }
                }
            }
        }
    });

    handle.start();
    info!("✅ VoiceBrain ready - speak a command");
    info!("   Try: 'scroll down', 'go back', 'type hello', 'help', 'stop listening'");

    tokio::select! {
        _ = quit.notified() => info!("Quit command received"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    handle.stop();
    drop(handle);
    status_task.await.ok();

    Ok(())
}
