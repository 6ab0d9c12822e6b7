//! huddle binary - composition root.
//!
//! 1. Load configuration from TOML
//! 2. Build the model client and downstream integrations
//! 3. Register capabilities and build the turn router
//! 4. Answer one `--once` utterance, or read utterances from stdin

mod cli;
mod signal;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use huddle_action::capability::{
    HttpWorkTracker, LogNotifier, Notifier, WebhookNotifier, WorkTracker,
};
use huddle_action::CapabilityRegistry;
use huddle_chat::{ChatError, TurnResponse, TurnRouter};
use huddle_core::HuddleConfig;
use huddle_llm::{HttpModelService, ModelService};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::cli::CliArgs;
use crate::signal::TurnSignal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let config_file = args.resolve_config_path();
    let config = HuddleConfig::load_or_default(&config_file);

    // Tracing goes to stderr so stdout carries responses only.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting huddle v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let model = HttpModelService::from_config(&config.llm)?;
    tracing::info!(
        model = %config.llm.model,
        format = ?model.api_format(),
        "Model service ready"
    );
    let model: Arc<dyn ModelService> = Arc::new(model);

    let tracker: Arc<dyn WorkTracker> = Arc::new(HttpWorkTracker::from_config(&config.work_tracker)?);
    let notifier: Arc<dyn Notifier> = match &config.notification.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(
            url.clone(),
            Duration::from_secs(config.notification.request_timeout_secs),
        )?),
        None => {
            tracing::info!("No notification webhook configured, notifications are only logged");
            Arc::new(LogNotifier)
        }
    };

    let registry = Arc::new(CapabilityRegistry::with_defaults(&config, tracker, notifier));
    let router = TurnRouter::new(model, registry, &config);

    let signal = Arc::new(TurnSignal::new());
    let listener = signal.listen();
    let outcome = match args.once.as_deref() {
        Some(utterance) => run_once(&router, &signal, utterance, args.json).await,
        None => run_interactive(&router, &signal, args.json).await,
    };
    listener.abort();
    outcome
}

async fn run_once(
    router: &TurnRouter,
    signal: &TurnSignal,
    utterance: &str,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let cancel = signal.begin_turn();
    let outcome = router.handle_turn(utterance, None, &cancel).await;
    signal.end_turn();

    let (response, _) = outcome?;
    print_response(&response, json)
}

/// One utterance per line until EOF or an idle Ctrl-C. `/reset` starts a
/// new conversation.
async fn run_interactive(
    router: &TurnRouter,
    signal: &TurnSignal,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    eprintln!("huddle ready. Ctrl-C cancels a running turn or quits when idle, /reset starts over.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session: Option<Uuid> = None;

    loop {
        let line = tokio::select! {
            _ = signal.shutdown().cancelled() => break,
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/reset" {
            if let Some(sid) = session.take() {
                if let Err(e) = router.delete_session(sid) {
                    tracing::debug!(error = %e, "Nothing to reset");
                }
            }
            eprintln!("Conversation reset.");
            continue;
        }

        let cancel = signal.begin_turn();
        let outcome = router.handle_turn(line, session, &cancel).await;
        signal.end_turn();

        match outcome {
            Ok((response, sid)) => {
                session = Some(sid);
                print_response(&response, json)?;
            }
            Err(ChatError::Cancelled { completed }) => {
                eprintln!("Cancelled. {} action(s) had already completed.", completed);
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                eprintln!("Error: {}", e);
            }
        }
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}

fn print_response(response: &TurnResponse, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string(response)?);
        return Ok(());
    }
    if response.action.is_some() {
        println!("{}\n", response.spoken);
    }
    println!("{}", response.display);
    Ok(())
}
