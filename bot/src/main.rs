use anyhow::{Context, Result};
use clap::Parser;
use rollcall_bot::{
    init_tracing, Actor, BrowserExtractor, Channel, Dispatcher, MessageContext, StaticAuthorizer,
};
use rollcall_core::AppConfig;
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(
    name = "rollcall",
    version,
    about = "Check that thread participants replied on every verification thread"
)]
struct Cli {
    /// Path to config TOML file
    #[arg(long, env = "ROLLCALL_CONFIG")]
    config: Option<PathBuf>,

    /// Name console messages are sent as
    #[arg(long, default_value = "console")]
    actor: String,

    /// Treat the console as a group channel, where only admins may run commands
    #[arg(long)]
    group: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    tracing::info!("Starting Rollcall v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load config".to_string(),
    })?;
    let max_chars = config.transport.max_message_chars;
    for warning in config.startup_warnings() {
        tracing::warn!("{}", warning);
    }

    let authorizer = StaticAuthorizer::new(config.transport.admins.clone());
    let mut dispatcher = Dispatcher::new(BrowserExtractor::new(&config), authorizer)
        .with_max_verification_links(config.transport.max_verification_links);
    let channel = if cli.group {
        Channel::Group
    } else {
        Channel::Private
    };
    let ctx = MessageContext::new(Actor::new(cli.actor), channel);

    let (tx, mut rx) = mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });

    let mut pending = VecDeque::new();
    loop {
        let line = match pending.pop_front() {
            Some(line) => line,
            None => match rx.recv().await {
                Some(line) => line,
                None => break,
            },
        };
        if line.trim().is_empty() {
            continue;
        }

        let replies = dispatcher
            .handle_cancellable(&ctx, &line, &mut rx, &mut pending)
            .await;
        for reply in replies {
            for message in reply.into_messages(max_chars) {
                println!("{message}");
            }
        }
    }

    dispatcher.shutdown().await;
    tracing::info!("Input closed; exiting");
    Ok(())
}
