// Form Copilot - terminal entry point

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use form_copilot::commands::chat::{greeting, handle_input, ChatInput};
use form_copilot::models::settings::SettingsUpdate;
use form_copilot::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "form-copilot", about = "Fill a form by chatting with a copilot")]
struct Args {
    /// Path to config.json (defaults to ~/.form-copilot/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model name, overriding the config file
    #[arg(long)]
    model: Option<String>,

    /// Chat-completions endpoint, overriding the config file
    #[arg(long)]
    base_url: Option<String>,

    /// Collaborator timeout per turn, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the chat on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "form_copilot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let overrides = SettingsUpdate {
        model: args.model,
        base_url: args.base_url,
        turn_timeout_secs: args.timeout_secs,
        ..Default::default()
    };

    let state = AppState::initialize(args.config, overrides)?;
    let orchestrator = state.orchestrator();
    let mut session = orchestrator.start_session();

    println!("{}", greeting(&session));
    println!("(type /help for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let reply = handle_input(orchestrator, &mut session, ChatInput::parse(&line)).await?;
        for text in &reply.lines {
            println!("{}\n", text);
        }
        if reply.exit {
            break;
        }
    }

    Ok(())
}
