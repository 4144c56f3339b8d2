use std::error::Error;
use std::sync::Arc;

use assistant_stream::prelude::*;
use assistant_stream::init_observability;
use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt as _;

mod terminal;

use terminal::TerminalSink;

#[derive(Parser, Debug)]
#[command(name = "assistant", version, about = "Chat with the assistant backend from a terminal")]
struct Cli {
    /// Backend origin; overrides ASSISTANT_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message and print the reply.
    Chat { message: String },
    /// Interactive session. `/history`, `/clear` and `/exit` are commands.
    Repl,
    /// Print the server-side conversation history.
    History,
    /// Clear the server-side conversation history.
    Clear,
}

fn load_env() {
    let _ = dotenvy::from_path(std::path::Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/.env"
    )));
    dotenvy::dotenv().ok();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    load_env();
    init_observability();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config = config.base_url(base_url);
    }
    let backend = Arc::new(HttpBackend::new(&config)?);

    match cli.command {
        Command::Chat { message } => {
            let chat = spawn_chat(backend, &config);
            if let TurnOutcome::Failed(err) = chat.send(message).await?.outcome().await? {
                return Err(Box::new(err) as Box<dyn Error>);
            }
        }
        Command::Repl => repl(backend, &config).await?,
        Command::History => print_history(&backend).await?,
        Command::Clear => {
            backend.clear_history().await?;
            println!("history cleared");
        }
    }
    Ok(())
}

fn spawn_chat(backend: Arc<HttpBackend>, config: &ClientConfig) -> ChatInputHandle {
    ChatInput::spawn(
        backend,
        Arc::new(TerminalSink::new()),
        Arc::new(PulldownMarkdownRenderer),
        config,
    )
}

async fn repl(backend: Arc<HttpBackend>, config: &ClientConfig) -> Result<(), Box<dyn Error>> {
    let chat = spawn_chat(backend.clone(), config);
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "/exit" | "/quit" => break,
            "/history" => print_history(&backend).await?,
            "/clear" => match backend.clear_history().await {
                Ok(()) => println!("history cleared"),
                Err(err) => eprintln!("error: {err}"),
            },
            message => {
                if let TurnOutcome::Failed(err) = chat.send(message).await?.outcome().await? {
                    tracing::debug!(error = %err, "turn failed");
                }
            }
        }
    }
    Ok(())
}

async fn print_history(backend: &HttpBackend) -> Result<(), Box<dyn Error>> {
    for message in backend.history().await? {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
        println!("{who}: {}", message.content);
    }
    Ok(())
}
