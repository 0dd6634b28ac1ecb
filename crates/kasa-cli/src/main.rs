//! kasa - multilingual assistant CLI with document and web context

mod chat;
mod commands;
mod config;
mod session;
mod utils;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use kasa_agent::retrieval::{Embedder, FastEmbedder, HttpEmbedder};
use kasa_agent::translate::Passthrough;
use kasa_agent::{
    ContextMode, DuckDuckGoSearch, GhanaNlpTranslator, Orchestrator, OrchestratorConfig,
    OrchestratorEvent, ProviderChatModel, Translator, VectorIndex,
};
use kasa_ai::providers::openai::OpenAIProvider;
use kasa_ai::{Model, Provider};

use chat::ChatSession;
use commands::CommandResult;
use session::SessionStore;

/// kasa - multilingual assistant
#[derive(Parser, Debug)]
#[command(name = "kasa")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (default: openai/gpt-oss-120b)
    #[arg(short, long)]
    model: Option<String>,

    /// Provider (groq, openai, openrouter, ollama)
    #[arg(short, long)]
    provider: Option<String>,

    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Continue a saved session by ID
    #[arg(short, long)]
    session: Option<String>,

    /// Answer language (en, gaa, tw)
    #[arg(short, long)]
    language: Option<String>,

    /// Context mode (chat, rag, web_search, hybrid)
    #[arg(long)]
    mode: Option<String>,

    /// Documents to load before the first turn
    #[arg(short, long, num_args = 1..)]
    docs: Vec<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// List saved sessions
    #[arg(long)]
    sessions: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Delete the transcripts of the session given with --session
    #[arg(long)]
    clear_history: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("kasa=debug,kasa_agent=debug,kasa_ai=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();
    let store = SessionStore::new(cfg.chats_dir());

    // List sessions and exit
    if args.sessions {
        return list_sessions(&store);
    }

    if args.clear_history {
        let Some(ref session_id) = args.session else {
            eprintln!("Error: --clear-history needs --session <id>");
            std::process::exit(1);
        };
        let removed = store.clear(session_id, None)?;
        println!("Removed {} transcript(s) for session {}", removed, session_id);
        return Ok(());
    }

    // Merge config with CLI args (CLI takes precedence)
    let provider = Provider::parse(
        &args
            .provider
            .or(cfg.provider.clone())
            .unwrap_or_else(|| "groq".to_string()),
    );
    let model_id = args
        .model
        .or(cfg.model.clone())
        .unwrap_or_else(|| kasa_ai::models::default_model().id);
    let model = kasa_ai::models::resolve_model(provider, &model_id);

    let llm = match cfg.get_api_key(provider) {
        Some(key) => OpenAIProvider::new(key),
        None if provider.api_key_env_var().is_none() => OpenAIProvider::without_key(),
        None => {
            let api_key_var = provider.api_key_env_var().unwrap_or("GROQ_API_KEY");
            eprintln!("Error: No API key found for {}", provider.name());
            eprintln!();
            eprintln!("Set your API key with: export {}=your-key", api_key_var);
            eprintln!("Or add it to config file: kasa --init-config");
            std::process::exit(1);
        }
    };

    let chat_model = Arc::new(ProviderChatModel::new(Arc::new(llm), model.clone()));
    let orchestrator = Orchestrator::new(
        chat_model,
        Some(Arc::new(DuckDuckGoSearch::new())),
        OrchestratorConfig::default(),
    );

    let translator: Arc<dyn Translator> = match cfg.ghana_nlp_key() {
        Some(key) => Arc::new(GhanaNlpTranslator::new(key)),
        None => {
            tracing::debug!("No GhanaNLP key configured, answers stay in English");
            Arc::new(Passthrough)
        }
    };

    let index = VectorIndex::new(build_embedder(&cfg));

    let resuming = args.session.is_some();
    let session_id = args.session.unwrap_or_else(session::new_session_id);
    let mut chat = ChatSession::new(
        session_id,
        orchestrator,
        translator,
        index,
        Some(store),
        cfg.turn_timeout(),
    );

    if let Some(code) = args.language.or(cfg.language.clone()) {
        if let Err(e) = chat.set_language(&code) {
            eprintln!("{}", e);
        }
    }

    if resuming {
        match chat.resume() {
            Ok(0) => {}
            Ok(count) => println!("Resuming session {} ({} messages)", chat.id(), count),
            Err(e) => {
                eprintln!("Error loading session: {}", e);
                std::process::exit(1);
            }
        }
    }

    if !args.docs.is_empty() {
        let outcome = chat.load_documents(&args.docs).await;
        if outcome.success {
            println!("{}", outcome.message);
        } else {
            eprintln!("{}", outcome.message);
        }
    }

    if let Some(mode) = args.mode.or(cfg.context_mode.clone()) {
        match mode.parse::<ContextMode>().and_then(|m| chat.set_mode(m)) {
            Ok(()) => {}
            Err(e) => eprintln!("{}", e),
        }
    }

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&mut chat, &command, args.verbose).await;
    }

    run_interactive(&mut chat, &model, args.verbose).await
}

fn build_embedder(cfg: &config::Config) -> Arc<dyn Embedder> {
    let settings = &cfg.embeddings;
    match settings.base_url {
        Some(ref base_url) => {
            let model = settings
                .model
                .clone()
                .unwrap_or_else(|| "text-embedding-3-small".to_string());
            let mut embedder = HttpEmbedder::new(base_url.clone(), model);
            if let Some(ref key) = settings.api_key {
                embedder = embedder.with_api_key(key.clone());
            }
            if let Some(dimensions) = settings.dimensions {
                embedder = embedder.with_dimensions(dimensions);
            }
            Arc::new(embedder)
        }
        None => Arc::new(FastEmbedder::new().with_cache_dir(cfg.model_cache_dir())),
    }
}

fn print_notices(receiver: &mut broadcast::Receiver<OrchestratorEvent>, verbose: bool) {
    loop {
        match receiver.try_recv() {
            Ok(OrchestratorEvent::Error { message }) => {
                if verbose {
                    eprintln!("[Error: {}]", message);
                }
            }
            Ok(event) => {
                if let Some(notice) = utils::event_notice(&event, verbose) {
                    println!("{}", notice);
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

async fn run_command(chat: &mut ChatSession, command: &str, verbose: bool) -> anyhow::Result<()> {
    let mut receiver = chat.orchestrator().subscribe();

    let output = chat.turn(command).await;
    print_notices(&mut receiver, verbose);

    println!("kasa> {}", output.display_prompt);
    println!();
    println!("{}", output.display_reply);
    Ok(())
}

async fn run_interactive(
    chat: &mut ChatSession,
    model: &Model,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut receiver = chat.orchestrator().subscribe();

    // Show minimal startup info (only if TTY)
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!(
            "kasa ({}) session: {} | {} | {}",
            model.name,
            chat.id(),
            chat.language().name,
            chat.mode()
        );
        eprintln!("Type /help for commands.");
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if let Some(result) = commands::execute_command(input, chat) {
            match result {
                CommandResult::Clear => {
                    chat.clear_conversation();
                    println!("Cleared conversation.");
                }
                CommandResult::Exit => break,
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::ChangeMode(mode) => match chat.set_mode(mode) {
                    Ok(()) => println!("Mode set to: {} ({})", mode, mode.description()),
                    Err(e) => println!("{}", e),
                },
                CommandResult::ChangeLanguage(code) => match chat.set_language(&code) {
                    Ok(language) => println!("Language set to: {}", language.name),
                    Err(e) => println!("{}", e),
                },
                CommandResult::LoadDocuments(paths) => {
                    println!("Loading {} file(s)...", paths.len());
                    let outcome = chat.load_documents(&paths).await;
                    println!("{}", outcome.message);
                }
                CommandResult::ClearDocuments => {
                    chat.clear_documents();
                    println!("Cleared documents. Mode: {}", chat.mode());
                }
                CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            println!();
            continue;
        }

        let mode_before = chat.mode();
        let output = chat.turn(input).await;
        print_notices(&mut receiver, verbose);

        if output.display_prompt != input {
            println!("({})", utils::truncate_chars(&output.display_prompt, 200));
        }
        println!();
        println!("{}", output.display_reply);
        if output.mode != mode_before {
            println!("[Mode reset to {}]", output.mode);
        }
        println!();
    }

    Ok(())
}

fn list_sessions(store: &SessionStore) -> anyhow::Result<()> {
    match store.list_sessions() {
        Ok(sessions) => {
            if sessions.is_empty() {
                println!("No saved sessions found.");
                println!("Sessions are stored in: {}", store.dir().display());
            } else {
                println!("Saved sessions:\n");
                println!("{:<10} {:<20} Languages", "ID", "Modified");
                println!("{}", "-".repeat(50));
                for s in sessions {
                    println!(
                        "{:<10} {:<20} {}",
                        s.id,
                        s.modified_display(),
                        s.languages.join(", ")
                    );
                }
                println!("\nResume with: kasa --session <session-id>");
            }
        }
        Err(e) => {
            eprintln!("Error listing sessions: {}", e);
        }
    }
    Ok(())
}
