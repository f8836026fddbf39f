//! # faqbot-cli: A CLI for `faqbot`
//!
//! The executable face of the FAQ answer-resolution library: initializes
//! the knowledge base, answers one-shot questions, and hosts an
//! interactive chat loop.

mod app;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use faqbot::providers::db::sqlite::SqliteProvider;
use faqbot::spawn_sweeper;
use faqbot::types::ResolvedAnswer;
use std::fs::File;
use std::io::{self, Write};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to an alternative config.yml
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the knowledge-base schema, optionally with demo content
    Init(InitArgs),
    /// Resolve a single question and print the answer
    Ask(AskArgs),
    /// Chat with the resolver interactively
    Chat(ChatArgs),
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Also seed a small demonstration knowledge base
    #[arg(long)]
    demo: bool,
}

#[derive(Parser, Debug)]
struct AskArgs {
    /// The question to resolve
    message: String,
    /// Category hint forwarded to the AI prompts
    #[arg(long)]
    category: Option<String>,
    /// Print the full response as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ChatArgs {
    /// Category hint forwarded to the AI prompts
    #[arg(long)]
    category: Option<String>,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging goes to a file so stdout stays clean for answers and JSON.
    let log_file = File::create("faqbot-cli.log")?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = config::get_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Init(args) => handle_init(&config, args).await,
        Commands::Ask(args) => handle_ask(&config, args).await,
        Commands::Chat(args) => handle_chat(&config, args).await,
    }
}

// --- Command Handlers ---

async fn handle_init(config: &config::AppConfig, args: &InitArgs) -> Result<()> {
    info!(db_url = %config.db_url, "initializing knowledge base");
    if let Some(parent) = std::path::Path::new(&config.db_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let provider = SqliteProvider::new(&config.db_url).await?;
    provider.initialize_schema().await?;
    if args.demo {
        provider.seed_demo_data().await?;
        println!(
            "✅ Knowledge base ready at '{}' (demo content seeded).",
            config.db_url
        );
    } else {
        println!("✅ Knowledge base ready at '{}'.", config.db_url);
    }
    Ok(())
}

async fn handle_ask(config: &config::AppConfig, args: &AskArgs) -> Result<()> {
    let app = app::build_app(config).await?;
    let session_id = Uuid::new_v4().to_string();

    let answer = app
        .resolver
        .resolve(&args.message, &session_id, args.category.as_deref())
        .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{}", answer.message);
        print_contacts(&answer);
    }
    Ok(())
}

async fn handle_chat(config: &config::AppConfig, args: &ChatArgs) -> Result<()> {
    let app = app::build_app(config).await?;
    let _sweeper = spawn_sweeper(
        app.sessions.clone(),
        Duration::from_secs(config.session.sweep_interval_secs),
    );
    let session_id = Uuid::new_v4().to_string();

    println!("ผู้ช่วยตอบคำถามพร้อมแล้ว (session {session_id})");
    println!("พิมพ์คำถามแล้วกด Enter | /stats สถิติ | /clear ล้างบริบท | /quit ออก");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("คุณ> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/stats" => {
                let stats = app.resolver.sessions().stats();
                println!("sessions: {} | messages: {}", stats.sessions, stats.messages);
            }
            "/clear" => {
                app.resolver.sessions().clear(&session_id);
                println!("ล้างบริบทการสนทนาแล้ว");
            }
            message => {
                let answer = app
                    .resolver
                    .resolve(message, &session_id, args.category.as_deref())
                    .await;
                println!("บอท> {}", answer.message);
                println!(
                    "(ที่มา: {} | ข้อความในบริบท: {})",
                    answer.source, answer.message_count
                );
                print_contacts(&answer);
            }
        }
    }

    println!("ลาก่อนค่ะ");
    Ok(())
}

fn print_contacts(answer: &ResolvedAnswer) {
    if answer.contacts.is_empty() {
        return;
    }
    println!();
    println!("ช่องทางติดต่อเจ้าหน้าที่:");
    for contact in &answer.contacts {
        println!(
            "  - {} ({}): {}",
            contact.organization, contact.category, contact.contact
        );
    }
}
