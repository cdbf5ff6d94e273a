//! `reelbot ask`: single-question or interactive mode.

use std::sync::Arc;
use reelbot_agent::{QueryOutcome, QueryProcessor};
use reelbot_config::AppConfig;
use reelbot_core::event::EventBus;
use reelbot_core::message::ConversationHistory;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let processor = match QueryProcessor::from_config(&config, Arc::new(EventBus::default())) {
        Ok(p) => p,
        Err(e) => {
            eprintln!();
            eprintln!("  ERROR: {e}");
            eprintln!();
            eprintln!("  Set one of these environment variables:");
            eprintln!("    GROQ_API_KEY     = 'gsk_...'   (default backend)");
            eprintln!("    OPENAI_API_KEY   = 'sk-...'    (with REELBOT_PROVIDER=openai)");
            eprintln!("    REELBOT_API_KEY  = '...'       (generic)");
            eprintln!();
            eprintln!("  Or add it to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            return Err(e.into());
        }
    };
    tracing::debug!(model = %processor.agent().model(), "Query processor ready");

    if let Some(msg) = message {
        eprint!("  Looking it up...");
        let outcome = processor.process_query(&msg, &[]).await;
        eprint!("\r                   \r");
        print_outcome(&outcome);
        if !outcome.is_success() && !matches!(outcome, QueryOutcome::Rejected { .. }) {
            return Err("query failed".into());
        }
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         ReelBot  Interactive Mode           ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Catalog:   {}", config.catalog.base_url);
    println!();
    println!("  Ask for a movie or an episode, e.g. \"Watch Breaking Bad season 1 episode 8\".");
    println!("  Type 'reset' to forget the conversation, 'exit' or Ctrl+D to quit.");
    println!();

    let mut history = ConversationHistory::new(config.gateway.history_limit);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => break,
            "reset" => {
                history.clear();
                println!("  Conversation reset.");
                println!();
                continue;
            }
            _ => {}
        }

        eprint!("  ...");
        let outcome = processor.process_query(line, &history.entries()).await;
        eprint!("\r     \r");
        println!();
        print_outcome(&outcome);
        println!();

        if let QueryOutcome::Answered { output } = &outcome {
            history.record_exchange(line, output.as_str());
        }
    }

    println!();
    println!("  Goodbye! 🍿");
    println!();
    Ok(())
}

fn print_outcome(outcome: &QueryOutcome) {
    match outcome {
        QueryOutcome::Answered { output } => {
            for line in output.lines() {
                println!("  {line}");
            }
        }
        QueryOutcome::Rejected { reason } => println!("  [Not a streaming request] {reason}"),
        QueryOutcome::Failed { error } => eprintln!("  [Error] {error}"),
    }
}
