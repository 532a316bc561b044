use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use ecovoyage::render::turn_text;
use ecovoyage::{
    Autocomplete, Conversation, EcoVoyageConfig, SearchGateway, VERSION, logging, web,
};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("ecovoyage error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = EcoVoyageConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;

    match &cli.command {
        None => {
            print_banner(&cli, &config);
            Ok(())
        }
        Some(Commands::Search {
            query,
            json,
            expanded,
        }) => search(&config, &query.join(" "), *json, *expanded).await,
        Some(Commands::Suggest { input, interval_ms }) => {
            suggest(&config, input, Duration::from_millis(*interval_ms)).await
        }
        Some(Commands::Chat { expanded }) => chat(&config, *expanded).await,
        Some(Commands::Serve { port }) => {
            web::run(&config, port.unwrap_or(config.server.port)).await
        }
    }
}

fn print_banner(cli: &Cli, config: &EcoVoyageConfig) {
    println!("🌿 EcoVoyage {VERSION} - Travel Green. Travel Smart.");
    if config.search.uses_fallback_credentials() {
        println!("Using the public demo destination index (no setup required).");
    }
    if cli.verbose {
        let path = cli
            .config
            .clone()
            .or_else(EcoVoyageConfig::get_config_path)
            .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
        println!("Using config from: {path}");
        println!("Search index: {} at {}", config.search.index_name, config.search.base_url());
        println!("Log level: {}", config.logging.level);
    }
    println!();
    println!("Try:");
    println!("  ecovoyage search \"eco-lodges in Costa Rica\"");
    println!("  ecovoyage chat");
    println!("  ecovoyage serve --port {}", config.server.port);
}

async fn search(config: &EcoVoyageConfig, query: &str, json: bool, expanded: bool) -> Result<()> {
    let gateway = SearchGateway::from_config(config)?;
    let mut conversation = Conversation::new();
    let turn = conversation.submit(&gateway, query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(turn)?);
    } else {
        print!("{}", turn_text(turn, expanded, std::io::stdout().is_terminal()));
    }
    Ok(())
}

async fn suggest(config: &EcoVoyageConfig, inputs: &[String], interval: Duration) -> Result<()> {
    let gateway = Arc::new(SearchGateway::from_config(config)?);
    let autocomplete = Autocomplete::new(gateway, &config.autocomplete);
    let mut updates = autocomplete.subscribe();

    for (i, text) in inputs.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(interval).await;
        }
        autocomplete.input(text);
    }

    let state = updates
        .wait_for(|state| !state.pending)
        .await
        .context("autocomplete stopped unexpectedly")?
        .clone();

    if state.suggestions.is_empty() {
        println!("No suggestions.");
    }
    for suggestion in &state.suggestions {
        let location = [suggestion.region.as_str(), suggestion.country.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if location.is_empty() {
            println!("{}", suggestion.name);
        } else {
            println!("{} ({location})", suggestion.name);
        }
    }
    Ok(())
}

async fn chat(config: &EcoVoyageConfig, expanded: bool) -> Result<()> {
    let gateway = SearchGateway::from_config(config)?;
    let mut conversation = Conversation::new();
    let bold = std::io::stdout().is_terminal();

    for turn in conversation.turns() {
        println!("{}", turn_text(turn, expanded, bold));
    }
    println!("Suggestions:");
    for (i, query) in conversation.suggested_queries().iter().enumerate() {
        println!("  {}. {query}", i + 1);
    }
    println!("Type a number to use a suggestion, /quit to leave.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let starters = conversation.suggested_queries();
        let text = match line.parse::<usize>() {
            Ok(n) if (1..=starters.len()).contains(&n) => starters[n - 1],
            _ => line,
        };

        match conversation.submit(&gateway, text).await {
            Ok(turn) => println!("\n{}", turn_text(turn, expanded, bold)),
            Err(e) => eprintln!("{}", e.user_message()),
        }
    }
    Ok(())
}
