//! Empire Forge - Entry Point
//!
//! Loads the catalog, then runs an interactive loop for generating empires
//! and rerolling individual categories or traits.

use empire_forge::catalog::{CatalogHandle, LoadState};
use empire_forge::core::config::RulesetConfig;
use empire_forge::core::error::Result;
use empire_forge::core::types::SessionId;
use empire_forge::empire::EmpireResponse;
use empire_forge::service::EmpireService;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Parser, Debug)]
#[command(name = "empire-forge")]
#[command(about = "Randomized rule-legal empire setups for 4X strategy games")]
struct Args {
    /// Directory holding the catalog TOML files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// RNG seed for a reproducible session (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "empire_forge=info".into()),
        )
        .init();

    let args = Args::parse();
    tracing::info!(data_dir = %args.data_dir.display(), "Empire Forge starting...");

    let handle = CatalogHandle::load_in_background(args.data_dir.clone());
    wait_for_catalog(&handle)?;

    let config = RulesetConfig::default();
    if let Err(msg) = config.validate() {
        tracing::error!("invalid ruleset configuration: {msg}");
        return Err(empire_forge::core::error::ForgeError::CatalogData(msg));
    }

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let service = EmpireService::new(handle, config);
    let session = SessionId::new();

    println!("\n=== EMPIRE FORGE ===");
    println!("Randomized rule-legal empire setups");
    println!();
    println!("Commands:");
    println!("  generate / g         - Generate a fresh empire");
    println!("  reroll <category>    - Reroll one category (ethics, authority, civic1,");
    println!("                         civic2, origin, traits, homeworld, shipset,");
    println!("                         leader, secondaryspecies)");
    println!("  rerolltrait <id>     - Reroll a single species trait");
    println!("  show / s             - Show the current empire");
    println!("  quit / q             - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        if input == "generate" || input == "g" {
            report(service.generate(session, &mut rng));
            continue;
        }

        if input == "show" || input == "s" {
            report(service.current(session));
            continue;
        }

        if let Some(category) = input.strip_prefix("reroll ") {
            let category = category.trim();
            if category.is_empty() {
                println!("Usage: reroll <category>");
            } else {
                report(service.reroll_category(session, category, &mut rng));
            }
            continue;
        }

        if let Some(trait_id) = input.strip_prefix("rerolltrait ") {
            let trait_id = trait_id.trim();
            if trait_id.is_empty() {
                println!("Usage: rerolltrait <trait id>");
            } else {
                report(service.reroll_trait(session, trait_id, &mut rng));
            }
            continue;
        }

        println!("Unknown command. Available: generate, reroll <category>, rerolltrait <id>, show, quit");
    }

    println!("\nGoodbye!");
    Ok(())
}

/// Block until the background load resolves, bailing out after a generous
/// timeout so a bad data directory does not hang the prompt forever.
fn wait_for_catalog(handle: &CatalogHandle) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs(30);
    loop {
        match handle.state() {
            LoadState::Ready(_) => return Ok(()),
            LoadState::Error(msg) => {
                return Err(empire_forge::core::error::ForgeError::CatalogNotReady(msg))
            }
            LoadState::Loading if Instant::now() >= deadline => {
                return Err(empire_forge::core::error::ForgeError::CatalogNotReady(
                    "timed out waiting for catalog load".into(),
                ))
            }
            LoadState::Loading => std::thread::sleep(Duration::from_millis(25)),
        }
    }
}

fn report(result: Result<EmpireResponse>) {
    match result {
        Ok(response) => {
            if response.unchanged {
                println!("No legal alternative; empire unchanged (reroll not consumed).");
            }
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("Failed to render empire: {e}"),
            }
        }
        Err(e) => println!("Error: {e}"),
    }
}
