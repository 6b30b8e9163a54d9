//! LlamaSearch CLI - Ask anything from the terminal
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use std::sync::Arc;

use anyhow::{anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use llamasearch::controller::{SUGGESTED_QUERIES, TRENDING_QUERY};
use llamasearch::logging::{self, LogTarget};
use llamasearch::{render, ui, Config, DisplayResponse, HttpBackend, SearchController, SearchState};

#[derive(Parser)]
#[command(name = "llamasearch")]
#[command(author, version, about = "Ask anything: from web searches to research analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for an answer
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask what is trending
    Trending {
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the popular searches, or run one
    Suggestions {
        /// Run the suggestion with this number (1-based)
        #[arg(long)]
        run: Option<usize>,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search { query, json }) => {
            let query = query.join(" ");
            one_shot(&query, json).await?;
        }
        Some(Commands::Trending { json }) => {
            one_shot(TRENDING_QUERY, json).await?;
        }
        Some(Commands::Suggestions { run: None, .. }) => {
            print!("{}", render::suggestions(&SUGGESTED_QUERIES));
        }
        Some(Commands::Suggestions { run: Some(number), json }) => {
            let suggestion = number
                .checked_sub(1)
                .and_then(|index| SUGGESTED_QUERIES.get(index))
                .ok_or_else(|| {
                    anyhow!(
                        "no suggestion {}; pick 1 to {}",
                        number,
                        SUGGESTED_QUERIES.len()
                    )
                })?;
            one_shot(suggestion.query, json).await?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "llamasearch", &mut std::io::stdout());
        }
        None => {
            // Default: Launch the TUI
            let config = Config::load()?;
            logging::init(&config.logging, LogTarget::FileOnly)?;
            ui::run(controller(&config)?).await?;
        }
    }

    Ok(())
}

fn controller(config: &Config) -> anyhow::Result<SearchController> {
    let backend = HttpBackend::new(config.backend_url()?)?;
    Ok(SearchController::new(Arc::new(backend)))
}

/// Run a single search and print the outcome
async fn one_shot(query: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    logging::init(&config.logging, LogTarget::Stderr)?;
    let mut controller = controller(&config)?;

    let response = match settled(controller.submit(Some(query)).await) {
        Ok(response) => response,
        Err(failure) => {
            eprintln!("{}", render::error(&failure.to_string()));
            bail!("search for {:?} failed", query);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        print!("{}", render::response(response));
    }

    Ok(())
}

/// The answer of a finished search, or the banner text explaining why there is none
fn settled(state: Option<&SearchState>) -> anyhow::Result<&DisplayResponse> {
    match state {
        None => bail!("Nothing to search for"),
        Some(SearchState::Success(response)) => Ok(response),
        Some(SearchState::Failure(message)) => Err(anyhow!(message.clone())),
        Some(state) => bail!("search did not settle: {:?}", state),
    }
}
