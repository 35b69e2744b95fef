use std::path::PathBuf;
use std::sync::Arc;

use artikel_quiz::config::Configuration;
use artikel_quiz::export::{ExportFormat, LearnedWordsFilter};
use artikel_quiz::quiz::QuizSession;
use artikel_quiz::scrape::{HttpFetcher, Leo, PageFetcher, Verbformen, WordSource};
use artikel_quiz::terminal::{self, Frame, Input};
use artikel_quiz::{logging, Difficulty, SqliteStore, WordAcquisition, WordStore};
use clap::{Parser, Subcommand};
use miette::{Context, IntoDiagnostic, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::info;
use url::Url;

#[derive(Parser)]
#[command(name = "artikel-quiz", about = "Practise the articles of German nouns", version)]
struct Cli {
    /// Configuration file (default: <config dir>/artikel-quiz/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Word database, overrides the configured path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Play the quiz in the terminal (default)
    Play,

    /// List learned words
    Learned {
        /// Only words of this difficulty (beginner, intermediate, advanced)
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Case-insensitive search in the German word and English meaning
        #[arg(long)]
        search: Option<String>,
        /// table, csv, md or json
        #[arg(long, default_value = "table")]
        format: ExportFormat,
    },

    /// Replace the stored words with a fresh scrape
    Refresh,

    /// Delete every stored word
    Clear,
}

fn build_sources(configuration: &Configuration) -> Result<Vec<Arc<dyn WordSource>>> {
    let scraping = &configuration.scraping;
    let fetcher: Arc<dyn PageFetcher> = Arc::new(
        HttpFetcher::new(&scraping.user_agent, scraping.request_timeout())
            .into_diagnostic()
            .wrap_err("Could not build the HTTP client.")?,
    );

    let verbformen_url = Url::parse(&scraping.verbformen_url)
        .into_diagnostic()
        .wrap_err("Invalid verbformen URL.")?;
    let leo_url = Url::parse(&scraping.leo_url)
        .into_diagnostic()
        .wrap_err("Invalid leo URL.")?;

    let verbformen: Arc<dyn WordSource> = Arc::new(
        Verbformen::new(Arc::clone(&fetcher), verbformen_url)
            .with_max_candidates(scraping.max_candidates_per_source),
    );
    let leo: Arc<dyn WordSource> =
        Arc::new(Leo::new(fetcher, leo_url).with_max_candidates(scraping.max_candidates_per_source));

    // verbformen first: it wins on duplicates
    Ok(vec![verbformen, leo])
}

async fn render_loop(mut snapshots: watch::Receiver<artikel_quiz::QuizSnapshot>) {
    let mut last_frame = None;
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        let frame = Frame::of(&snapshot);
        if last_frame == Some(frame) {
            continue;
        }
        last_frame = Some(frame);
        if let Some(text) = terminal::render_snapshot(&snapshot) {
            println!("\n{}", text);
        }
    }
}

async fn play(session: QuizSession) -> Result<()> {
    let renderer = tokio::spawn(render_loop(session.subscribe()));
    println!("{}", terminal::HELP);
    session.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .into_diagnostic()
        .wrap_err("Could not read from stdin.")?
    {
        let answer = match terminal::parse_input(&line) {
            Input::Quit => break,
            Input::Empty => continue,
            Input::Help => {
                println!("{}", terminal::HELP);
                continue;
            }
            Input::ToggleMode => {
                session.toggle_mode();
                continue;
            }
            Input::Skip => {
                session.advance();
                continue;
            }
            Input::Reset => {
                session.reset();
                continue;
            }
            Input::Learned => {
                let learned = LearnedWordsFilter::default().apply(&session.snapshot().learned_words);
                print!(
                    "{}",
                    ExportFormat::Table
                        .render(&learned)
                        .into_diagnostic()?
                );
                continue;
            }
            Input::Article(article) => session.answer_with_article(article),
            Input::Text(text) => session.answer_with_text(&text),
        };
        match answer {
            Ok(outcome) => println!("{}", terminal::render_outcome(&outcome)),
            Err(err) => println!("{}", terminal::render_answer_error(&err)),
        }
    }

    let snapshot = session.snapshot();
    println!(
        "\nFinal score {}/{}, {} words learned.",
        snapshot.score,
        snapshot.total_questions,
        snapshot.learned_words.len()
    );
    renderer.abort();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let configuration = Configuration::load(cli.config.as_deref())
        .into_diagnostic()
        .wrap_err("Could not load configuration.")?;
    logging::initialize_tracing(&configuration.logging.level)
        .into_diagnostic()
        .wrap_err("Could not set up logging.")?;

    let database_path = match cli.database {
        Some(path) => path,
        None => configuration
            .database_path()
            .into_diagnostic()
            .wrap_err("Could not determine the database path.")?,
    };
    let store = Arc::new(SqliteStore::new(&database_path));
    info!(database = %store.location(), "using word store");

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => {
            let acquisition = WordAcquisition::new(store, build_sources(&configuration)?);
            play(QuizSession::new(
                acquisition,
                configuration.quiz.session_settings(),
            ))
            .await
        }
        Command::Learned {
            difficulty,
            search,
            format,
        } => {
            let learned = store
                .get_learned()
                .await
                .into_diagnostic()
                .wrap_err("Could not read learned words.")?;
            let filter = LearnedWordsFilter { difficulty, search };
            let output = format
                .render(&filter.apply(&learned))
                .into_diagnostic()
                .wrap_err("Could not format learned words.")?;
            print!("{}", output);
            Ok(())
        }
        Command::Refresh => {
            let acquisition = WordAcquisition::new(store.clone(), build_sources(&configuration)?);
            let words = acquisition
                .refresh()
                .await
                .into_diagnostic()
                .wrap_err("Could not refresh words.")?;
            println!("Stored {} words in {}.", words.len(), store.location());
            Ok(())
        }
        Command::Clear => {
            let count = store.count().await.into_diagnostic()?;
            store
                .clear()
                .await
                .into_diagnostic()
                .wrap_err("Could not clear the word store.")?;
            println!("Removed {} words from {}.", count, store.location());
            Ok(())
        }
    }
}
