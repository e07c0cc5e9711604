use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use discovery::{render_report, DecideOutcome, DiscoveryConfig, LoadOutcome, Notification, Notifier};
use edge_client::EdgeConfig;
use profiles::{Candidate, ViewerId};
use session::{DiscoverySession, SessionOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// YourSpace - Artist Discovery
#[derive(Parser)]
#[command(name = "yourspace-discover")]
#[command(about = "Swipe through artist profiles to like or pass", long_about = None)]
struct Cli {
    /// Project URL hosting the discovery functions
    #[arg(long, env = "YOURSPACE_URL")]
    base_url: Option<String>,

    /// Anonymous API key sent as the `apikey` header
    #[arg(long, env = "YOURSPACE_ANON_KEY")]
    api_key: Option<String>,

    /// Viewer access token sent as a bearer token
    #[arg(long, env = "YOURSPACE_TOKEN")]
    access_token: Option<String>,

    /// Signed-in viewer id; swipes require one
    #[arg(long, env = "YOURSPACE_VIEWER")]
    viewer: Option<String>,

    /// Serve artists from a local catalog file instead of the functions
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Refill once this many unseen cards or fewer remain
    #[arg(long, default_value = "2")]
    refill_threshold: usize,

    /// Artists per batch in offline mode
    #[arg(long, default_value = "10")]
    batch_size: usize,

    /// Shuffle the offline catalog with this seed
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive swipe session: [l]ike, [p]ass, [r]eset, [q]uit
    Swipe {
        /// Stop after this many recorded decisions
        #[arg(long)]
        max: Option<usize>,
    },

    /// Load a batch and list its cards
    Peek,

    /// Show discovery analytics for the viewer
    Analytics {
        /// Number of recent activity rows to show
        #[arg(long, default_value = "5")]
        recent: usize,
    },
}

/// Prints notifications to the terminal as they arrive
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::MutualFollow { .. } => {
                println!("{} {}", "★".magenta(), notification.to_string().magenta().bold())
            }
            Notification::SignInRequired => println!("{} {}", "!".yellow(), notification),
            _ => println!("{} {}", "✗".red(), notification.to_string().red()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let session = open_session(&cli)?;

    match cli.command {
        Commands::Swipe { max } => handle_swipe(&session, max).await?,
        Commands::Peek => handle_peek(&session).await?,
        Commands::Analytics { recent } => handle_analytics(&session, recent).await?,
    }

    Ok(())
}

/// Build a session in offline mode when a catalog is given, remote otherwise
fn open_session(cli: &Cli) -> Result<DiscoverySession> {
    let mut options = SessionOptions::default()
        .with_discovery(DiscoveryConfig::new().with_refill_threshold(cli.refill_threshold))
        .with_notifier(Arc::new(ConsoleNotifier));
    if let Some(viewer) = &cli.viewer {
        options = options.with_viewer(ViewerId::new(viewer.as_str()));
    }

    if let Some(path) = &cli.catalog {
        return DiscoverySession::offline_from_file(path, cli.batch_size, cli.seed, options);
    }

    let Some(base_url) = &cli.base_url else {
        bail!("Either --catalog or --base-url (YOURSPACE_URL) is required");
    };
    let mut edge = EdgeConfig::new(base_url.as_str());
    if let Some(key) = &cli.api_key {
        edge = edge.with_anon_key(key.as_str());
    }
    if let Some(token) = &cli.access_token {
        edge = edge.with_access_token(token.as_str());
    }
    DiscoverySession::remote(edge, options)
}

/// Handle the 'swipe' command
async fn handle_swipe(session: &DiscoverySession, max: Option<usize>) -> Result<()> {
    let stack = session.stack();
    if stack.viewer().await.is_none() {
        println!(
            "{}",
            "Browsing signed out: pass --viewer to record swipes".yellow()
        );
    }

    print_load_outcome(&stack.load_stack().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut liked = 0;
    let mut passed = 0;

    loop {
        if max.is_some_and(|max| liked + passed >= max) {
            break;
        }

        if stack.current().await.is_none() {
            // A refill may still be on its way
            stack.settle().await;
        }
        match stack.current().await {
            Some(card) => {
                print_card(&card);
                if let Some(next) = stack.next().await {
                    println!("   {} {}", "up next:".dimmed(), next.headline().dimmed());
                }
                println!(
                    "{}",
                    format!("[l]ike  [p]ass  [r]eset  [q]uit  ({} left)", stack.remaining_count().await)
                        .dimmed()
                );
            }
            None => {
                println!("{}", "No More Artists Right Now".bold().yellow());
                println!("{}", "[r]eset  [q]uit".dimmed());
            }
        }

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match line.trim() {
            "l" | "like" => match stack.decide(true).await {
                DecideOutcome::Recorded { artist, .. } => {
                    liked += 1;
                    println!("{} Liked {}", "♥".green(), artist);
                }
                outcome => report_unrecorded(&outcome),
            },
            "p" | "pass" => match stack.decide(false).await {
                DecideOutcome::Recorded { artist, .. } => {
                    passed += 1;
                    println!("{} Passed {}", "✕".blue(), artist);
                }
                outcome => report_unrecorded(&outcome),
            },
            "r" | "reset" => print_load_outcome(&stack.reset().await),
            "q" | "quit" => break,
            "" => {}
            other => println!("Unknown command '{}'", other),
        }
    }

    stack.settle().await;
    info!("Swipe session ended: {} liked, {} passed", liked, passed);
    println!(
        "{}",
        format!("Session: {} liked, {} passed", liked, passed).bold()
    );
    Ok(())
}

/// Status line after a load; the notifier has already printed any failure reason
fn load_status(outcome: &LoadOutcome) -> String {
    match outcome {
        LoadOutcome::Loaded { count } => format!("Loaded {} artists", count),
        LoadOutcome::Failed { .. } => "Press r to retry".to_string(),
    }
}

fn print_load_outcome(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Loaded { .. } => println!("{} {}", "✓".green(), load_status(outcome)),
        LoadOutcome::Failed { .. } => println!("{}", load_status(outcome).dimmed()),
    }
}

/// Failures were already shown by the notifier; only the silent cases print
fn report_unrecorded(outcome: &DecideOutcome) {
    match outcome {
        DecideOutcome::NoCandidate => println!("Nothing to swipe on"),
        DecideOutcome::Busy => println!("Still saving the last swipe"),
        _ => {}
    }
}

/// Handle the 'peek' command
async fn handle_peek(session: &DiscoverySession) -> Result<()> {
    let count = session.start().await?;
    println!("{}", format!("Discovery stack ({} artists):", count).bold().blue());

    for (rank, card) in session.stack().pending().await.iter().enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), card.headline());
        if !card.genres.is_empty() {
            println!("   {}", card.genres.join(", "));
        }
    }
    println!("{} remaining", session.stack().remaining_count().await);
    Ok(())
}

/// Handle the 'analytics' command
async fn handle_analytics(session: &DiscoverySession, recent: usize) -> Result<()> {
    let summary = session.analytics_summary().await?;

    println!("{}", "Discovery Analytics".bold().blue());
    for line in render_report(&summary, recent) {
        println!("{}", line);
    }
    Ok(())
}

/// Print the current card
fn print_card(card: &Candidate) {
    println!();
    println!("{}", card.headline().bold());
    if let Some(bio) = &card.bio {
        println!("   {}", bio);
    }
    if !card.genres.is_empty() {
        println!("   {} {}", "genres:".cyan(), card.genres.join(", "));
    }
    println!(
        "   {} {}  {} {}",
        "followers:".cyan(),
        card.follower_count,
        "views:".cyan(),
        card.view_count
    );
    for sample in &card.media_samples {
        println!(
            "   {} {:?} {}",
            "•".green(),
            sample.kind,
            sample.title.as_deref().unwrap_or(&sample.url)
        );
    }
}
