use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use dashboard_assistant::chat::RejectReason;
use dashboard_assistant::{App, Config, Message, NavbarVariant, Period, SendOutcome};

/// Dashboard Assistant - AI business assistant for small businesses
#[derive(Parser)]
#[command(name = "assistant", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the assistant (default)
    Chat,
    /// Print the aggregated context for the signed-in user
    Context,
    /// Show the navbar for the current identity
    Whoami {
        /// Navbar variant: landing or dashboard
        #[arg(long, default_value = "dashboard")]
        variant: String,
    },
    /// Test the connection to the data service
    Check,
    /// Sign out locally
    Logout,
    /// Show websites, analytics and email campaigns for a period
    Analytics {
        /// Period: 7d, 30d or 90d
        #[arg(short, long, default_value = "30d")]
        period: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,dashboard_assistant=info",
        1 => "info,dashboard_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load();
    tracing::debug!(?config, "loaded configuration");

    let mut app = App::new(config);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => cmd_chat(&app).await,
        Command::Context => cmd_context(&app).await,
        Command::Whoami { variant } => cmd_whoami(&app, &variant),
        Command::Check => cmd_check(&app).await,
        Command::Logout => {
            app.logout()?;
            println!("Signed out");
            Ok(())
        }
        Command::Analytics { period } => cmd_analytics(&app, &period).await,
    }
}

/// Interactive chat loop; `/quit` or end of input exits
async fn cmd_chat(app: &App) -> anyhow::Result<()> {
    let session = app.start_chat()?;

    let navbar = app.navbar(NavbarVariant::Dashboard);
    if navbar.is_authenticated() {
        println!("Signed in as {} <{}>", navbar.display_name(), navbar.email());
    } else {
        println!("Not signed in; answers won't use your business details");
    }
    println!("Type /quit to exit\n");

    for message in session.transcript() {
        print_message(&message);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        println!("AI is thinking...");
        match session.send(&line).await {
            SendOutcome::Replied(message) | SendOutcome::Fallback(message) => {
                print_message(&message);
            }
            SendOutcome::Rejected(RejectReason::Busy) => {
                println!("Still waiting for the previous reply");
            }
            SendOutcome::Rejected(RejectReason::Empty) => {}
        }
    }

    tracing::debug!(
        session_id = %session.id(),
        messages = session.transcript().len(),
        "chat ended"
    );
    Ok(())
}

fn print_message(message: &Message) {
    println!(
        "[{}] {}: {}\n",
        message.sent_at.format("%H:%M"),
        message.sender,
        message.text
    );
}

/// Print the aggregated context as JSON
async fn cmd_context(app: &App) -> anyhow::Result<()> {
    let Some(context) = app.load_context().await else {
        anyhow::bail!("not signed in");
    };
    println!("{}", serde_json::to_string_pretty(&context)?);
    Ok(())
}

/// Print the navbar model
fn cmd_whoami(app: &App, variant: &str) -> anyhow::Result<()> {
    let variant = NavbarVariant::parse(variant)
        .ok_or_else(|| anyhow::anyhow!("unknown navbar variant: {variant}"))?;
    let navbar = app.navbar(variant);

    println!("{} ({})", navbar.display_name(), navbar.initials());
    println!("{}", navbar.email());
    if !navbar.is_authenticated() {
        println!("(not signed in)");
    }
    println!();
    for link in navbar.links() {
        println!("  {:<12} {:?}", link.label, link.action);
    }
    Ok(())
}

/// Test the connection to the data service
async fn cmd_check(app: &App) -> anyhow::Result<()> {
    if app.config().store_is_placeholder() {
        println!("Warning: data service is still using placeholder settings");
    }
    app.records().check_connection().await?;
    println!("Connected to {}", app.config().store.url);
    Ok(())
}

/// Print the analytics overview for the signed-in user
async fn cmd_analytics(app: &App, period: &str) -> anyhow::Result<()> {
    let Some(user_id) = app.identity().user_id() else {
        anyhow::bail!("not signed in");
    };
    let summary = app
        .records()
        .analytics_summary(user_id, Period::parse(period))
        .await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
