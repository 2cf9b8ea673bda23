// ABOUTME: Main entry point for the jake relay
// ABOUTME: Initializes logging and config, then dispatches the CLI subcommand

use anyhow::Result;
use clap::Parser;
use jake_agent::EventPayload;
use jake::cli::{Cli, Commands, ReplayArgs};
use jake::config::Config;
use jake::{chat, metrics, replay};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic hook to log panics before they crash the process
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("\n╔══════════════════════════════════════════════════════════╗");
        eprintln!("║ PANIC! jake crashed with the following error:            ║");
        eprintln!("╚══════════════════════════════════════════════════════════╝\n");
        eprintln!("{}", panic_info);
        eprintln!("\nBacktrace:");
        eprintln!("{:?}", std::backtrace::Backtrace::force_capture());
    }));

    init_logging();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Replay(args) => run_replay(config, args).await,
        Commands::Chat(args) => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let session = chat::run(config, &args, stdin).await?;
            tracing::info!(
                replies = session.replies,
                turns = session.turns,
                failures = session.failures,
                "Chat session ended"
            );
            Ok(())
        }
        Commands::CheckConfig => {
            println!("{:#?}", config);
            tracing::info!("Configuration is valid");
            Ok(())
        }
    }
}

/// Logs go to stderr so relayed console messages own stdout.
/// JAKE_LOG_FORMAT=json switches to one JSON object per line.
fn init_logging() {
    let json = std::env::var("JAKE_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let pretty = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let structured = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(structured)
        .init();
}

async fn run_replay(config: Config, args: ReplayArgs) -> Result<()> {
    let prometheus = if args.print_metrics {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    tracing::info!(
        transcript = ?args.transcript,
        backend = %config.backend.backend_type(),
        telegram_chat = ?args.telegram_chat,
        "Starting replay"
    );
    let report = replay::run(config, &args).await?;

    match report.terminal.as_ref().map(|e| &e.payload) {
        Some(EventPayload::Complete { session_id, .. }) => tracing::info!(
            session_id = ?session_id,
            messages = report.messages.len(),
            "Replay complete"
        ),
        Some(EventPayload::FatalError { message, .. }) => {
            tracing::warn!(error = %message, "Replay ended with a fatal error")
        }
        _ => tracing::warn!("Transcript ended without a terminal event"),
    }

    if let Some(handle) = prometheus {
        println!("{}", handle.render());
    }
    Ok(())
}
