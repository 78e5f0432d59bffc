#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardpulse::commands::{self, RunArgs};
use cardpulse::errors::CardpulseError;
use cardpulse::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "cardpulse")]
#[command(about = "Make start-needed cards pulse and check that they do", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a page in a browser, animate its cards and report
    Run {
        /// URL to open
        url: String,

        /// Browser to use
        #[arg(short, long, default_value = "firefox")]
        browser: String,

        /// Connect to this WebDriver instead of finding or starting one
        #[arg(long)]
        webdriver_url: Option<String>,

        /// Run browser in visible mode (disables headless)
        #[arg(long = "no-headless")]
        no_headless: bool,

        /// Set viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
        #[arg(long)]
        viewport: Option<String>,

        /// Keep the browser open this many milliseconds after verifying
        #[arg(long)]
        hold: Option<u64>,

        #[command(flatten)]
        args: RunArgs,
    },

    /// Run against a saved HTML snapshot, no browser needed
    Audit {
        /// HTML file to check
        file: String,

        #[command(flatten)]
        args: RunArgs,
    },

    /// Print the strategies a run would try
    Strategies {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    GLOBAL_WEBDRIVER_MANAGER.stop_all();

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let err: CardpulseError = err.into();

            // JSON on stdout for scripts, plain text on stderr for people
            let error_json = json!({
                "error": true,
                "kind": err.kind(),
                "message": err.to_string(),
                "exit_code": err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            eprintln!("Error: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardpulse=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            url,
            browser,
            webdriver_url,
            no_headless,
            viewport,
            hold,
            args,
        } => {
            commands::run::handle_run(
                url,
                browser,
                webdriver_url,
                no_headless,
                viewport,
                hold,
                args,
            )
            .await?
        }
        Commands::Audit { file, args } => commands::audit::handle_audit(file, args).await?,
        Commands::Strategies { args } => commands::strategies::handle_strategies(args).await?,
        Commands::Version => commands::version::handle_version().await?,
    }

    Ok(())
}
