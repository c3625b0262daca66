//! Teddy - conversational teddy bear companion
//!
//! Main entry point for the teddy application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use teddy::cli::{Cli, Commands};
use teddy::commands;
use teddy::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config = Config::load(&cli.config, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat {
            no_speech,
            idle_seconds,
            no_camera,
        } => {
            if no_speech {
                tracing::debug!("Speech output disabled");
            }
            if let Some(seconds) = idle_seconds {
                tracing::debug!("Using idle window override: {}s", seconds);
            }
            if no_camera {
                tracing::debug!("Camera disabled");
            }

            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask { prompt } => {
            tracing::info!("Sending a single message");
            commands::ask::run_ask(config, prompt).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they do not interleave with the transcript.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "teddy=debug" } else { "teddy=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
