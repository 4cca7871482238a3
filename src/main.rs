use anyhow::Result;
use clap::Parser;
use pitch_buddy::cli::{handle_context_command, print_formats, Cli, Command};
use pitch_buddy::environment::{ApiKeys, EnvironmentConfig};
use pitch_buddy::{start_web_server, ContextStore};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pitch_buddy=info,pitchbuddy=info,rocket::server=off"));
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var_os("PITCHBUDDY_LOG_JSON").is_some() {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut config = EnvironmentConfig::load()?;
    if let Some(path) = cli.contexts_path {
        config.contexts_path = path;
    }
    config.ensure_directories()?;

    match cli.command {
        Command::Serve { port } => {
            let keys = ApiKeys::from_env();
            info!(
                "Environment: {}",
                std::env::var("PITCHBUDDY_ENV").unwrap_or_else(|_| "local".to_string())
            );
            start_web_server(config, keys, port).await
        }
        Command::Context(command) => {
            let store = ContextStore::open(config.store_config())?;
            handle_context_command(&store, command)
        }
        Command::Formats => {
            print_formats();
            Ok(())
        }
    }
}
