use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use secure_store::cli::{
    fallback_secrets, handle_config_command, handle_item_command, resolve_secret, ConfigCommands,
    ItemCommands,
};
use secure_store::config::{StorePaths, Settings};
use secure_store::{JsonFileBackend, SecureStore, StoreConfig};

#[derive(Parser)]
#[command(
    name = "secure-store",
    version,
    about = "Encrypted, namespaced key-value store",
    long_about = "secure-store keeps small pieces of sensitive state in a local JSON file, \
                  encrypting every value with AES-256-GCM under a key derived from your \
                  secret. Old secrets can be retained for reading after a rotation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Namespace to operate in (defaults to the configured namespace)
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Current secret used for all writes
    #[arg(long, global = true, env = "SECURE_STORE_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Retained secrets for reading older values, tried in order
    #[arg(
        long = "fallback-secret",
        global = true,
        env = "SECURE_STORE_FALLBACK_SECRETS",
        value_delimiter = ',',
        hide_env_values = true
    )]
    fallback_secrets: Vec<String>,

    /// Data file override
    #[arg(long, global = true)]
    file: Option<std::path::PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Item(ItemCommands),

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialise_logging(cli.verbose);

    let paths = StorePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let data_file = cli.file.clone().unwrap_or_else(|| settings.data_file(&paths));
    let namespace = cli.namespace.clone().unwrap_or_else(|| settings.namespace.clone());

    match cli.command {
        Commands::Config { action } => {
            handle_config_command(&paths, settings, &data_file, &namespace, action)?;
        }
        Commands::Item(cmd) => {
            let secret = resolve_secret(cli.secret)?;
            let config = StoreConfig::new(namespace.clone(), secret)
                .with_fallback_secrets(fallback_secrets(cli.fallback_secrets)?)
                .with_key_derivation(settings.key_derivation.clone());

            let store = SecureStore::new(config, JsonFileBackend::new(data_file))?;
            handle_item_command(&store, &namespace, cmd).await?;
        }
    }

    Ok(())
}

fn initialise_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", default_level);
    }

    // Logs go to stderr so `get` output stays clean on stdout
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();

    // Subscriber may already be set elsewhere
    let _ = tracing::subscriber::set_global_default(subscriber);
}
