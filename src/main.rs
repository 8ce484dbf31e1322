//! apollo-cli: read and watch configuration on an Apollo config service.
//!
//! ```text
//! apollo-cli --server http://localhost:8080 --app-id app1 get timeout --default 30
//! apollo-cli --config apollo.toml read --namespace datasource --type json
//! apollo-cli --config apollo.toml watch
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::mpsc;

use apollo_client::client::types::NamespaceType;
use apollo_client::config::{load_config_with, ApolloConfig, NamespaceConfig};
use apollo_client::lifecycle::signals::shutdown_on_ctrl_c;
use apollo_client::observability::logging::init_logging;
use apollo_client::{ApolloClient, Endpoint, NotificationWatcher, Shutdown};

#[derive(Parser)]
#[command(name = "apollo-cli")]
#[command(about = "Read and watch Apollo configuration namespaces", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Config service url (overrides the file).
    #[arg(long)]
    server: Option<String>,

    #[arg(long)]
    app_id: Option<String>,

    #[arg(long)]
    cluster: Option<String>,

    /// Client ip for gray releases.
    #[arg(long)]
    ip: Option<String>,

    /// Access key secret; enables request signing.
    #[arg(long)]
    secret: Option<String>,

    #[arg(long)]
    timeout_secs: Option<u64>,

    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one key
    Get {
        key: String,

        /// Printed when the key is absent.
        #[arg(long, default_value = "")]
        default: String,

        #[arg(short, long, default_value = "application")]
        namespace: String,

        #[arg(short = 't', long = "type", default_value = "properties")]
        namespace_type: NamespaceType,

        /// Read live from the database, skipping the local cache.
        #[arg(long, conflicts_with = "cdn")]
        uncached: bool,

        /// Populate from the cache-backed endpoint instead of the database.
        #[arg(long)]
        cdn: bool,
    },
    /// Print a whole namespace as JSON
    Read {
        #[arg(short, long, default_value = "application")]
        namespace: String,

        #[arg(short = 't', long = "type", default_value = "properties")]
        namespace_type: NamespaceType,

        /// Use the cache-backed endpoint (no release metadata).
        #[arg(long)]
        cdn: bool,
    },
    /// Long-poll for changes and print each refreshed namespace
    Watch {
        /// Namespaces to watch (defaults to the config file's list).
        #[arg(short, long)]
        namespace: Vec<String>,

        #[arg(short = 't', long = "type", default_value = "properties")]
        namespace_type: NamespaceType,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_with(path, |config| apply_overrides(config, &cli))?,
        None => {
            let mut config = ApolloConfig::default();
            apply_overrides(&mut config, &cli);
            config
        }
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    init_logging(&level);

    let client = ApolloClient::new(config.client.clone())?;

    match cli.command {
        Commands::Get {
            key,
            default,
            namespace,
            namespace_type,
            uncached,
            cdn,
        } => {
            let value = if uncached {
                client
                    .get_uncached(&key, &default, &namespace, namespace_type)
                    .await?
            } else {
                let endpoint = if cdn { Endpoint::Cached } else { Endpoint::Uncached };
                client
                    .get(&key, &default, &namespace, namespace_type, endpoint)
                    .await?
            };
            println!("{}", value);
        }
        Commands::Read {
            namespace,
            namespace_type,
            cdn,
        } => {
            let json = if cdn {
                let configs = client.read_with_cache(&namespace, namespace_type).await?;
                serde_json::to_string_pretty(&configs)?
            } else {
                let envelope = client.read_without_cache(&namespace, namespace_type).await?;
                serde_json::to_string_pretty(&envelope)?
            };
            println!("{}", json);
        }
        Commands::Watch {
            namespace,
            namespace_type,
        } => {
            let mut watch = config.watch.clone();
            if !namespace.is_empty() {
                watch.namespaces = namespace
                    .into_iter()
                    .map(|name| NamespaceConfig {
                        name,
                        namespace_type,
                    })
                    .collect();
            }
            let watched = watch.namespaces.clone();

            let shutdown = Shutdown::new();
            let (tx, mut rx) = mpsc::unbounded_channel();
            let watcher = NotificationWatcher::new(client.clone(), watch).with_changes(tx);
            let handle = tokio::spawn(watcher.run(shutdown.subscribe()));
            tokio::spawn(shutdown_on_ctrl_c(shutdown.clone()));

            while let Some(notice) = rx.recv().await {
                let snapshot = watched
                    .iter()
                    .find(|ns| {
                        ns.namespace_type.wire_namespace(&ns.name) == notice.namespace_name
                            || ns.namespace_type.cache_key(&ns.name) == notice.namespace_name
                    })
                    .and_then(|ns| client.cached(&ns.name, ns.namespace_type));
                println!(
                    "{} changed (notification id {})",
                    notice.namespace_name, notice.notification_id
                );
                if let Some(configs) = snapshot {
                    println!("{}", serde_json::to_string_pretty(&*configs)?);
                }
            }

            handle.await?;
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut ApolloConfig, cli: &Cli) {
    let client = &mut config.client;
    if let Some(server) = &cli.server {
        client.config_server_url = server.clone();
    }
    if let Some(app_id) = &cli.app_id {
        client.app_id = app_id.clone();
    }
    if let Some(cluster) = &cli.cluster {
        client.cluster = cluster.clone();
    }
    if let Some(ip) = &cli.ip {
        client.ip = Some(ip.clone());
    }
    if let Some(secret) = &cli.secret {
        client.secret = Some(secret.clone());
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        client.timeout_secs = timeout_secs;
    }
}
