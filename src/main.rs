use std::fs;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use replaydeck::auth::AuthService;
use replaydeck::blob::{BlobStore, FsBlobStore};
use replaydeck::config::ServerConfig;
use replaydeck::coordinator::ReplayCoordinator;
use replaydeck::server::{AppState, create_router};
use replaydeck::store::{MetadataStore, SqliteStore};
use replaydeck::types::User;

#[derive(Parser)]
#[command(name = "replaydeck")]
#[command(about = "A game replay upload server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database and replay files
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Secret used to sign session tokens. Without it an ephemeral
        /// secret is generated and tokens do not survive restarts.
        #[arg(long, env = "JWT_SECRET")]
        jwt_secret: Option<String>,

        /// Single-user mode: requests without a credential act as this
        /// tenant id instead of being rejected.
        #[arg(long, env = "DEFAULT_TENANT")]
        default_tenant: Option<Uuid>,
    },
}

fn signing_secret(configured: Option<String>) -> Vec<u8> {
    match configured {
        Some(secret) => secret.into_bytes(),
        None => {
            warn!(
                "no JWT secret configured; using an ephemeral secret \
                 (issued tokens will not survive a restart)"
            );
            let mut bytes = [0u8; 32];
            rand::thread_rng().fill(&mut bytes);
            bytes.to_vec()
        }
    }
}

/// Single-user mode needs the fallback tenant to exist as a row, or the
/// foreign keys on games/replays would reject every write.
fn ensure_default_tenant(store: &dyn MetadataStore, id: Uuid) -> anyhow::Result<()> {
    if store.get_user(id)?.is_none() {
        store.create_user(&User {
            id,
            login: format!("default-{id}"),
            // Not a valid argon2 hash, so this account can never log in.
            password_hash: "!".to_string(),
            created_at: Utc::now(),
        })?;
        info!("created default tenant {}", id);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("replaydeck=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
            jwt_secret,
            default_tenant,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                jwt_secret,
                default_tenant,
            };

            fs::create_dir_all(&config.data_dir)?;

            let store: Arc<dyn MetadataStore> = Arc::new(SqliteStore::new(config.db_path())?);
            store.initialize()?;

            if let Some(tenant) = config.default_tenant {
                ensure_default_tenant(store.as_ref(), tenant)?;
            }

            let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(&config.data_dir));
            let secret = signing_secret(config.jwt_secret.clone());

            let state = Arc::new(AppState {
                auth: AuthService::new(store.clone(), &secret),
                coordinator: ReplayCoordinator::new(store, blobs),
                default_tenant: config.default_tenant,
            });

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
