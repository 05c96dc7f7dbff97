use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fahrschule::{api, db, local};

#[derive(Parser)]
#[command(name = "fahrschule")]
#[command(about = "Record keeping for a driving school")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for the HTTP API
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Database file (defaults to the platform data directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Seed demo data into the offline tablet store
    SeedDemo {
        /// Store directory (defaults to the platform data directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "fahrschule=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<db::Database> {
    let db = match path {
        Some(path) => db::Database::open(path)?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(port: u16, db_path: Option<PathBuf>) -> anyhow::Result<()> {
    let db = open_database(db_path)?;
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Fahrschule server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port, db }) => {
            tracing::info!("Starting Fahrschule server on port {}", port);
            serve(port, db).await?;
        }
        Some(Commands::SeedDemo { dir }) => {
            let store = match dir {
                Some(dir) => local::LocalStore::open(dir)?,
                None => local::LocalStore::open_default()?,
            };
            if store.seed_demo()? {
                println!("Demo data written to {}", store.dir().display());
            } else {
                println!("Store already holds students, nothing seeded");
            }
        }
        None => {
            // Default: start server on the default port
            tracing::info!("Starting Fahrschule server on port 8000");
            serve(8000, None).await?;
        }
    }

    Ok(())
}
