//! Helpdesk: customer-support intent router and retrieval server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use helpdesk_core::HelpdeskConfig;
use helpdesk_store::SqliteOrderStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("HELPDESK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_help() {
    println!("Helpdesk: customer support agent");
    println!();
    println!("Usage: helpdesk [command]");
    println!();
    println!("Commands:");
    println!("  (none) | serve           Start the HTTP server");
    println!("  ask <message...>         Answer one message and exit");
    println!("  seed                     Insert the example orders");
    println!("  help                     Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let data_dir = resolve_data_dir();

    match args.get(1).map(String::as_str) {
        None | Some("serve") => serve(data_dir).await,
        Some("ask") => {
            let message = args[2..].join(" ");
            if message.trim().is_empty() {
                eprintln!("Usage: helpdesk ask <message...>");
                std::process::exit(1);
            }
            ask(data_dir, &message).await
        }
        Some("seed") => {
            let config = HelpdeskConfig::from_env(&data_dir)?;
            let store = SqliteOrderStore::open(&config.data_paths.orders)
                .map_err(|e| anyhow::anyhow!("Failed to open order store: {}", e))?;
            let inserted = store
                .seed_example_orders()
                .map_err(|e| anyhow::anyhow!("Failed to seed orders: {}", e))?;
            println!(
                "Seeded {} example orders into {}",
                inserted,
                store.db_path().display()
            );
            Ok(())
        }
        Some("--help" | "-h" | "help") => {
            print_help();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'helpdesk help' for usage.", other);
            std::process::exit(1);
        }
    }
}

fn load_state(data_dir: &Path) -> anyhow::Result<AppState> {
    info!("Data directory: {}", data_dir.display());
    let config = HelpdeskConfig::from_env(data_dir)?;
    AppState::load(config).map_err(|e| anyhow::anyhow!("Failed to start helpdesk: {}", e))
}

async fn ask(data_dir: PathBuf, message: &str) -> anyhow::Result<()> {
    let state = load_state(&data_dir)?;
    let reply = state.agent.ask(message).await?;
    println!("[{}] {}", reply.intent, reply.reply);
    Ok(())
}

async fn serve(data_dir: PathBuf) -> anyhow::Result<()> {
    let state = Arc::new(load_state(&data_dir)?);
    let port = state.config.port;

    // Build both indexes before accepting requests
    let warm_state = state.clone();
    tokio::task::spawn_blocking(move || warm_state.agent.retrieval().warm()).await?;

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Helpdesk server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
