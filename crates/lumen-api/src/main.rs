//! Lumen CLI and REST API entry point.
//!
//! Binary name: `lumen`
//!
//! Parses CLI arguments, initializes the database and services, then
//! either starts the REST API server or runs a one-shot command.

mod http;
mod state;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use lumen_infra::config::{self, resolve_data_dir};
use lumen_infra::sqlite::pool::DatabasePool;
use state::AppState;

#[derive(Parser)]
#[command(name = "lumen", about = "Multimodal chat backend", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit machine-readable JSON instead of styled output.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server.
    Serve {
        /// Bind address (overrides config.toml).
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config.toml).
        #[arg(long)]
        port: Option<u16>,
        /// Bridge tracing spans to OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },
    /// Show database statistics.
    Status,
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "lumen", &mut std::io::stdout());
        return Ok(());
    }

    match cli.command {
        Commands::Serve { host, port, otel } => {
            lumen_observe::tracing_setup::init_tracing(otel)
                .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

            let data_dir = resolve_data_dir();
            let mut server_config = config::load_server_config(&data_dir).await;
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }

            let app_state = AppState::init(&server_config).await?;

            let addr = format!("{}:{}", server_config.host, server_config.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Lumen API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(app_state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            lumen_observe::tracing_setup::shutdown_tracing();
            println!("\n  Server stopped.");
        }

        Commands::Status => {
            let data_dir = resolve_data_dir();
            tokio::fs::create_dir_all(&data_dir).await?;
            let pool = DatabasePool::new(&config::database_url(&data_dir)).await?;

            let users = count(&pool, "users").await?;
            let sessions = count(&pool, "chat_sessions").await?;
            let messages = count(&pool, "chat_messages").await?;

            if cli.json {
                let status = serde_json::json!({
                    "data_dir": data_dir.display().to_string(),
                    "users": users,
                    "sessions": sessions,
                    "messages": messages,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!();
                println!(
                    "  {} Lumen data at {}",
                    console::style("●").green(),
                    console::style(data_dir.display()).cyan()
                );
                println!();
                println!("  Users:    {users}");
                println!("  Sessions: {sessions}");
                println!("  Messages: {messages}");
                println!();
            }
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

async fn count(pool: &DatabasePool, table: &str) -> anyhow::Result<i64> {
    // Table names come from the fixed list above, never user input.
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&pool.reader)
        .await?;
    Ok(n)
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
