use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_mcp::{AppState, RelayHttpServer, resolve_bind_address};
use relay_router::DispatchRouter;
use relay_types::DispatchRequest;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod verify_sse;

#[derive(Parser)]
#[command(name = "relay")]
#[command(version)]
#[command(about = "Forward automation commands to n8n, Zapier, GitHub or any HTTP endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the command route, liveness endpoints and the MCP endpoint
    Serve {
        /// Address to bind (default 0.0.0.0:$PORT, PORT defaults to 3000)
        #[arg(long)]
        bind: Option<String>,

        /// Seconds between SSE heartbeat events
        #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
        heartbeat_secs: u64,
    },

    /// Dispatch a single command using the process environment
    Dispatch {
        /// Command text, e.g. `status`, `run` or `git:sync`
        command: String,

        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,

        /// Caller name recorded with the command
        #[arg(long)]
        actor: Option<String>,
    },

    /// Check that a running server's /sse endpoint announces liveness
    VerifySse {
        /// Stream URL
        #[arg(env = "SSE_URL", default_value = verify_sse::DEFAULT_SSE_URL)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, heartbeat_secs } => serve(bind.as_deref(), heartbeat_secs).await,
        Commands::Dispatch { command, args, actor } => dispatch(command, args.as_deref(), actor).await,
        Commands::VerifySse { url } => verify_sse::run(&url).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn serve(bind: Option<&str>, heartbeat_secs: u64) -> Result<ExitCode> {
    let address = resolve_bind_address(bind)?;
    let router = DispatchRouter::from_env().context("failed to initialise dispatch router")?;
    let state = AppState::new(router).with_heartbeat_interval(Duration::from_secs(heartbeat_secs));
    let running = RelayHttpServer::new(address, state).start().await?;
    info!(address = %running.bound_address(), "relay MCP proxy running");

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!("shutdown requested");
    running.stop().await?;
    Ok(ExitCode::SUCCESS)
}

async fn dispatch(command: String, args: Option<&str>, actor: Option<String>) -> Result<ExitCode> {
    let mut request = DispatchRequest::new(command);
    if let Some(raw) = args {
        let value: Value = serde_json::from_str(raw).context("--args must be valid JSON")?;
        request = request.with_args(value);
    }
    if let Some(actor) = actor {
        request = request.with_actor(actor);
    }

    let command_text = request.command_text().map(str::to_string);
    let actor_text = request.actor_text().map(str::to_string);
    let router = DispatchRouter::from_env().context("failed to initialise dispatch router")?;
    match router.dispatch(request).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            let envelope = error.to_envelope(command_text.as_deref(), actor_text.as_deref());
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
