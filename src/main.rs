use agent_commerce_rust::commerce::AppState;
use agent_commerce_rust::config::{ServerConfig, Transport};
use agent_commerce_rust::mcp::models::{
    SERVER_NAME, SERVER_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
};
use agent_commerce_rust::mcp::{reaper, stdio, Dispatcher, SchemaRegistry};
use agent_commerce_rust::router::create_app_router;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "agent-commerce-rust",
    about = "MCP server exposing a product catalog, cart and checkout to AI agents",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP and the REST API over HTTP (default).
    Serve {
        /// Listen address (host:port). Also reads COMMERCE_MCP_ADDR.
        #[arg(long)]
        addr: Option<String>,

        /// Seconds an idle session (and its cart) is kept. Also reads COMMERCE_MCP_SESSION_TTL.
        #[arg(long)]
        session_ttl: Option<u64>,
    },

    /// Serve MCP over stdin/stdout, one JSON-RPC message per line.
    Stdio,

    /// Print server identity and registered tools, resources and prompts as JSON.
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (addr, transport, session_ttl) = match cli.command {
        Some(Commands::Serve { addr, session_ttl }) => (addr, Some(Transport::Http), session_ttl),
        Some(Commands::Stdio) => (None, Some(Transport::Stdio), None),
        Some(Commands::Info) => return print_info(),
        None => (None, None, None),
    };
    let config = ServerConfig::resolve(
        addr.as_deref(),
        transport,
        cli.log_level.as_deref(),
        session_ttl,
    )?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Initialize application state
    let state = Arc::new(AppState::new());
    let dispatcher = Arc::new(Dispatcher::commerce(state.clone())?);

    match config.transport {
        Transport::Http => {
            reaper::spawn(dispatcher.clone(), config.session_ttl);

            // Build application router with all routes and middleware
            let app = create_app_router(state, dispatcher);

            let listener = tokio::net::TcpListener::bind(config.addr).await?;
            tracing::info!(addr = %config.addr, "Server running on http://{}", config.addr);
            axum::serve(listener, app).await?;
        }
        Transport::Stdio => stdio::run(&dispatcher).await?,
    }

    Ok(())
}

fn print_info() -> anyhow::Result<()> {
    let registry = SchemaRegistry::commerce()?;

    let info = json!({
        "name": SERVER_NAME,
        "version": SERVER_VERSION,
        "protocolVersions": SUPPORTED_PROTOCOL_VERSIONS,
        "tools": registry.list_tools().iter().map(|t| &t.name).collect::<Vec<_>>(),
        "resources": registry.list_resources().iter().map(|r| &r.uri).collect::<Vec<_>>(),
        "resourceTemplates": registry.list_templates().iter().map(|t| &t.uri_template).collect::<Vec<_>>(),
        "prompts": registry.list_prompts().iter().map(|p| &p.name).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
