use ise_mcp::{
    catalog::ToolCatalog,
    config::Config,
    error::AppResult,
    initialize_logging,
    rpc::RpcDispatcher,
    transport::{HttpServer, StdioServer, StdioTransport},
    upstream::IseClient,
};
use std::{env, process, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command line arguments first (before logging to avoid noise)
    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) || args.contains(&"-V".to_string()) {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    if args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        print_help();
        process::exit(0);
    }

    // Missing credentials or a broken config file are fatal before any
    // request is served.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(1);
        }
    };

    initialize_logging(&config.log_level)
        .map_err(|e| ise_mcp::AppError::application(e.to_string()))?;
    info!("Configuration validated successfully");
    info!("API Base URL: {}", config.api_base_url);

    let gateway = Arc::new(IseClient::new(&config)?);
    let catalog = Arc::new(ToolCatalog::new());
    let dispatcher = Arc::new(RpcDispatcher::new(catalog, gateway));

    if args.contains(&"--stdio".to_string()) {
        run_stdio(dispatcher).await
    } else {
        run_http(dispatcher, &config).await
    }
}

/// Serve JSON-RPC over stdin/stdout until EOF or Ctrl-C.
///
/// Ctrl-C cancels the in-flight read; the pipe is released on every
/// exit path when the server drops.
async fn run_stdio(dispatcher: Arc<RpcDispatcher>) -> AppResult<()> {
    info!("ISE MCP stdio server starting...");

    let transport = StdioTransport::new(tokio::io::stdin(), tokio::io::stdout());
    let mut server = StdioServer::new(transport, dispatcher);

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Server stopped by user");
            Ok(())
        }
    }
}

/// Serve JSON-RPC over HTTP until Ctrl-C.
async fn run_http(dispatcher: Arc<RpcDispatcher>, config: &Config) -> AppResult<()> {
    info!("ISE MCP HTTP server starting...");
    info!(
        "Server will listen on {}:{}",
        config.http_host, config.http_port
    );

    let server = HttpServer::new(dispatcher, &config.http_host, config.http_port)?;
    server.run().await
}

fn print_help() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS]", env!("CARGO_PKG_NAME"));
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print this help message and exit");
    println!("    -V, --version    Print version information and exit");
    println!("        --stdio      Serve JSON-RPC over stdin/stdout instead of HTTP");
    println!();
    println!("ENVIRONMENT:");
    println!("    ISE_API_KEY          Upstream API credential (required)");
    println!("    ISE_API_BASE_URL     Upstream API base URL");
    println!("    ISE_REQUEST_TIMEOUT  Upstream request timeout in seconds");
    println!("    ISE_HTTP_HOST        HTTP listen host (default 0.0.0.0)");
    println!("    ISE_HTTP_PORT        HTTP listen port (default 8000)");
    println!("    ISE_LOG_LEVEL        Default log level when RUST_LOG is unset");
    println!();
    println!("EXAMPLES:");
    println!("    {}              Start the HTTP transport", env!("CARGO_PKG_NAME"));
    println!("    {} --stdio      Start the stdio transport", env!("CARGO_PKG_NAME"));
}
