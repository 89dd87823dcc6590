mod cli;

use geomark::{config, server};
use geomark_db::pool::init_pool;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "geomark=trace,geomark_db=debug,geomark_common=debug,tower_http=debug".to_string()
        } else {
            "geomark=debug,geomark_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(host, port, cli.config.as_deref()))
        }
        Commands::InitDb => init_db(cli.config.as_deref()),
        Commands::Version => {
            println!("geomark {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn serve(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting geomark server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    std::fs::create_dir_all(&config.storage.data_dir)?;

    // Initialize database; migrations run here, not via any public route
    let db_path = config.db_path();
    let db_path_str = db_path.to_string_lossy();
    tracing::info!("Initializing database at {}", db_path_str);
    let db_pool = init_pool(&db_path_str)?;

    server::start_server(config, db_pool).await
}

fn init_db(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    std::fs::create_dir_all(&config.storage.data_dir)?;

    let db_path = config.db_path();
    let db_path_str = db_path.to_string_lossy();
    let _pool = init_pool(&db_path_str)?;

    println!("Database initialized at {}", db_path_str);
    Ok(())
}
