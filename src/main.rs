use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geostamp::{
    Config, create_app,
    jpeg::save_jpeg,
    stamp::{StampForm, StampService},
    startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server (default if no command specified)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Automatically quit after specified number of seconds (useful for testing)
        #[arg(long)]
        quit_after: Option<u64>,
    },

    /// Stamp a single photo and write the result as JPEG
    Stamp {
        input: PathBuf,

        #[arg(short, long, default_value = "watermarked.jpg")]
        output: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<String>,

        /// Address text; separate lines with newlines
        #[arg(long, conflicts_with = "address_file")]
        address: Option<String>,

        /// Read the address text from a file
        #[arg(long)]
        address_file: Option<PathBuf>,

        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        /// HH:MM
        #[arg(long)]
        time: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        temp_c: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        temp_f: Option<String>,

        /// Add a map thumbnail for the coordinates
        #[arg(long)]
        map: bool,
    },

    /// Look up the address lines for a coordinate pair
    Address {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        #[arg(long, allow_hyphen_values = true)]
        lon: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // RUST_LOG, when set, takes precedence over --log-level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli.config)?;

    match cli.command {
        Some(Commands::Serve {
            port,
            host,
            quit_after,
        }) => run_server(config, port, host, quit_after).await,
        Some(Commands::Stamp {
            input,
            output,
            lat,
            lon,
            address,
            address_file,
            date,
            time,
            temp_c,
            temp_f,
            map,
        }) => {
            let address = match address_file {
                Some(path) => Some(std::fs::read_to_string(path)?),
                None => address,
            };
            let form = StampForm {
                latitude: lat,
                longitude: lon,
                address,
                date,
                time,
                temp_c,
                temp_f,
                show_map: map,
            };
            stamp_file(config, &input, &output, form).await
        }
        Some(Commands::Address { lat, lon }) => {
            let service = StampService::new(&config)?;
            let lookup = service.fetch_address(&lat, &lon).await?;
            if let Some(error) = &lookup.error {
                eprintln!("Address lookup failed, showing coordinates: {}", error);
            }
            println!("{}", lookup.text());
            Ok(())
        }
        None => {
            // Default to serve command if no subcommand specified
            run_server(config, None, None, None).await
        }
    }
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        let config = toml_edit::de::from_str::<Config>(&config_content)?;
        info!("Configuration loaded from: {:?}", config_path);
        Ok(config)
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Ok(Config::default())
    }
}

async fn stamp_file(
    config: Config,
    input: &Path,
    output: &Path,
    form: StampForm,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = StampService::new(&config)?;
    let photo = std::fs::read(input)?;

    let outcome = service.stamp(&photo, form).await?;
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    if let Some(error) = &outcome.error {
        eprintln!("Watermark failed, writing the original photo: {}", error);
    }

    save_jpeg(output, &outcome.jpeg)?;
    println!("Wrote {}", output.display());
    Ok(())
}

async fn run_server(
    config: Config,
    port: Option<u16>,
    host: Option<String>,
    quit_after: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or(config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting {} server", config.app.name);

    // Perform startup checks
    match startup_checks::perform_startup_checks(&config).await {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            for error in &errors {
                tracing::error!("Startup check failed: {}", error);
            }

            if errors.iter().any(|e| e.is_critical()) {
                tracing::error!("Critical startup check failed, exiting");
                return Err("Critical startup check failed".into());
            } else {
                tracing::warn!("Non-critical startup checks failed, continuing");
            }
        }
    }

    let app = create_app(config)?;

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Set up graceful shutdown
    let server = axum::serve(listener, app);
    let graceful = server.with_graceful_shutdown(shutdown_signal(quit_after));

    if let Err(e) = graceful.await {
        tracing::error!("Server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(quit_after: Option<u64>) {
    use tokio::signal;
    use tokio::time::{Duration, sleep};

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_timer = async {
        if let Some(seconds) = quit_after {
            info!(
                "Server will automatically shut down after {} seconds",
                seconds
            );
            sleep(Duration::from_secs(seconds)).await;
            info!("Quit timer expired, shutting down");
        } else {
            std::future::pending::<()>().await
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        },
        _ = quit_timer => {},
    }
}
