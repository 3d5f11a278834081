//! GPIO Viewer binary
//!
//! Serves the live pin dashboard, or reads the monitored pins once and exits.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use gpio_viewer::board::{BOARD_NAMES, DEFAULT_BOARD};
use gpio_viewer::web::config::DEFAULT_MAX_OBSERVERS;
use gpio_viewer::{
    start_web_server, BoardDescription, PortReader, ResetHandle, SamplingLoop,
    ViewerConfig, WebConfig, DEFAULT_INTERVAL_MS, DEFAULT_WEB_PORT, DEFAULT_WS_PATH,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "gpio_viewer")]
#[command(about = "Watch GPIO pin activity live in the browser")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Samples GPIO levels and streams every change to WebSocket observers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Web server bind address
    #[arg(long, global = true, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, global = true, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,

    /// Pin sampling interval in milliseconds
    #[arg(short, long, global = true, default_value_t = DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Comma separated GPIO numbers to monitor (default: every board pin)
    #[arg(long, global = true, value_delimiter = ',')]
    pins: Option<Vec<u8>>,

    /// Board description
    #[arg(short, long, global = true, default_value = DEFAULT_BOARD)]
    board: String,

    /// WebSocket route
    #[arg(long, global = true, default_value = DEFAULT_WS_PATH)]
    ws_path: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (default)
    Serve(ServeArgs),

    /// Read every monitored pin once, print JSON and exit
    Read,

    /// List built-in board descriptions
    Boards,
}

#[derive(Args)]
struct ServeArgs {
    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Maximum simultaneous observers
    #[arg(long, default_value_t = DEFAULT_MAX_OBSERVERS)]
    max_observers: usize,

    /// Toggle simulated pins in turn every N milliseconds (no-hardware builds)
    #[arg(long)]
    demo_blink: Option<u64>,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            no_cors: false,
            max_observers: DEFAULT_MAX_OBSERVERS,
            demo_blink: None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Serve(args)) => serve_command(&cli, args).await,
        Some(Commands::Read) => read_command(&cli),
        Some(Commands::Boards) => {
            boards_command();
            Ok(())
        }
        None => serve_command(&cli, &ServeArgs::default()).await,
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::from_level(level).into()))
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    Ok(())
}

fn build_config(cli: &Cli, args: &ServeArgs) -> ViewerConfig {
    let web = WebConfig::new(cli.host.clone(), cli.port)
        .with_ws_path(cli.ws_path.clone())
        .with_cors(!args.no_cors)
        .with_max_observers(args.max_observers);

    let config = ViewerConfig::default()
        .with_interval_ms(cli.interval)
        .with_board(cli.board.clone())
        .with_web(web);

    match &cli.pins {
        Some(pins) => config.with_pins(pins.clone()),
        None => config.with_all_pins(),
    }
}

#[cfg(feature = "gpio")]
fn open_reader(_config: &ViewerConfig, args: &ServeArgs) -> anyhow::Result<Box<dyn PortReader>> {
    if args.demo_blink.is_some() {
        tracing::warn!("--demo-blink is ignored when reading real GPIO");
    }
    let reader = gpio_viewer::RppalPortReader::new().context("failed to open GPIO")?;
    Ok(Box::new(reader))
}

#[cfg(not(feature = "gpio"))]
fn open_reader(config: &ViewerConfig, args: &ServeArgs) -> anyhow::Result<Box<dyn PortReader>> {
    let registry = config.registry()?;
    let reader = gpio_viewer::SimulatedPortReader::with_pins(registry.iter());
    tracing::warn!("Built without the `gpio` feature, serving simulated pins");

    if let Some(period_ms) = args.demo_blink {
        let driver = reader.clone();
        let pins: Vec<gpio_viewer::PinId> = registry.iter().collect();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(period_ms.max(1)));
            for pin in pins.iter().cycle() {
                ticker.tick().await;
                driver.toggle(*pin);
            }
        });
    }

    Ok(Box::new(reader))
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    let config = build_config(cli, args);
    config.validate()?;
    let reader = open_reader(&config, args)?;

    info!("Using {} port reader", reader.name());
    start_web_server(config, reader).await?;
    Ok(())
}

fn read_command(cli: &Cli) -> anyhow::Result<()> {
    let args = ServeArgs::default();
    let config = build_config(cli, &args);
    config.validate()?;
    let registry = Arc::new(config.registry()?);
    let reader = open_reader(&config, &args)?;

    let mut sampler = SamplingLoop::new(
        registry,
        reader,
        ResetHandle::new(),
        Duration::from_millis(cli.interval),
    );
    match sampler.next_message()? {
        Some(message) => println!("{}", message.payload),
        None => println!("{{}}"),
    }
    Ok(())
}

fn boards_command() {
    for name in BOARD_NAMES {
        if let Some(board) = BoardDescription::by_name(name) {
            println!("{:<18} {} ({} GPIOs)", board.name, board.title, board.pins.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["gpio_viewer", "--port", "9090", "--pins", "2,4,5"]).unwrap();
        assert_eq!(cli.port, 9090);
        assert_eq!(cli.pins, Some(vec![2, 4, 5]));
    }

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["gpio_viewer"]).unwrap();
        assert_eq!(cli.port, DEFAULT_WEB_PORT);
        assert_eq!(cli.interval, DEFAULT_INTERVAL_MS);
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.board, DEFAULT_BOARD);
        assert!(cli.pins.is_none());
    }

    #[test]
    fn test_build_config_explicit_pins() {
        let cli = Cli::try_parse_from(["gpio_viewer", "--pins", "17,27"]).unwrap();
        let config = build_config(&cli, &ServeArgs::default());
        assert_eq!(config.registry().unwrap().len(), 2);
    }

    #[test]
    fn test_serve_subcommand() {
        let cli = Cli::try_parse_from(["gpio_viewer", "serve", "--demo-blink", "250"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => assert_eq!(args.demo_blink, Some(250)),
            _ => panic!("expected serve subcommand"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gpio_viewer", "serve", "--demo-blink", "250", "--pins", "2,4,5",
        ])
        .unwrap();
        assert_eq!(cli.pins, Some(vec![2, 4, 5]));
        match &cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.demo_blink, Some(250));
                let config = build_config(&cli, args);
                assert_eq!(config.registry().unwrap().len(), 3);
            }
            _ => panic!("expected serve subcommand"),
        }
    }

    #[test]
    fn test_default_serve_args_admit_observers() {
        let cli = Cli::try_parse_from(["gpio_viewer"]).unwrap();
        let config = build_config(&cli, &ServeArgs::default());
        assert_eq!(config.web.max_observers, DEFAULT_MAX_OBSERVERS);
        assert!(config.validate().is_ok());

        let parsed = Cli::try_parse_from(["gpio_viewer", "serve"]).unwrap();
        match parsed.command {
            Some(Commands::Serve(args)) => assert_eq!(args.max_observers, DEFAULT_MAX_OBSERVERS),
            _ => panic!("expected serve subcommand"),
        }
    }
}
