mod format;
mod token_commands;

use std::{path::PathBuf, time::Duration};

use {
    anyhow::{Context, bail},
    clap::{Parser, Subcommand},
    nestread_devices::{Device, DeviceClient},
    nestread_oauth::TokenManager,
    tracing::{debug, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "nestread", about = "Read Nest device state from the Smart Device Management API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Env file with secret paths (defaults to ./.env when present).
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Refresh the access token this many seconds before it expires.
    #[arg(long, global = true)]
    jitter: Option<i64>,

    /// Timeout for each HTTP request, in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current thermostat readings.
    Thermostat {
        #[arg(short, long, env = "THERMOSTAT_DEVICE_ID", value_name = "DEVICEID")]
        device_id: String,
        /// strftime-style format for the timestamp prefix.
        #[arg(short, long, default_value = format::DEFAULT_TIME_FORMAT)]
        time_format: String,
    },
    /// List the devices in the project.
    Devices,
    /// Access token management.
    Token {
        #[command(subcommand)]
        action: token_commands::TokenAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // Logs go to stderr; stdout carries the readings.
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "nestread starting");

    let settings =
        nestread_config::load_settings(cli.env_file.as_deref()).context("loading settings")?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()?;

    let mut tokens = TokenManager::new(&settings).with_client(http.clone());
    if let Some(jitter) = cli.jitter {
        tokens = tokens.with_jitter(jitter);
    }

    match cli.command {
        Commands::Thermostat {
            device_id,
            time_format,
        } => {
            let client = DeviceClient::new(&settings, &tokens).with_client(http);
            let device = client
                .get_device(&device_id)
                .await
                .with_context(|| format!("fetching device {device_id}"))?;
            let thermo = match device {
                Device::Thermostat(thermo) => thermo,
                Device::Unsupported { kind, .. } => {
                    bail!("device {device_id} is a {kind}, not a thermostat")
                },
            };
            info!(device = thermo.device_id(), "thermostat fetched");
            for line in format::thermostat_lines(&thermo, &time_format)? {
                println!("{line}");
            }
            Ok(())
        },
        Commands::Devices => {
            let client = DeviceClient::new(&settings, &tokens).with_client(http);
            for device in client.list_devices().await.context("listing devices")? {
                println!(
                    "{} {} {}",
                    device.device_id(),
                    device.kind(),
                    device.custom_name().unwrap_or("-")
                );
            }
            Ok(())
        },
        Commands::Token { action } => token_commands::handle_token(action, &tokens).await,
    }
}
