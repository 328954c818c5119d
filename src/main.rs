use clap::{Parser, Subcommand};
use craft_gateway::cli_messages::{print_error, print_info, print_success, print_warn};
use craft_gateway::config::{GatewayConfig, get_config_path};
use craft_gateway::environment::Environment;
use craft_gateway::events::Notification;
use craft_gateway::gateway::{
    ConnectionTracker, ErrorCategory, GatewayClient, GatewayError, RequestOptions,
};
use craft_gateway::logging;
use craft_gateway::notifications::{ConsoleSink, NotificationSink, spawn_notification_bridge};
use serde_json::Value;
use std::error::Error;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Resilient API gateway client
struct Args {
    /// Backend origin, overriding the config file and CRAFT_ENVIRONMENT
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the backend health endpoint once
    Health,
    /// Send a request through the retrying gateway
    Request {
        /// GET, POST, PUT or DELETE
        method: String,
        /// Endpoint relative to /api/
        endpoint: String,
        /// JSON request body
        #[arg(long, value_name = "JSON")]
        body: Option<String>,
        /// Per-attempt timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Retries after the first attempt
        #[arg(long)]
        retries: Option<u32>,
    },
    /// Send a login request with startup-aware retries
    Login {
        /// Endpoint relative to /api/
        #[arg(default_value = "auth/login")]
        endpoint: String,
        /// JSON credentials
        #[arg(long, value_name = "JSON")]
        body: String,
    },
    /// Show the effective configuration
    Config,
}

fn parse_body(raw: &str) -> Result<Value, Box<dyn Error>> {
    serde_json::from_str(raw).map_err(|e| format!("Invalid JSON body: {}", e).into())
}

/// Rejections by the backend go through the notification sink; the rest are CLI errors.
fn report_failure(title: &str, error: &GatewayError) {
    if error.category() == ErrorCategory::ClientRejected {
        ConsoleSink::new().show(&Notification::error(title, error.to_string()));
    } else {
        print_error(title, Some(&error.to_string()));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init_logger();
    let args = Args::parse();

    let config_path = get_config_path()?;
    let mut config = GatewayConfig::load_or_default(&config_path)?;
    if let Some(base_url) = args.base_url {
        config.base_url = Some(base_url);
    }
    let environment = Environment::from_env();

    if let Command::Config = args.command {
        print_info("Config file", &config_path.display().to_string());
        print_info("Environment", &format!("{:?}", environment));
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let (tracker, events) = ConnectionTracker::with_events();
    let client = GatewayClient::connect(config, environment, tracker)?;
    let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
    let bridge = spawn_notification_bridge(Box::new(ConsoleSink::new()), events, shutdown_receiver);

    let result = run_command(&client, args.command).await;

    let _ = shutdown_sender.send(());
    let _ = bridge.await;
    result
}

async fn run_command(client: &GatewayClient, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Health => {
            if client.check_backend_health().await {
                print_success("Backend online", "");
            } else {
                print_warn("Backend offline", "");
            }
            Ok(())
        }
        Command::Request {
            method,
            endpoint,
            body,
            timeout_ms,
            retries,
        } => {
            let mut options = RequestOptions::default();
            if let Some(raw) = body {
                options = options.with_body(parse_body(&raw)?);
            }
            if let Some(timeout_ms) = timeout_ms {
                options = options.with_timeout_ms(timeout_ms);
            }
            if let Some(retries) = retries {
                options = options.with_retries(retries);
            }
            match client.execute(&method, &endpoint, options).await {
                Ok(response) => {
                    println!("{}", String::from_utf8_lossy(&response.body));
                    Ok(())
                }
                Err(e) => {
                    report_failure("Request failed", &e);
                    Err(e.into())
                }
            }
        }
        Command::Login { endpoint, body } => {
            let body = parse_body(&body)?;
            match client
                .auth_request("POST", &endpoint, Some(body), RequestOptions::default())
                .await
            {
                Ok(response) => {
                    print_success("Login succeeded", &format!("HTTP {}", response.status));
                    Ok(())
                }
                Err(e) => {
                    report_failure("Login failed", &e);
                    Err(e.into())
                }
            }
        }
        Command::Config => Ok(()),
    }
}
