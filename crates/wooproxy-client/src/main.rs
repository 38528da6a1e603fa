use std::process::ExitCode;

use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wooproxy_client::{ProxyRequest, WooProxyClient};

const USAGE: &str = "usage: wooproxy-client ping | get <endpoint> [key=value ...]";

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,wooproxy_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let client = match WooProxyClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match args.first().map(String::as_str) {
        Some("ping") => {
            if client.test_connection().await {
                println!("ok");
                ExitCode::SUCCESS
            } else {
                println!("unreachable");
                ExitCode::FAILURE
            }
        }
        Some("get") => {
            let Some(endpoint) = args.get(1) else {
                eprintln!("{USAGE}");
                return ExitCode::from(2);
            };
            let mut request = ProxyRequest::get(endpoint.as_str());
            for pair in &args[2..] {
                let Some((key, value)) = pair.split_once('=') else {
                    eprintln!("invalid parameter '{pair}', expected key=value");
                    return ExitCode::from(2);
                };
                request = request.param(key, Value::String(value.to_string()));
            }

            match client.fetch(&request).await {
                Ok(value) => {
                    match serde_json::to_string_pretty(&value) {
                        Ok(out) => println!("{out}"),
                        Err(_) => println!("{value}"),
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}
