//! parkade-server: serve a configured parking lot over HTTP.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use parkade::payment::{CardPaymentProcessor, CashPaymentProcessor, PaymentProcessor};
use parkade::{LotConfig, ParkingService, ServerConfig, StandardCostStrategy, TracingDisplay};

struct Args {
    config: PathBuf,
    host: Option<String>,
    port: Option<u16>,
    payment: String,
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let args = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!();
            eprintln!(
                "Usage: parkade-server --config <lot.json> [--host <host>] [--port <port>] [--payment card|cash]"
            );
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --config <path>    Lot layout and admission settings (JSON)");
            eprintln!("  --host <host>      Bind address [default: $PARKADE_HOST or 0.0.0.0]");
            eprintln!("  --port <port>      Bind port [default: $PARKADE_PORT or 8080]");
            eprintln!("  --payment <kind>   Payment processor: card or cash [default: card]");
            process::exit(2);
        }
    };

    init_tracing();

    if let Err(e) = run(args).await {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut config: Option<PathBuf> = None;
    let mut host = None;
    let mut port = None;
    let mut payment = "card".to_string();

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config = Some(PathBuf::from(
                    args.get(i).ok_or("--config requires a value")?,
                ));
            }
            "--host" => {
                i += 1;
                host = Some(args.get(i).ok_or("--host requires a value")?.clone());
            }
            "--port" => {
                i += 1;
                let value = args.get(i).ok_or("--port requires a value")?;
                port = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid port: {value}"))?,
                );
            }
            "--payment" => {
                i += 1;
                payment = args.get(i).ok_or("--payment requires a value")?.clone();
            }
            "--help" | "-h" => return Err("".to_string()),
            arg => return Err(format!("unexpected argument: {arg}")),
        }
        i += 1;
    }

    let config = config.ok_or("missing required flag: --config")?;
    Ok(Args {
        config,
        host,
        port,
        payment,
    })
}

/// Filter from `RUST_LOG`, else `PARKADE_LOG` (debug/info/warn/error).
/// JSON output when `LOG_FORMAT=json`. Always writes to stderr.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let base_level = match std::env::var("PARKADE_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };

        EnvFilter::new(format!(
            "parkade={level},parkade_server={level}",
            level = base_level
        ))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

fn payment_processor(kind: &str) -> anyhow::Result<Arc<dyn PaymentProcessor>> {
    match kind {
        "card" => Ok(Arc::new(CardPaymentProcessor)),
        "cash" => Ok(Arc::new(CashPaymentProcessor)),
        other => anyhow::bail!("invalid payment processor '{other}', expected 'card' or 'cash'"),
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let lot_config = LotConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let mut server_config = ServerConfig::from_env()?;
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let service = ParkingService::from_config(
        &lot_config,
        payment_processor(&args.payment)?,
        Arc::new(StandardCostStrategy),
        Arc::new(TracingDisplay),
    )?;

    let status = service.status();
    tracing::info!(
        floors = status.floors.len(),
        strategy = service.strategy_name(),
        payment = %args.payment,
        "Parking lot ready"
    );

    parkade::transport::serve(server_config, Arc::new(service)).await
}
