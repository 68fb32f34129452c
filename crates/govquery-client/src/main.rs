use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use govquery_client::config;
use govquery_client::observability::init_observability;
use govquery_client::{QueryClient, QueryRequest};
use serde_json::{Value, json};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "govquery")]
#[command(about = "Command-line client for the GovQuery backend", long_about = None)]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Args {
    /// Backend base URL
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Total attempts per operation
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable the response cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable JSON logging output
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print Prometheus metrics to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Backend health status
    Health,
    /// Whether the backend is reachable and healthy
    Available,
    /// List schema descriptors
    Schemas,
    /// Show one schema descriptor
    Schema { code: String },
    /// Convert a natural-language question to SQL
    Convert {
        query: String,
        /// Restrict to these tables (repeatable)
        #[arg(long = "table-code")]
        table_codes: Vec<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        temperature: Option<f64>,
        /// Use the lightweight conversion pipeline
        #[arg(long)]
        simple: bool,
    },
    /// Execute SQL on the backend
    Execute {
        sql: String,
        #[arg(long)]
        max_rows: Option<u32>,
        /// Validate locally before sending
        #[arg(long)]
        validate: bool,
    },
    /// Validate SQL locally, or with the backend parser
    Validate {
        sql: String,
        #[arg(long)]
        remote: bool,
    },
    /// Deploy the backend model application
    Deploy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Precedence: CLI > env > file > defaults
    let mut builder = if let Some(ref path) = args.config {
        config::load_config_from_path(path)?
    } else {
        config::load_config()?
    };

    if let Some(ref url_str) = args.url {
        let url = Url::parse(url_str).map_err(|e| anyhow::anyhow!("Invalid backend URL: {e}"))?;
        builder = builder.base_url(url);
    }

    if let Some(ms) = args.timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }

    if let Some(attempts) = args.retries {
        builder = builder.retry_attempts(attempts);
    }

    if args.no_cache {
        builder = builder.cache_enabled(false);
    }

    if args.verbose {
        builder = builder.log_level("debug".to_string());
    }

    if args.json_logs {
        builder = builder.json_logs(true);
    }

    if let Command::Execute { validate: true, .. } = args.command {
        builder = builder.prevalidate_sql(true);
    }

    let config = builder.build()?;

    init_observability(&config.telemetry)?;

    tracing::debug!(
        backend = %config.base_url,
        timeout_ms = u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
        attempts = config.retry.max_attempts().get(),
        cache = config.cache.enabled,
        "Client configured"
    );

    let client = QueryClient::new(&config)?;

    let token = client.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            token.cancel();
        }
    });

    let result = run(&client, args.command).await;

    if args.metrics {
        print_metrics();
    }

    let output = result?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

async fn run(client: &QueryClient, command: Command) -> anyhow::Result<Value> {
    let output = match command {
        Command::Health => serde_json::to_value(client.health_check().await?)?,
        Command::Available => json!({ "available": client.is_available().await }),
        Command::Schemas => serde_json::to_value(client.list_schemas().await?)?,
        Command::Schema { code } => serde_json::to_value(client.get_schema(&code).await?)?,
        Command::Convert {
            query,
            table_codes,
            model,
            max_tokens,
            temperature,
            simple,
        } => {
            let mut request = QueryRequest::new(query);
            if !table_codes.is_empty() {
                request = request.with_table_codes(table_codes);
            }
            if let Some(model) = model {
                request = request.with_model_choice(model);
            }
            if let Some(max_tokens) = max_tokens {
                request = request.with_max_tokens(max_tokens);
            }
            if let Some(temperature) = temperature {
                request = request.with_temperature(temperature);
            }

            let response = if simple {
                client.convert_to_sql_simple(&request).await?
            } else {
                client.convert_to_sql(&request).await?
            };
            serde_json::to_value(response)?
        }
        Command::Execute { sql, max_rows, .. } => {
            serde_json::to_value(client.execute_sql(&sql, max_rows).await?)?
        }
        Command::Validate { sql, remote: false } => serde_json::to_value(client.validate_sql(&sql))?,
        Command::Validate { sql, remote: true } => {
            serde_json::to_value(client.parse_sql_remote(&sql).await?)?
        }
        Command::Deploy => serde_json::to_value(client.deploy().await?)?,
    };

    Ok(output)
}

#[cfg(feature = "metrics")]
fn print_metrics() {
    eprintln!("{}", govquery_client::observability::render_metrics());
}

#[cfg(not(feature = "metrics"))]
fn print_metrics() {
    tracing::warn!("Built without the `metrics` feature; nothing to print");
}
