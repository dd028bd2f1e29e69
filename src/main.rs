//! oneshot: perform a single HTTP request from the command line.
//!
//! ```text
//! oneshot http://127.0.0.1:8080/foo
//! oneshot -X POST --json '{"foo":"bar"}' -i http://127.0.0.1:8080/
//! oneshot -X PUT --data-file ./payload.bin --timeout-ms 500 http://127.0.0.1:8080/foo/123
//! ```
//!
//! Exit status: 0 on any HTTP response, 2 on connect timeout, 3 on request
//! timeout, 1 on any other failure.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use oneshot_http::config::{load_config, ClientConfig};
use oneshot_http::observability::logging;
use oneshot_http::{ByteSource, ErrorKind, Executor, Payload, RequestSpec};

#[derive(Parser, Debug)]
#[command(name = "oneshot")]
#[command(about = "Perform a single HTTP request", long_about = None, version)]
struct Cli {
    /// Absolute http:// or https:// URI to request.
    uri: String,

    /// Request method, sent verbatim.
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Extra header, repeatable.
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Send TEXT as the body.
    #[arg(short, long, value_name = "TEXT", conflicts_with_all = ["json", "data_file"])]
    data: Option<String>,

    /// Send JSON as a structured body.
    #[arg(long, value_name = "JSON", value_parser = parse_json, conflicts_with = "data_file")]
    json: Option<serde_json::Value>,

    /// Stream the file at PATH as the body.
    #[arg(long, value_name = "PATH")]
    data_file: Option<PathBuf>,

    /// Connect timeout in milliseconds, overrides the config file.
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// TOML configuration file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the status line and headers before the body.
    #[arg(short, long)]
    include: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got {raw:?}"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_json(raw: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(raw).map_err(|e| e.to_string())
}

fn exit_code(kind: ErrorKind) -> ExitCode {
    match kind {
        ErrorKind::ConnectTimeout => ExitCode::from(2),
        ErrorKind::RequestTimeout => ExitCode::from(3),
        _ => ExitCode::FAILURE,
    }
}

async fn payload(cli: &mut Cli) -> std::io::Result<Payload> {
    if let Some(text) = cli.data.take() {
        return Ok(Payload::Text(text));
    }
    if let Some(value) = cli.json.take() {
        return Ok(Payload::json(value));
    }
    if let Some(path) = cli.data_file.take() {
        let file = tokio::fs::File::open(&path).await?;
        let length = file.metadata().await?.len();
        return Ok(Payload::Stream(ByteSource::from_reader(file).with_length(length)));
    }
    Ok(Payload::Absent)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    logging::init(&config.observability)?;

    let executor = Executor::from_config(&config);
    if let Some(ms) = cli.connect_timeout_ms {
        executor.timeouts().set_connect_timeout(Duration::from_millis(ms));
    }

    tracing::debug!(
        connect_timeout_ms = executor.timeouts().connect_timeout().as_millis() as u64,
        request_timeout_ms = ?cli.timeout_ms,
        "Configuration loaded"
    );

    let body = payload(&mut cli).await?;
    let spec = RequestSpec {
        method: cli.method,
        uri: cli.uri,
        headers: cli.headers,
        body,
        timeout: cli.timeout_ms.map(Duration::from_millis),
    };

    match executor.execute(spec).await {
        Ok(res) => {
            if cli.include {
                println!("HTTP/1.1 {}", res.status_code);
                for (name, value) in &res.headers {
                    println!("{name}: {value}");
                }
                println!();
            }
            print!("{}", res.body);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(exit_code(e.kind()))
        }
    }
}
