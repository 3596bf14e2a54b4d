//! secretd - local HTTP gateway to a remote secret store.
//!
//! Serves `GET` and `POST` on `/v1/secrets/<path>`, forwarding reads and
//! writes to the configured secret store with the process credential.
//!
//! # Usage
//!
//! ```text
//! secretd --credential ~/.secretd/credential --port 8080
//! SECRETD_BACKEND=memory secretd
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SECRETD_CREDENTIAL` | *(unset)* | Credential value or credential file path |
//! | `SECRETD_CREDENTIAL_PASSPHRASE` | *(unset)* | Credential passphrase |
//! | `SECRETD_PORT` | *(unset)* | Port, replaces the port of `GATEWAY_LISTEN` |
//! | `GATEWAY_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `SECRETD_BACKEND` | `remote` | `remote` or `memory` |
//! | `SECRETD_STORE_ENDPOINT` | `https://api.secrethub.io` | Remote store base URL |
//! | `SECRETD_STORE_TIMEOUT_SECS` | `30` | Remote store request timeout |
//! | `SECRETD_MAX_SECRET_SIZE` | `524288` | Largest secret accepted on write, in bytes |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use secretd_core::{Credential, GatewayConfig, StoreBackend, build_store};
use secretd_http::{SecretsHttpConfig, SecretsHttpService};

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command-line flags. Each falls back to its environment variable.
#[derive(Parser)]
#[command(
    name = "secretd",
    about = "Local HTTP gateway to a remote secret store",
    version
)]
struct Cli {
    /// Credential value, or the path of a file holding it
    #[arg(short = 'C', long, env = "SECRETD_CREDENTIAL", hide_env_values = true)]
    credential: Option<String>,

    /// Passphrase for the credential
    #[arg(short = 'P', long, env = "SECRETD_CREDENTIAL_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Port to listen on, replaces the port of --listen [default: 8080]
    #[arg(short, long, env = "SECRETD_PORT")]
    port: Option<u16>,

    /// Bind address [default: 0.0.0.0:8080]
    #[arg(long, env = "GATEWAY_LISTEN")]
    listen: Option<String>,

    /// Secret store client: remote or memory [default: remote]
    #[arg(long, env = "SECRETD_BACKEND")]
    backend: Option<StoreBackend>,

    /// Base URL of the remote secret store
    #[arg(long, env = "SECRETD_STORE_ENDPOINT")]
    store_endpoint: Option<String>,

    /// Request timeout of the remote store client, in seconds
    #[arg(long, env = "SECRETD_STORE_TIMEOUT_SECS")]
    store_timeout_secs: Option<u64>,

    /// Largest secret accepted on write, in bytes [default: 524288]
    #[arg(long, env = "SECRETD_MAX_SECRET_SIZE")]
    max_secret_size: Option<usize>,

    /// Log level filter (RUST_LOG overrides it)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Probe the running server's health endpoint and exit
    #[arg(long)]
    health_check: bool,
}

impl Cli {
    /// Layer the flags over `config`.
    fn apply(&self, config: &mut GatewayConfig) {
        if let Some(listen) = &self.listen {
            config.gateway_listen.clone_from(listen);
        }
        if let Some(port) = self.port {
            config.set_port(port);
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(endpoint) = &self.store_endpoint {
            config.store_endpoint.clone_from(endpoint);
        }
        if let Some(timeout) = self.store_timeout_secs {
            config.store_timeout_secs = timeout;
        }
        if let Some(max) = self.max_secret_size {
            config.max_secret_size = max;
        }
        if let Some(level) = &self.log_level {
            config.log_level.clone_from(level);
        }
    }

    /// Resolve the credential, if one was given.
    fn credential(&self) -> Result<Option<Credential>> {
        self.credential
            .as_deref()
            .map(|source| Credential::load(source, self.passphrase.clone()))
            .transpose()
            .context("failed to load credential")
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Accept connections until Ctrl-C, then drain in-flight requests.
async fn serve(listener: TcpListener, service: SecretsHttpService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let conn = http.serve_connection(TokioIo::new(stream), service.clone());
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => break,
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Address the health check connects to: the bind address, with a wildcard
/// IP swapped for loopback of the same family.
fn health_check_addr(config: &GatewayConfig) -> Result<SocketAddr> {
    let mut addr = config.listen_addr()?;
    if addr.ip().is_unspecified() {
        let loopback = match addr.ip() {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
        };
        addr.set_ip(loopback);
    }
    Ok(addr)
}

/// Request the health endpoint of the server listening on `addr`.
async fn run_health_check(addr: SocketAddr) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.starts_with("HTTP/1.1 200") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = GatewayConfig::from_env().context("invalid configuration")?;
    cli.apply(&mut config);

    if cli.health_check {
        return run_health_check(health_check_addr(&config)?).await;
    }

    init_tracing(&config.log_level)?;

    let credential = cli.credential()?;
    let store = build_store(&config, credential).context("failed to create secret store")?;
    let service = SecretsHttpService::new(store, &SecretsHttpConfig::default());

    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        backend = %config.backend,
        version = VERSION,
        "secretd started, press ^C to exit",
    );

    serve(listener, service).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("secretd: error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
