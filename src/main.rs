use anyhow::{anyhow, Context, Result};
use clap::Parser;
use hyper::body::Bytes;
use hyper::service::{make_service_fn, service_fn};
use hyper::Server;
use nonzero_ext::nonzero;
use std::convert::Infallible;
use std::fs;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tweet_mood::credentials::{self, Credentials};
use tweet_mood::logging::{init_logging, LogConfig, LogFormat};
use tweet_mood::sentiment::Vader;
use tweet_mood::twitter_client::{ClientConfig, TwitterClient};
use tweet_mood::views::{self, favicon, AppState};

/// Serves a user's recent tweets colored by sentiment, and who they follow.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:5000")]
    bind: SocketAddr,

    /// Icon served at /favicon.ico (defaults to the bundled one)
    #[arg(long)]
    favicon: Option<PathBuf>,

    /// Twitter API base url
    #[arg(long, default_value = "https://api.twitter.com")]
    api_url: String,

    /// Items requested per upstream page
    #[arg(long, default_value_t = 100)]
    page_size: usize,

    /// Client-side cap on upstream requests
    #[arg(long, default_value_t = nonzero!(60u32))]
    requests_per_minute: NonZeroU32,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// `server:app <CREDENTIALS_FILE>`, or just the credentials file. It holds a single line:
    /// consumer_key, consumer_secret, access_token, access_token_secret
    #[arg(required = true, num_args = 1..)]
    app: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&LogConfig {
        format: if args.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..Default::default()
    })?;

    let credentials_path = credentials::credentials_path(&args.app).ok_or(anyhow!(
        "expected a credentials file after `{}`",
        credentials::ARGS_MARKER
    ))?;
    let twitter_credentials = Credentials::load(&credentials_path)
        .with_context(|| format!("loading credentials from {}", credentials_path.display()))?;

    let favicon = match &args.favicon {
        Some(path) => Bytes::from(
            fs::read(path).with_context(|| format!("reading favicon {}", path.display()))?,
        ),
        None => Bytes::from_static(favicon::BUNDLED),
    };

    let twitter_client = TwitterClient::new(
        twitter_credentials,
        &ClientConfig {
            api_url: args.api_url.clone(),
            page_size: args.page_size,
            requests_per_minute: args.requests_per_minute,
        },
    )?;

    let state = Arc::new(AppState::new(
        Arc::new(twitter_client),
        Arc::new(Vader),
        favicon,
    )?);

    let make_service = make_service_fn(move |_conn| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| views::handle(state.clone(), req)))
        }
    });

    let server = Server::try_bind(&args.bind)
        .with_context(|| format!("binding {}", args.bind))?
        .serve(make_service);
    info!(addr = %server.local_addr(), api_url = %args.api_url, "listening");

    server
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down");
        })
        .await?;

    Ok(())
}
