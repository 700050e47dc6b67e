//! HTTP entry point for the mentor tutoring backend.
//!
//! Serves `POST /run-code` and `POST /request-hint` (see [`routes`]).
//! Configuration comes from flags or environment; the OpenAI key is
//! required at startup. A missing key is fatal here, never a
//! per-request surprise.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mentor::hint::OpenAiHintGenerator;
use mentor::Runner;

mod routes;

use routes::AppState;

#[derive(Debug, Parser)]
#[command(name = "mentor-server", about = "Compile-and-run backend for Socratic C++ tutoring")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "MENTOR_LISTEN", default_value = "0.0.0.0:8000")]
    listen: SocketAddr,

    /// Chat model used for hint generation.
    #[arg(long, env = "MENTOR_MODEL", default_value = mentor::hint::DEFAULT_MODEL)]
    model: String,

    /// Directory for per-submission workspaces (defaults to the system
    /// temp directory).
    #[arg(long, env = "MENTOR_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// OpenAI API key for the hint backend.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mentor=info,mentor_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut builder = Runner::builder();
    if let Some(dir) = &args.scratch_dir {
        builder = builder.with_scratch_root(dir);
    }

    let state = AppState {
        runner: Arc::new(builder.build()),
        hints: Arc::new(OpenAiHintGenerator::new(args.openai_api_key).with_model(args.model)),
    };

    // The frontend is served from another origin; the original deployment
    // was wide open and nothing here is credentialed.
    let app = routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    tracing::info!(addr = %args.listen, "mentor-server listening");

    axum::serve(listener, app)
        .await
        .context("serving HTTP")?;

    Ok(())
}
