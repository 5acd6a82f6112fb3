use anyhow::{Context, Result};
use clap::Parser;
use encoding_rs::SHIFT_JIS;
use holidaycal::{
    config::Args,
    fetch::build_client,
    process::{load::load_path, refresh_artifact, RefreshOptions},
    server::{routes, AppState},
};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,holidaycal=info"));
    let env = match std::env::var("LOG_LEVEL") {
        Ok(level) => env.add_directive(level.parse().unwrap_or(Level::INFO.into())),
        Err(_) => env,
    };
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let csv_path = args.artifact_path();
    info!(?args, "startup");

    // ─── 2) one-shot refresh ─────────────────────────────────────────
    if args.needs_refresh() {
        info!(
            "downloading and extracting {} holidays -> {}",
            args.year,
            csv_path.display()
        );
        let client = build_client(args.fetch_timeout()).context("building HTTP client")?;
        let opts = RefreshOptions {
            source_url: args.source_url.clone(),
            encoding: SHIFT_JIS,
            target_year: args.year,
            max_retries: args.fetch_retries,
            initial_backoff_ms: 500,
        };
        refresh_artifact(&client, &opts, &csv_path)
            .await
            .context("download/extract failed")?;
    } else {
        info!(
            "using existing {} (use --force to re-download)",
            csv_path.display()
        );
    }

    // ─── 3) load table once ──────────────────────────────────────────
    let table = load_path(&csv_path)
        .with_context(|| format!("loading holidays from {}", csv_path.display()))?;
    if !table.has_year(args.year) {
        warn!(
            year = args.year,
            path = %csv_path.display(),
            "artifact has no holidays for the displayed year (use --force to re-extract)"
        );
    }

    // ─── 4) serve ────────────────────────────────────────────────────
    let state = AppState::new(table, args.year, csv_path.display().to_string());
    info!("server start at http://{}/ (CSV: {})", args.addr, csv_path.display());
    warp::serve(routes(state)).run(args.addr).await;

    Ok(())
}
