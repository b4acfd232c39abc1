use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use campus_coffee::catalog::{
    pos_from_osm_node, InMemoryPosRepository, Pos, PosService, PosServiceError,
};
use campus_coffee::config::AppConfig;
use campus_coffee::error::AppError;
use campus_coffee::osm::{OsmApiClient, OsmNodeFetcher};
use campus_coffee::telemetry;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Campus Coffee Catalog",
    about = "Run the campus coffee POS catalog or import entries from OpenStreetMap",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Import a single POS from an OpenStreetMap node
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// OpenStreetMap node identifier
    #[arg(long)]
    node_id: i64,
    /// Fetch and convert only; print the candidate without persisting it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Import(args) => run_import(args).await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let repository = Arc::new(InMemoryPosRepository::default());
    let fetcher = Arc::new(OsmApiClient::new(&config.osm)?);
    let service = Arc::new(PosService::new(repository, fetcher));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(campus_coffee::catalog::pos_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "campus coffee catalog ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let client = OsmApiClient::new(&config.osm)?;

    if args.dry_run {
        let node = client
            .fetch_node(args.node_id)
            .await
            .map_err(PosServiceError::from)?;
        let candidate = pos_from_osm_node(&node).map_err(PosServiceError::from)?;
        render_pos(&candidate, true);
        return Ok(());
    }

    let repository = Arc::new(InMemoryPosRepository::default());
    let service = PosService::new(repository, Arc::new(client));
    let saved = service.import_from_osm_node(args.node_id).await?;
    render_pos(&saved, false);

    Ok(())
}

fn render_pos(pos: &Pos, dry_run: bool) {
    if dry_run {
        println!("Converted POS candidate (not persisted)");
    } else {
        println!("Imported POS");
    }

    if let Some(id) = pos.id {
        println!("Id:          {id}");
    }
    println!("Name:        {}", pos.name);
    println!("Description: {}", pos.description);
    println!("Type:        {}", pos.pos_type.label());
    println!("Campus:      {}", pos.campus.label());
    println!(
        "Address:     {} {}, {} {}",
        pos.street, pos.house_number, pos.postal_code, pos.city
    );
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
