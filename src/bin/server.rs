use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use panel_cutlist::config::PackingConfig;
use panel_cutlist::types::{PackingResult, PanelRequest};
use panel_cutlist::{Error, solver};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    #[serde(flatten)]
    config: PackingConfig,
    panels: Vec<PanelRequest>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

struct ApiError(StatusCode, ErrorBody);

/// Well-formed requests the packer refuses.
impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorBody {
                error: err.kind(),
                message: err.to_string(),
            },
        )
    }
}

/// Bodies that never made it to a request: bad syntax, wrong shape or content type.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(
            StatusCode::BAD_REQUEST,
            ErrorBody {
                error: "Json",
                message: rejection.body_text(),
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

async fn optimize(
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<PackingResult>, ApiError> {
    let Json(req) = payload.inspect_err(|rejection| {
        tracing::warn!(status = %rejection.status(), %rejection, "unreadable request body");
    })?;
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    // Each run owns its state; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || solver::pack(req.config, req.panels))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "packing task failed");
            ApiError(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Internal",
                    message: "packing task failed".to_string(),
                },
            )
        })?;

    match result {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            tracing::warn!(kind = err.kind(), %err, "packing rejected");
            Err(err.into())
        }
    }
}

fn app() -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn main() -> std::io::Result<()> {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    // Reporting is off unless a DSN is configured.
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve())
}

async fn serve() -> std::io::Result<()> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("Listening on {addr}");
    axum::serve(listener, app()).await
}
