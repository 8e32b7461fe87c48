use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod activity_log;
mod charts;
mod colors;
mod config;
mod dates;
mod error;
mod models;
mod nudge;
mod projections;

use activity_log::{append_to_log, read_log};
use config::Config;
use dates::{days_until_expiration, format_yyyy_mm_dd, is_expired, is_expiring_soon, today_local};
use error::AppError;
use models::{
    Activity, ActivityInput, ApiResponse, ChartData, ExpiryRequest, ExpiryStatus, QueryResult,
    WasteRing,
};
use projections::DashboardProjector;

/// Food waste dashboard API
/// Activities are only ever appended to the log;
/// every chart is derived from it on request
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

impl AppState {
    fn projector(&self) -> DashboardProjector {
        DashboardProjector::new(&self.config.activity_log, Some(self.config.palette.as_slice()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("food_dash_api=info,warn")),
        )
        .init();

    info!("Loading configuration...");
    let config = Config::load()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(log = %config.activity_log.display(), "Using activity log");

    let state = AppState {
        config: Arc::new(config),
    };

    let listener = TcpListener::bind(addr).await?;
    info!("Server running on http://{addr}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/activities", post(create_activity).get(list_activities))
        .route("/query", post(handle_query))
        .route("/dashboard/waste-vs-savings", get(waste_vs_savings))
        .route("/dashboard/waste-by-category", get(waste_by_category))
        .route("/dashboard/waste-ring", get(waste_ring))
        .route("/dashboard/nudge", get(nudge))
        .route("/foods/expiry", post(food_expiry))
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "Food Waste Dashboard API v0.1.0"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Log a new activity (append-only)
async fn create_activity(
    State(state): State<AppState>,
    Json(input): Json<ActivityInput>,
) -> Result<Json<ApiResponse>, AppError> {
    if input.activity_type.trim().is_empty() {
        return Err(AppError::MalformedPayload("activityType is required".to_string()));
    }

    let activity = input.into_activity(Utc::now());
    append_to_log(&state.config.activity_log, &activity)?;
    info!(activity_type = %activity.activity_type, "Activity logged");

    Ok(Json(ApiResponse {
        status: "success".to_string(),
        message: format!("Activity logged: {}", activity.activity_type),
        data: Some(serde_json::to_value(&activity)?),
    }))
}

async fn list_activities(State(state): State<AppState>) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(read_log(&state.config.activity_log)?))
}

/// Handle free-text dashboard queries
async fn handle_query(
    State(state): State<AppState>,
    Json(query): Json<serde_json::Value>,
) -> Result<Json<QueryResult>, AppError> {
    let query_str = query.get("query").and_then(|v| v.as_str()).unwrap_or("");
    Ok(Json(state.projector().query(query_str)?))
}

async fn waste_vs_savings(State(state): State<AppState>) -> Result<Json<ChartData>, AppError> {
    Ok(Json(state.projector().waste_vs_savings()?))
}

async fn waste_by_category(State(state): State<AppState>) -> Result<Json<ChartData>, AppError> {
    Ok(Json(state.projector().waste_by_category()?))
}

async fn waste_ring(State(state): State<AppState>) -> Result<Json<WasteRing>, AppError> {
    Ok(Json(state.projector().waste_ring()?))
}

async fn nudge(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let message = state.projector().nudge()?;
    Ok(Json(serde_json::json!({ "message": message })))
}

/// Days remaining and expiry flags for a batch of pantry items
async fn food_expiry(
    State(state): State<AppState>,
    Json(request): Json<ExpiryRequest>,
) -> Result<Json<Vec<ExpiryStatus>>, AppError> {
    let threshold = request
        .threshold_days
        .unwrap_or(state.config.expiry_threshold_days);
    if threshold < 0 {
        return Err(AppError::MalformedPayload(format!(
            "thresholdDays must not be negative, got {threshold}"
        )));
    }

    let today = today_local();
    let statuses = request
        .foods
        .iter()
        .map(|food| ExpiryStatus {
            name: food.name.clone(),
            expiration_date: format_yyyy_mm_dd(food.expiration_date.as_ref()),
            days_remaining: food
                .expiration_date
                .as_ref()
                .and_then(|date| days_until_expiration(date, today)),
            expired: is_expired(food, today),
            expiring_soon: is_expiring_soon(food, today, threshold),
        })
        .collect();

    Ok(Json(statuses))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
