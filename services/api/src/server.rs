use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryImageStore, InMemoryPriceStore, InMemoryRegistrationRepository,
};
use crate::routes::with_app_routes;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::BoxError;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use stagepass::config::AppConfig;
use stagepass::error::AppError;
use stagepass::registration::EventRegistrationService;
use stagepass::telemetry;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tracing::info;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(config.environment, &config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(EventRegistrationService::new(
        Arc::new(InMemoryRegistrationRepository::default()),
        Arc::new(InMemoryImageStore::default()),
        Arc::new(InMemoryPriceStore::default()),
        config.admin.clone(),
    ));

    let app = with_app_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "registration desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_timeout(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            "request took too long to complete".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "unhandled internal error".to_string(),
        )
    }
}
