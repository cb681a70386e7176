use crate::cli::ServeArgs;
use crate::infra::{load_market_lookup, AppState};
use crate::routes::router;
use axum_prometheus::PrometheusMetricLayer;
use rentcheck::config::AppConfig;
use rentcheck::error::AppError;
use rentcheck::persona::Persona;
use rentcheck::telemetry;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let default_persona = Persona::from_key(&config.presentation.default_persona)
        .unwrap_or_else(|| {
            warn!(
                persona = %config.presentation.default_persona,
                "unknown default persona, using supportive_friend"
            );
            Persona::default()
        });

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let mut app_state = AppState::new(prometheus_handle, default_persona);
    if let Some(lookup) = load_market_lookup(&config.market)? {
        app_state = app_state.with_market(lookup);
    }
    let readiness_flag = app_state.readiness();

    let app = router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, persona = default_persona.key(), "rent scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
