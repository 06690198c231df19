use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRewardRepository};
use crate::routes::with_reward_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use partner_rewards::config::AppConfig;
use partner_rewards::error::AppError;
use partner_rewards::rewards::{RewardPolicy, RewardProgramService};
use partner_rewards::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryRewardRepository::default());
    let policy = RewardPolicy::from(&config.rewards);
    let reward_service = Arc::new(RewardProgramService::new(repository, policy));

    let app = with_reward_routes(reward_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_modifiers = config.rewards.max_modifiers,
        max_conditions = config.rewards.max_conditions_per_modifier,
        "partner rewards service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
