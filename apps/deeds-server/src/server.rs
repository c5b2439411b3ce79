//! Shared server state and the HTTP router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::{get, post},
    Router,
};
use deeds_engine::RoundEngine;
use deeds_store_sqlite::SqliteStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::watch;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::handlers::{deeds, groups, health, rounds, templates, users};
use crate::metrics::track_requests;

#[derive(Clone)]
pub struct DeedsServer {
    pub engine: RoundEngine<SqliteStore>,
    pub config: ServerConfig,
    /// Installed Prometheus recorder, if any.
    pub metrics: Option<PrometheusHandle>,
    /// Flipped to `true` once the listener is bound, back to `false` on shutdown.
    pub ready: watch::Receiver<bool>,
}

impl DeedsServer {
    pub fn new(
        store: Arc<SqliteStore>,
        config: ServerConfig,
        metrics: Option<PrometheusHandle>,
        ready: watch::Receiver<bool>,
    ) -> Self {
        let engine = RoundEngine::new(store, config.engine_config());
        Self {
            engine,
            config,
            metrics,
            ready,
        }
    }
}

pub fn router(server: DeedsServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(server.config.cors_origins.clone()))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        // Users
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/login/{name}", get(users::login))
        .route("/users/{id}", get(users::get_user).put(users::rename_user))
        .route("/users/{id}/groups", get(users::list_user_groups))
        // Groups
        .route("/groups", post(groups::create_group))
        .route("/groups/{id}", get(groups::get_group))
        .route("/groups/{id}/join", post(groups::join_group))
        .route("/groups/{id}/members", get(groups::list_members))
        .route(
            "/groups/{id}/rounds",
            get(groups::list_rounds).post(groups::open_round),
        )
        .route("/groups/{id}/current-round", get(groups::current_round))
        // Rounds
        .route("/rounds/{id}", get(rounds::get_round))
        .route("/rounds/{id}/start", post(rounds::start_round))
        .route("/rounds/{id}/status", get(rounds::round_status))
        .route("/rounds/{id}/check-complete", get(rounds::check_complete))
        .route("/rounds/{id}/advance", post(rounds::advance_round))
        .route("/rounds/{id}/close", post(rounds::close_round))
        .route("/rounds/{id}/regenerate-code", post(rounds::regenerate_code))
        .route("/rounds/{id}/celebration-seen", post(rounds::celebration_seen))
        .route("/rounds/{id}/my-deed", get(rounds::my_deed))
        .route(
            "/rounds/{id}/pending-verifications",
            get(rounds::pending_verifications),
        )
        .route("/rounds/{id}/complete", post(rounds::complete_my_deed))
        // Deeds
        .route("/deeds/{id}", get(deeds::get_deed))
        .route("/deeds/{id}/submit", post(deeds::submit))
        .route("/deeds/{id}/verify", post(deeds::verify))
        .route("/deeds/{id}/description", post(deeds::describe))
        .route("/deeds/{id}/history", get(deeds::history))
        // Templates
        .route(
            "/deed-templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route("/deed-templates/{id}/active", post(templates::set_active))
        .route_layer(middleware::from_fn(track_requests));

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(server)
}
