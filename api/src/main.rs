//! Dojo API Server
//!
//! Backend for martial-arts clubs: clubs, groups, trainings, attendance and events.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    FunctionsBackend, HttpCallableFunctions, InMemoryClubRepository, InMemoryEventRepository,
    InMemoryGroupRepository, InMemoryPersonRepository, InMemoryTrainingRepository,
    InMemoryUserRepository, InProcessFunctions, JsonFilePreferencesStore, LocalObjectStorage,
    MemoryStore,
};
use app::{
    AccountService, ClubService, EventService, GroupService, PersonService, SelectionService,
    TrainingService,
};
use config::Config;

type Clubs = InMemoryClubRepository;
type Groups = InMemoryGroupRepository;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService<InMemoryUserRepository, FunctionsBackend>>,
    pub person_service:
        Arc<PersonService<InMemoryPersonRepository, Clubs, LocalObjectStorage>>,
    pub club_service: Arc<
        ClubService<Clubs, Groups, InMemoryPersonRepository, FunctionsBackend, LocalObjectStorage>,
    >,
    pub group_service: Arc<GroupService<Clubs, Groups, FunctionsBackend>>,
    pub training_service: Arc<TrainingService<Clubs, Groups, InMemoryTrainingRepository>>,
    pub event_service: Arc<EventService<Clubs, InMemoryEventRepository, FunctionsBackend>>,
    pub selection_service: Arc<SelectionService<JsonFilePreferencesStore, Clubs>>,
    pub config: Config,
}

/// Wire adapters and services for one backend instance
pub fn build_state(config: &Config) -> AppState {
    let store = MemoryStore::new();

    let functions = Arc::new(match &config.functions_url {
        Some(url) => {
            tracing::info!(url = %url, "Using remote callable functions");
            FunctionsBackend::Http(HttpCallableFunctions::new(
                url.clone(),
                config.functions_token.clone(),
            ))
        }
        None => {
            tracing::info!("Running callable functions in-process");
            FunctionsBackend::InProcess(InProcessFunctions::new(
                store.clone(),
                config.invite_code_ttl,
            ))
        }
    });

    let storage = Arc::new(LocalObjectStorage::new(
        config.storage_dir.clone(),
        config.storage_public_url.clone(),
    ));
    let preferences = Arc::new(JsonFilePreferencesStore::new(
        config.preferences_dir.clone(),
    ));

    AppState {
        account_service: Arc::new(AccountService::new(store.users.clone(), functions.clone())),
        person_service: Arc::new(PersonService::new(
            store.persons.clone(),
            store.clubs.clone(),
            storage.clone(),
        )),
        club_service: Arc::new(ClubService::new(
            store.clubs.clone(),
            store.groups.clone(),
            store.persons.clone(),
            functions.clone(),
            storage,
        )),
        group_service: Arc::new(GroupService::new(
            store.clubs.clone(),
            store.groups.clone(),
            functions.clone(),
        )),
        training_service: Arc::new(TrainingService::new(
            store.clubs.clone(),
            store.groups.clone(),
            store.trainings.clone(),
        )),
        event_service: Arc::new(EventService::new(
            store.clubs.clone(),
            store.events.clone(),
            functions,
        )),
        selection_service: Arc::new(SelectionService::new(
            preferences,
            store.clubs.clone(),
            config.selection_wait,
        )),
        config: config.clone(),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes that act through the authenticated user (and usually a person)
fn protected_routes() -> Router<AppState> {
    Router::new()
        // Account
        .route("/me", get(handlers::me))
        .route("/me/email-verified", post(handlers::mark_email_verified))
        .route(
            "/me/preferences",
            get(handlers::get_preferences).patch(handlers::update_preferences),
        )
        .route("/me/selection", put(handlers::select_club))
        .route("/me/selected-club", get(handlers::selected_club))
        // Persons
        .route(
            "/persons",
            get(handlers::list_my_persons).post(handlers::create_person),
        )
        .route("/persons/:person_id", patch(handlers::update_person))
        .route("/persons/:person_id/image", put(handlers::upload_person_image))
        // Clubs
        .route(
            "/clubs",
            get(handlers::list_my_clubs).post(handlers::create_club),
        )
        .route(
            "/clubs/:club_id",
            get(handlers::get_club)
                .patch(handlers::rename_club)
                .delete(handlers::delete_club),
        )
        .route("/clubs/:club_id/is-admin", get(handlers::is_admin))
        .route("/clubs/:club_id/admins", post(handlers::promote_admin))
        .route(
            "/clubs/:club_id/admins/:person_id",
            delete(handlers::demote_admin),
        )
        .route(
            "/clubs/:club_id/members/:person_id",
            delete(handlers::remove_member),
        )
        .route(
            "/clubs/:club_id/invite-code",
            post(handlers::generate_invite_code).delete(handlers::disable_invite_code),
        )
        .route("/clubs/:club_id/image", put(handlers::upload_club_image))
        .route("/clubs/:club_id/persons", get(handlers::list_club_persons))
        .route("/clubs/:club_id/statistics", get(handlers::club_statistics))
        .route("/clubs/:club_id/watch", get(handlers::watch_club))
        .route("/clubs/:club_id/admin/watch", get(handlers::watch_is_admin))
        // Groups
        .route(
            "/clubs/:club_id/groups",
            get(handlers::list_groups).post(handlers::create_group),
        )
        .route(
            "/clubs/:club_id/groups/:group_id",
            get(handlers::get_group)
                .patch(handlers::rename_group)
                .delete(handlers::delete_group),
        )
        .route(
            "/clubs/:club_id/groups/:group_id/access",
            get(handlers::group_access),
        )
        .route(
            "/clubs/:club_id/groups/:group_id/members",
            put(handlers::update_members),
        )
        .route(
            "/clubs/:club_id/groups/:group_id/trainers",
            put(handlers::update_trainers),
        )
        .route(
            "/clubs/:club_id/groups/:group_id/statistics",
            get(handlers::group_statistics),
        )
        // Trainings
        .route(
            "/clubs/:club_id/groups/:group_id/trainings",
            get(handlers::list_trainings).post(handlers::create_training),
        )
        .route(
            "/clubs/:club_id/groups/:group_id/trainings/:training_id",
            get(handlers::get_training)
                .patch(handlers::update_notes)
                .delete(handlers::delete_training),
        )
        .route(
            "/clubs/:club_id/groups/:group_id/trainings/:training_id/attendance/:person_id",
            put(handlers::set_attendance),
        )
        // Events
        .route(
            "/clubs/:club_id/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/clubs/:club_id/events/:event_id",
            put(handlers::update_event).delete(handlers::delete_event),
        )
        .route(
            "/clubs/:club_id/events/:event_id/response",
            post(handlers::respond),
        )
}

pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Rate limiting config: 2 req/sec sustained, burst of 5
    // Uses PeerIpKeyExtractor to get client IP from socket connection
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to build governor config"))?,
    );

    // Registration is public but rate-limited
    let registration = Router::new()
        .route("/accounts", post(handlers::register))
        .layer(GovernorLayer {
            config: governor_config.clone(),
        });

    // Invite codes are guessable, so redemption shares the limiter
    let join = Router::new()
        .route("/clubs/join", post(handlers::join_club))
        .layer(GovernorLayer {
            config: governor_config,
        });

    let authenticated = protected_routes().merge(join).layer(middleware::from_fn_with_state(
        state.clone(),
        auth::auth_middleware,
    ));

    let app = Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        .merge(registration)
        .merge(authenticated)
        // Uploaded profile images
        .nest_service("/files", ServeDir::new(&state.config.storage_dir))
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dojo_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dojo API...");

    let config = Config::from_env();
    let state = build_state(&config);
    let app = build_router(state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
