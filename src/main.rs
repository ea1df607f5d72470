mod handler;

use std::{error::Error, sync::Arc};

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tokio::{fs, net, task};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

use ticketing_backend::{auth::SessionSource, db, qr, session, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = fs::read_to_string("config.toml").await?;
    let config = toml::from_str::<Config>(&config)?;

    let (db_client, db_connections) = db::connect(config.db).await?;

    for db_connection in db_connections {
        task::spawn(async move {
            if let Err(e) = db_connection.await {
                panic!("database connection failed: {e}");
            }
        });
    }

    db_client.apply_schema().await?;

    let qr = qr::Store::open(config.qr.dir).await?;

    let origins = config
        .http
        .cors
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    let cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(AllowOrigin::list(origins));

    let session_codec = session::Codec::new(
        config.session.secret.as_bytes(),
        config.session.max_age,
    )
    .with_secure_cookie(config.session.secure_cookie);

    let app = Router::new()
        .route("/auth/register", post(handler::auth::register))
        .route("/auth/login", post(handler::auth::login))
        .route("/auth/session", get(handler::auth::session))
        .route("/auth/logout", post(handler::auth::logout))
        .route(
            "/auth/switch-to-organizer",
            post(handler::auth::switch_to_organizer),
        )
        .route("/checkout", post(handler::checkout::checkout))
        .route("/profile/tickets", get(handler::profile::tickets))
        .route(
            "/organizer/profile",
            get(handler::organizer::get_profile)
                .patch(handler::organizer::edit_profile),
        )
        .route(
            "/organizer/ticket-types",
            get(handler::organizer::ticket_types),
        )
        .route("/events", post(handler::event::add_event))
        .route(
            "/events/:id",
            patch(handler::event::edit_event)
                .delete(handler::event::delete_event),
        )
        .route("/ticket-types", post(handler::ticket_type::add_ticket_type))
        .route(
            "/ticket-types/:id",
            patch(handler::ticket_type::edit_ticket_type)
                .delete(handler::ticket_type::delete_ticket_type),
        )
        .route("/tickets/:id/refund", post(handler::refund::request_refund))
        .route(
            "/management/events/:id/approve",
            post(handler::management::approve_event),
        )
        .route(
            "/management/events/:id/reject",
            post(handler::management::reject_event),
        )
        .route(
            "/management/refunds/:id/approve",
            post(handler::management::approve_refund),
        )
        .route(
            "/management/refunds/:id/reject",
            post(handler::management::reject_refund),
        )
        .nest_service(qr::URL_PREFIX, ServeDir::new(qr.dir()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState {
            db_client,
            session_codec,
            qr,
        }));

    let listener = net::TcpListener::bind(config.http.server.addr).await?;
    tracing::info!(addr = %config.http.server.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub type SharedAppState = Arc<AppState>;

pub struct AppState {
    db_client: db::Client,

    session_codec: session::Codec,

    qr: qr::Store,
}

impl SessionSource for AppState {
    fn session_codec(&self) -> &session::Codec {
        &self.session_codec
    }
}
