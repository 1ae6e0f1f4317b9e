use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Clinic Queue API server");

    // Load configuration. A half-configured process must not serve:
    // profile writes would fail on hashing and auth would reject everyone.
    let config = AppConfig::from_env();
    if !config.is_configured() {
        error!(
            "Refusing to start - missing environment variables: {}",
            config.missing_vars().join(", ")
        );
        std::process::exit(1);
    }

    // Clinic settings drive slot generation and queue day-bucketing.
    // Probe them once so a missing row surfaces here, not per request.
    let supabase = SupabaseClient::new(&config);
    match supabase.get_clinic_settings(None).await {
        Ok(settings) => info!(
            "Clinic settings loaded: {} minute slots, {} day booking window",
            settings.slot_duration_min, settings.booking_window_days
        ),
        Err(e) => {
            error!("Refusing to start - clinic settings unavailable: {}", e);
            std::process::exit(1);
        }
    }

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create shared state
    let state = Arc::new(config);

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
