//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{MongoStore, S3AttachmentStore},
    config::Config,
    error::ApiError,
    services::{AssignmentService, RegistrationService},
    web::{
        create_assignment_handler, list_assignments_handler, list_students_handler,
        list_submissions_handler, list_teachers_handler, liveness_handler,
        register_student_handler, register_teacher_handler, state::AppState, submit_assignment_handler,
        ApiDoc,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Document Store & Bootstrap Indexes ---
    info!("Connecting to document store...");
    let store = Arc::new(MongoStore::connect(&config.mongodb_uri, &config.mongodb_db).await?);
    info!("Ensuring store indexes...");
    store.ensure_indexes().await?;
    info!("Store ready.");

    // --- 3. Initialize Attachment Storage ---
    let aws_config = aws_config::load_from_env().await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);
    let attachments = Arc::new(S3AttachmentStore::new(
        s3_client,
        config.attachment_bucket.clone(),
    ));

    // --- 4. Build the Services and Shared AppState ---
    let registration = RegistrationService::new(store.clone());
    let assignments = AssignmentService::new(store, attachments);
    let app_state = Arc::new(AppState {
        registration,
        assignments,
        config: config.clone(),
    });

    // Routes carry no auth; CORS stays wide open to match.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/", get(liveness_handler))
        .route(
            "/teachers",
            post(register_teacher_handler).get(list_teachers_handler),
        )
        .route(
            "/students",
            post(register_student_handler).get(list_students_handler),
        )
        .route(
            "/assignments",
            post(create_assignment_handler).get(list_assignments_handler),
        )
        .route("/assignments/submit", post(submit_assignment_handler))
        .route("/assignments/submissions", get(list_submissions_handler))
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
