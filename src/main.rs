//! KYB Onboarding Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use kyb_onboarding::api;
use kyb_onboarding::config::Config;
use kyb_onboarding::db::DbPool;
use kyb_onboarding::middleware::RequestLogger;
use kyb_onboarding::migration::Migrator;
use kyb_onboarding::services::{
    ClickUpClient, EmailClient, OcrDispatcher, OnboardingService, Storage, TextractClient,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must carry the backend-privileged role");
            error!("  - In production, SENDGRID_API_KEY and S3 credentials must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  KYB Onboarding Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and S3 credentials");
    }

    // Connect to PostgreSQL
    let pool = match DbPool::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    // Run migrations
    if let Err(e) = Migrator::up(pool.connection(), None).await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    // Initialize S3 storage (creates the bucket when missing)
    let storage = match Storage::new(&config.s3).await {
        Ok(storage) => storage,
        Err(e) => {
            error!("Failed to initialize S3 storage: {}", e);
            std::process::exit(1);
        }
    };

    // External service clients
    let textract = TextractClient::new(&config.s3, &config.textract);
    let clickup = ClickUpClient::new(&config.clickup);
    let email = EmailClient::new(&config.email);

    let dispatcher = OcrDispatcher::new(
        pool.clone(),
        storage.clone(),
        textract,
        clickup.clone(),
        config.textract.poll_interval_secs,
        config.textract.max_poll_attempts,
    );
    let onboarding = OnboardingService::new(&config, pool.clone(), clickup, email);

    let bind_address = config.bind_address();
    let max_upload_size = config.max_upload_size;
    let is_development = config.is_development();

    info!(
        "Upload limit: {}MB per document, tokens valid for {} hours",
        max_upload_size / 1024 / 1024,
        config.token_ttl_hours
    );

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if is_development {
            // Permissive CORS for development
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        let mut app = App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            // Add request logging middleware
            .wrap(RequestLogger)
            // Add shared state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(dispatcher.clone()))
            .app_data(web::Data::new(onboarding.clone()))
            .app_data(web::Data::new(max_upload_size))
            // Multipart framing adds overhead beyond the document itself;
            // the real per-file limit is enforced while streaming the field
            .app_data(web::PayloadConfig::new(max_upload_size * 2))
            // Configure API routes
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_webhook_routes)
                    .configure(api::configure_upload_routes)
                    .configure(api::configure_document_routes)
                    .configure(api::configure_company_routes),
            );

        // Swagger UI in development only
        if is_development {
            app = app.service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
            );
        }

        app
    });

    server.workers(worker_count).bind(&bind_address)?.run().await
}
