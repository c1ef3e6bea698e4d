//! TestYourself server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{http::header, web, App, HttpServer};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use testyourself_lib::api::{self, openapi::ApiDoc};
use testyourself_lib::auth::password::hash_password;
use testyourself_lib::config::Config;
use testyourself_lib::db::{users, DbPool};
use testyourself_lib::middleware::RequestLogger;
use testyourself_lib::migration::Migrator;
use testyourself_lib::services;

/// Bootstrap admin account name.
const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and TYS_JWT_SECRET must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  TestYourself Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and TYS_JWT_SECRET");
    }

    // Create the upload directory
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    // Connect to the database and run migrations
    let pool = DbPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    info!("Database connection established");

    Migrator::up(pool.connection(), None)
        .await
        .expect("Failed to run migrations");
    info!("Database migrations complete");

    // Ensure the bootstrap admin account exists
    if let Some(ref admin_password) = config.bootstrap_admin_password {
        let password_hash = hash_password(admin_password).expect("Failed to hash admin password");
        match users::ensure_admin(pool.connection(), BOOTSTRAP_ADMIN_USERNAME, &password_hash)
            .await
            .expect("Failed to ensure bootstrap admin")
        {
            Some(admin) => info!("Bootstrap admin '{}' created ({})", BOOTSTRAP_ADMIN_USERNAME, admin.id),
            None => info!("Bootstrap admin '{}' already exists", BOOTSTRAP_ADMIN_USERNAME),
        }
    }

    if !config.google_oauth.enabled {
        warn!("Google OAuth not configured - /auth/google routes will reject requests");
    }

    // Prepare shared state
    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let frontend_url = config.frontend_url.clone();
    let upload_dir = config.upload_dir.clone();
    let max_image_size = config.max_image_size;

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
                .allowed_origin(&frontend_url)
                .allowed_origin("http://127.0.0.1:5173")
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .supports_credentials()
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            // Add request logging middleware
            .wrap(RequestLogger)
            // Add shared state
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(pool.clone()))
            // Allow some slack over the image cap - the streaming code enforces the real limit
            .app_data(web::PayloadConfig::new(max_image_size * 2))
            // Configure API routes; public before courses so /courses/public
            // resolves to the catalog
            .service(
                web::scope("/api/v1")
                    .configure(api::health::configure_routes)
                    .configure(api::auth::configure_routes)
                    .configure(services::google_oauth::configure_routes)
                    .configure(api::public::configure_routes)
                    .configure(api::courses::configure_routes)
                    .configure(api::cards::configure_routes)
                    .configure(services::uploads::configure_routes)
                    .configure(api::favorites::configure_routes)
                    .configure(api::history::configure_routes)
                    .configure(api::admin::configure_routes),
            )
            // Serve uploaded course images
            .service(Files::new("/uploads", upload_dir.clone()).prefer_utf8(true))
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    });

    // Set worker count
    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
