//! Smart Parking backend
//!
//! REST API for a parking-lot management application: cars, parking spots,
//! reservations and customer payments through a hosted payment provider.
//! Reads configuration from TOML file (~/.config/parking-service/config.toml).

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use smartpark::application::services::{
    AuthService, FleetService, PaymentService, ReservationService,
};
use smartpark::config::AppConfig;
use smartpark::infrastructure::crypto::JwtConfig;
use smartpark::infrastructure::database::migrator::Migrator;
use smartpark::infrastructure::database::repositories::SeaOrmUserRepository;
use smartpark::infrastructure::notify::HttpMailer;
use smartpark::infrastructure::payment::StripeGatewayClient;
use smartpark::{
    create_api_router, default_config_path, init_database, DatabaseConfig,
    SeaOrmRepositoryProvider,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("PARKING_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Smart Parking backend...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("Prometheus metrics recorder installed");

    // ── Build sub-configs from AppConfig ───────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.url.clone(),
    };
    info!("Database: {}", db_config.url);

    let jwt_config = JwtConfig::new(
        app_cfg.security.jwt_secret.clone(),
        app_cfg.security.jwt_expiration_hours,
    );
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // ── Repositories and services ──────────────────────────────
    let repos: Arc<dyn smartpark::domain::RepositoryProvider> =
        Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
    let users = Arc::new(SeaOrmUserRepository::new(db.clone()));

    let auth_service = Arc::new(AuthService::new(users, jwt_config.clone()));
    create_default_admin(&app_cfg, &db).await;

    let fleet_service = Arc::new(FleetService::new(repos.clone()));
    let reservation_service = Arc::new(ReservationService::new(repos));

    let provider = Arc::new(StripeGatewayClient::new(&app_cfg.payment));
    let mailer = Arc::new(HttpMailer::new(&app_cfg.mail));
    let payment_service = Arc::new(PaymentService::new(
        provider,
        mailer,
        app_cfg.payment.currency.clone(),
    ));

    // ── REST API server ────────────────────────────────────────
    let api_router = create_api_router(
        auth_service,
        fleet_service,
        reservation_service,
        payment_service,
        jwt_config,
        prometheus_handle,
        db,
    );

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    axum::serve(listener, api_router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Create the bootstrap admin account when the users table is empty.
async fn create_default_admin(app_cfg: &AppConfig, db: &sea_orm::DatabaseConnection) {
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
    use smartpark::infrastructure::crypto::hash_password;
    use smartpark::infrastructure::database::entities::user::{self, UserRole};

    let users_count = user::Entity::find().count(db).await.unwrap_or(0);
    if users_count != 0 {
        return;
    }

    info!("Creating default admin user...");

    let password_hash = match hash_password(&app_cfg.admin.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash admin password: {}", e);
            return;
        }
    };

    let now = chrono::Utc::now();
    let admin = user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        email: Set(app_cfg.admin.email.clone()),
        name: Set(app_cfg.admin.name.clone()),
        password_hash: Set(password_hash),
        role: Set(UserRole::Admin),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
    };

    match admin.insert(db).await {
        Ok(_) => {
            info!("Default admin created: {}", app_cfg.admin.email);
            info!("Please change the admin password immediately!");
        }
        Err(e) => {
            error!("Failed to create admin user: {}", e);
        }
    }
}
