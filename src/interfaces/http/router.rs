//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::services::{
    AuthService, FleetService, PaymentService, ReservationService,
};
use crate::infrastructure::crypto::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    auth, cars, health, metrics as metrics_module, parking_spots, payments, reservations,
};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::handlers::health_check,
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::get_current_user,
        // Cars
        cars::handlers::register_car,
        cars::handlers::list_own_cars,
        cars::handlers::list_all_cars,
        cars::handlers::remove_car,
        // Parking spots
        parking_spots::handlers::create_spot,
        parking_spots::handlers::list_spots,
        parking_spots::handlers::get_spot,
        parking_spots::handlers::update_spot_status,
        // Reservations
        reservations::handlers::create_reservation,
        reservations::handlers::list_own_reservations,
        reservations::handlers::list_own_active_reservations,
        reservations::handlers::list_all_reservations,
        reservations::handlers::get_spot_reservation,
        reservations::handlers::delete_reservation,
        // Payments
        payments::handlers::create_intent,
        payments::handlers::payment_result,
        payments::handlers::balance,
        payments::handlers::transactions,
        payments::handlers::pay,
        payments::handlers::refund_card_payment,
        payments::handlers::refund_balance_transaction,
    ),
    components(
        schemas(
            ApiResponse<String>,
            // Health
            health::handlers::HealthResponse,
            health::handlers::ComponentHealth,
            // Auth
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Cars
            cars::RegisterCarRequest,
            cars::CarDto,
            // Parking spots
            parking_spots::CreateSpotRequest,
            parking_spots::UpdateSpotStatusRequest,
            parking_spots::SpotDto,
            // Reservations
            reservations::CreateReservationRequest,
            reservations::ReservationDto,
            // Payments
            payments::CreateIntentRequest,
            payments::IntentDto,
            payments::PaymentStatusDto,
            payments::BalanceDto,
            payments::TransactionDto,
            payments::PayRequest,
            payments::CardRefundRequest,
            payments::BalanceRefundRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "User registration and JWT login"),
        (name = "Cars", description = "Car registration and ownership"),
        (name = "Parking Spots", description = "Parking spot inventory and status"),
        (name = "Reservations", description = "Spot reservations tied to cars and time windows"),
        (name = "Payments", description = "Balance top-ups, parking payments and refunds"),
    ),
    info(
        title = "Smart Parking API",
        version = "1.0.0",
        description = "REST API for a parking-lot management backend",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    auth_service: Arc<AuthService>,
    fleet_service: Arc<FleetService>,
    reservation_service: Arc<ReservationService>,
    payment_service: Arc<PaymentService>,
    jwt_config: JwtConfig,
    metrics_handle: PrometheusHandle,
    db: DatabaseConnection,
) -> Router {
    let middleware_state = AuthState {
        jwt: jwt_config.clone(),
    };

    let auth_state = auth::AuthHandlerState {
        auth: auth_service,
        token_expiration_hours: jwt_config.expiration_hours,
    };

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(auth::handlers::register))
        .route("/login", post(auth::handlers::login))
        .with_state(auth_state.clone());

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::handlers::get_current_user))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    // Car routes (protected)
    let car_state = cars::CarHandlerState {
        fleet: fleet_service.clone(),
    };
    let car_routes = Router::new()
        .route(
            "/",
            get(cars::handlers::list_own_cars).post(cars::handlers::register_car),
        )
        .route("/all", get(cars::handlers::list_all_cars))
        .route("/{plate}", axum::routing::delete(cars::handlers::remove_car))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(car_state);

    // Parking spot routes (protected)
    let spot_state = parking_spots::ParkingSpotHandlerState {
        fleet: fleet_service,
    };
    let spot_routes = Router::new()
        .route(
            "/",
            get(parking_spots::handlers::list_spots).post(parking_spots::handlers::create_spot),
        )
        .route("/{id}", get(parking_spots::handlers::get_spot))
        .route(
            "/{id}/status",
            put(parking_spots::handlers::update_spot_status),
        )
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(spot_state);

    // Reservation routes (protected)
    let reservation_state = reservations::ReservationHandlerState {
        reservations: reservation_service,
    };
    let reservation_routes = Router::new()
        .route(
            "/",
            get(reservations::handlers::list_own_reservations)
                .post(reservations::handlers::create_reservation),
        )
        .route(
            "/active",
            get(reservations::handlers::list_own_active_reservations),
        )
        .route("/all", get(reservations::handlers::list_all_reservations))
        .route(
            "/spot/{spot_id}",
            get(reservations::handlers::get_spot_reservation),
        )
        .route(
            "/{id}",
            axum::routing::delete(reservations::handlers::delete_reservation),
        )
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(reservation_state);

    // Payment routes (protected)
    let payment_state = payments::PaymentHandlerState {
        payments: payment_service,
    };
    let payment_routes = Router::new()
        .route("/intents", post(payments::handlers::create_intent))
        .route(
            "/intents/{intent_id}/result",
            get(payments::handlers::payment_result),
        )
        .route("/balance", get(payments::handlers::balance))
        .route("/transactions", get(payments::handlers::transactions))
        .route("/pay", post(payments::handlers::pay))
        .route(
            "/refunds/card",
            post(payments::handlers::refund_card_payment),
        )
        .route(
            "/refunds/balance",
            post(payments::handlers::refund_balance_transaction),
        )
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(payment_state);

    // Metrics endpoint (no auth)
    let metrics_state = metrics_module::MetricsState {
        handle: metrics_handle,
    };

    // Health endpoint (no auth)
    let health_state = health::HealthState {
        db,
        started_at: Arc::new(Instant::now()),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route(
            "/health",
            get(health::handlers::health_check).with_state(health_state),
        )
        .route(
            "/metrics",
            get(metrics_module::handlers::prometheus_metrics).with_state(metrics_state),
        )
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/auth", auth_protected_routes)
        .nest("/api/v1/cars", car_routes)
        .nest("/api/v1/parking-spots", spot_routes)
        .nest("/api/v1/reservations", reservation_routes)
        .nest("/api/v1/payments", payment_routes)
        .layer(middleware::from_fn(
            metrics_module::http_metrics_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
